use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};

/// Which writer an exporter dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    #[default]
    Delimited,
    Xml,
}

/// How delimited values are protected inside their enclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quoting {
    /// Prefix `"`, `\` and `/` with a backslash.
    #[default]
    Backslash,
    /// RFC 4180: double the enclosure character, every field quoted.
    Standard,
}

/// The four built-in formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    Tsv,
    Csv,
    Psv,
    Xml,
}

impl Preset {
    /// Configuration this preset applies to `target_path`.
    ///
    /// ```
    /// use collection_export::core::format::Preset;
    ///
    /// let config = Preset::Psv.config("out");
    /// assert_eq!(config.delimiter, "|");
    /// assert_eq!(config.file_extension, ".psv");
    /// ```
    pub fn config<P: Into<PathBuf>>(&self, target_path: P) -> FormatConfig {
        let (delimiter, enclosure, extension, separator) = self.values();
        FormatConfig {
            target_path: target_path.into(),
            delimiter: delimiter.to_string(),
            enclosure: enclosure.to_string(),
            file_extension: extension.to_string(),
            record_separator: separator.to_string(),
            quoting: Quoting::Backslash,
        }
    }

    /// Delimiter, enclosure, extension and separator of the preset.
    pub(crate) fn values(&self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self {
            Preset::Tsv => ("\t", "\"", ".tsv", "\n"),
            Preset::Csv => (",", "\"", ".csv", "\n"),
            Preset::Psv => ("|", "\"", ".psv", "\n"),
            // Delimiter and enclosure are never read in XML mode.
            Preset::Xml => ("XML", "<>", ".xml", "\r"),
        }
    }

    pub fn mode(&self) -> OutputMode {
        match self {
            Preset::Xml => OutputMode::Xml,
            _ => OutputMode::Delimited,
        }
    }
}

impl FromStr for Preset {
    type Err = ExportError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_uppercase().as_str() {
            "TSV" => Ok(Preset::Tsv),
            "CSV" => Ok(Preset::Csv),
            "PSV" => Ok(Preset::Psv),
            "XML" => Ok(Preset::Xml),
            _ => Err(ExportError::UnknownPreset(name.to_string())),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Preset::Tsv => "TSV",
            Preset::Csv => "CSV",
            Preset::Psv => "PSV",
            Preset::Xml => "XML",
        };
        f.write_str(name)
    }
}

/// Format settings of an exporter.
///
/// Deserializable, so it can be kept next to other application settings:
///
/// ```
/// use collection_export::core::format::{FormatConfig, Quoting};
///
/// let config: FormatConfig = serde_json::from_str(
///     r#"{ "target_path": "/tmp/cars", "delimiter": ";" }"#,
/// ).unwrap();
///
/// assert_eq!(config.delimiter, ";");
/// assert_eq!(config.enclosure, "\"");
/// assert_eq!(config.quoting, Quoting::Backslash);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub target_path: PathBuf,
    pub delimiter: String,
    pub enclosure: String,
    pub file_extension: String,
    pub record_separator: String,
    pub quoting: Quoting,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            target_path: PathBuf::new(),
            delimiter: ",".to_string(),
            enclosure: "\"".to_string(),
            file_extension: ".csv".to_string(),
            record_separator: "\n".to_string(),
            quoting: Quoting::Backslash,
        }
    }
}

impl FormatConfig {
    pub fn new<P: Into<PathBuf>>(target_path: P) -> Self {
        Self {
            target_path: target_path.into(),
            ..Self::default()
        }
    }

    /// Delimiter, enclosure and record separator must be pairwise distinct.
    pub fn validate(&self) -> ExportResult<()> {
        let pairs = [
            ("record separator", &self.record_separator, "enclosure", &self.enclosure),
            ("record separator", &self.record_separator, "delimiter", &self.delimiter),
            ("delimiter", &self.delimiter, "enclosure", &self.enclosure),
        ];

        for (first, a, second, b) in pairs {
            if a == b {
                return Err(ExportError::ConfigConflict {
                    first,
                    second,
                    value: a.clone(),
                });
            }
        }
        Ok(())
    }

    /// Target path with the file extension appended.
    pub fn output_path(&self) -> PathBuf {
        let mut path = self.target_path.clone().into_os_string();
        path.push(&self.file_extension);
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_should_match_their_table() {
        let tsv = Preset::Tsv.config("x");
        assert_eq!(
            (
                tsv.delimiter.as_str(),
                tsv.enclosure.as_str(),
                tsv.file_extension.as_str(),
                tsv.record_separator.as_str()
            ),
            ("\t", "\"", ".tsv", "\n")
        );

        let csv = Preset::Csv.config("x");
        assert_eq!(
            (
                csv.delimiter.as_str(),
                csv.enclosure.as_str(),
                csv.file_extension.as_str(),
                csv.record_separator.as_str()
            ),
            (",", "\"", ".csv", "\n")
        );

        let xml = Preset::Xml.config("x");
        assert_eq!(xml.file_extension, ".xml");
        assert_eq!(xml.record_separator, "\r");

        for preset in [Preset::Tsv, Preset::Csv, Preset::Psv, Preset::Xml] {
            assert!(preset.config("x").validate().is_ok(), "{} preset", preset);
        }
    }

    #[test]
    fn only_xml_preset_should_select_xml_mode() {
        assert_eq!(Preset::Xml.mode(), OutputMode::Xml);
        assert_eq!(Preset::Csv.mode(), OutputMode::Delimited);
        assert_eq!(Preset::Tsv.mode(), OutputMode::Delimited);
        assert_eq!(Preset::Psv.mode(), OutputMode::Delimited);
    }

    #[test]
    fn preset_names_should_parse_case_insensitively() {
        assert_eq!("csv".parse::<Preset>().ok(), Some(Preset::Csv));
        assert_eq!("XML".parse::<Preset>().ok(), Some(Preset::Xml));
        assert_eq!(Preset::Tsv.to_string().parse::<Preset>().ok(), Some(Preset::Tsv));

        match "JSON".parse::<Preset>() {
            Err(ExportError::UnknownPreset(name)) => assert_eq!(name, "JSON"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn equal_delimiter_and_enclosure_should_conflict() {
        let config = FormatConfig {
            delimiter: "'".to_string(),
            enclosure: "'".to_string(),
            ..FormatConfig::new("x")
        };

        match config.validate() {
            Err(ExportError::ConfigConflict { first, second, value }) => {
                assert_eq!(first, "delimiter");
                assert_eq!(second, "enclosure");
                assert_eq!(value, "'");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn separator_equal_to_delimiter_should_conflict() {
        let config = FormatConfig {
            record_separator: ",".to_string(),
            ..FormatConfig::new("x")
        };

        assert!(matches!(
            config.validate(),
            Err(ExportError::ConfigConflict { second: "delimiter", .. })
        ));
    }

    #[test]
    fn output_path_should_append_extension() {
        let config = FormatConfig::new("/tmp/report.2024");

        assert_eq!(config.output_path(), PathBuf::from("/tmp/report.2024.csv"));
    }
}
