use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    core::{
        exporter::Exporter,
        format::{FormatConfig, OutputMode, Quoting},
        record::RecordCollection,
    },
    error::ExportResult,
};

/// Describes an outgoing data feed: where it goes and how it is formatted.
///
/// `data_type` is the file type, with or without a leading dot. A data type of
/// `xml` selects the XML writer; anything else is written as delimited text.
///
/// ```
/// use collection_export::core::feed::FeedTemplate;
/// use collection_export::core::format::OutputMode;
///
/// let template = FeedTemplate::from_json(
///     r#"{ "file_name": "/tmp/dealer-feed", "delimiter": "|", "data_type": "txt" }"#,
/// ).unwrap();
///
/// assert_eq!(template.file_extension(), ".txt");
/// assert_eq!(template.mode(), OutputMode::Delimited);
/// assert_eq!(template.enclosure, "\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedTemplate {
    pub file_name: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_enclosure")]
    pub enclosure: String,
    #[serde(default = "default_data_type")]
    pub data_type: String,
    /// Record separator.
    #[serde(default = "default_escape")]
    pub escape: String,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_enclosure() -> String {
    "\"".to_string()
}

fn default_data_type() -> String {
    "csv".to_string()
}

fn default_escape() -> String {
    "\n".to_string()
}

impl FeedTemplate {
    pub fn from_json(json: &str) -> ExportResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn file_extension(&self) -> String {
        if self.data_type.starts_with('.') {
            self.data_type.clone()
        } else {
            format!(".{}", self.data_type)
        }
    }

    pub fn mode(&self) -> OutputMode {
        if self.data_type.trim_start_matches('.').eq_ignore_ascii_case("xml") {
            OutputMode::Xml
        } else {
            OutputMode::Delimited
        }
    }
}

impl Exporter {
    /// Exporter for the feed described by `template`.
    pub fn from_template(template: &FeedTemplate) -> ExportResult<Self> {
        let config = FormatConfig {
            target_path: template.file_name.clone(),
            delimiter: template.delimiter.clone(),
            enclosure: template.enclosure.clone(),
            file_extension: template.file_extension(),
            record_separator: template.escape.clone(),
            quoting: Quoting::Backslash,
        };
        Exporter::from_config(config, template.mode())
    }
}

/// Writes the feed file for `template` from `collection` and returns its path.
pub fn export_feed<C>(template: &FeedTemplate, collection: &C) -> ExportResult<PathBuf>
where
    C: RecordCollection + ?Sized,
{
    Exporter::from_template(template)?.export(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Model;
    use crate::error::ExportError;
    use std::error::Error;
    use std::fs;
    use tempfile::tempdir;

    fn template(file_name: PathBuf, data_type: &str) -> FeedTemplate {
        FeedTemplate {
            file_name,
            delimiter: "\t".to_string(),
            enclosure: "'".to_string(),
            data_type: data_type.to_string(),
            escape: "\r\n".to_string(),
        }
    }

    #[test]
    fn data_type_should_drive_extension_and_mode() {
        let xml = template(PathBuf::from("feed"), ".XML");
        assert_eq!(xml.file_extension(), ".XML");
        assert_eq!(xml.mode(), OutputMode::Xml);

        let tsv = template(PathBuf::from("feed"), "tsv");
        assert_eq!(tsv.file_extension(), ".tsv");
        assert_eq!(tsv.mode(), OutputMode::Delimited);
    }

    #[test]
    fn delimited_feed_should_use_template_format() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let cars = vec![Model::new("Car").with("vin", "VF1").with("price", "9999")];

        let path = export_feed(&template(dir.path().join("dealer"), "tsv"), &cars)?;

        assert_eq!(path, dir.path().join("dealer.tsv"));
        assert_eq!(
            fs::read_to_string(path)?,
            "'vin'\t'price'\r\n'VF1'\t'9999'\r\n"
        );
        Ok(())
    }

    #[test]
    fn xml_feed_should_be_pretty_printed() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let cars = vec![Model::new("Car").with("vin", "VF1")];

        let path = export_feed(&template(dir.path().join("dealer"), "xml"), &cars)?;

        assert_eq!(
            fs::read_to_string(path)?,
            "<?xml version=\"1.0\"?>\n<CarCollection>\n  <Car>\n    <vin>VF1</vin>\n  </Car>\n</CarCollection>\n"
        );
        Ok(())
    }

    #[test]
    fn conflicting_template_should_be_rejected() {
        let mut conflicting = template(PathBuf::from("feed"), "csv");
        conflicting.enclosure = "\t".to_string();

        let result = Exporter::from_template(&conflicting);

        assert!(matches!(result, Err(ExportError::ConfigConflict { .. })));
    }

    #[test]
    fn template_without_file_name_should_not_parse() {
        let result = FeedTemplate::from_json(r#"{ "delimiter": ";" }"#);

        assert!(matches!(result, Err(ExportError::Serialization(_))));
    }
}
