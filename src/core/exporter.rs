use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    core::{
        format::{FormatConfig, OutputMode, Preset, Quoting},
        item::RecordWriter,
        record::{Entry, Record, RecordCollection},
    },
    error::{ExportError, ExportResult},
    item::{
        delimited::delimited_writer::{DelimitedItemWriterBuilder, implode},
        xml::{xml_beautifier::beautify, xml_writer::XmlItemWriterBuilder},
    },
};

/// Writes record collections to `<target path><extension>` as delimited text
/// or as an XML document.
///
/// # Examples
///
/// ```
/// use collection_export::core::exporter::Exporter;
/// use collection_export::core::format::Preset;
/// use collection_export::core::record::Model;
/// use std::fs;
///
/// let dir = tempfile::tempdir().unwrap();
/// let cars = vec![
///     Model::new("Car").with("id", "1").with("name", "A"),
///     Model::new("Car").with("id", "2").with("name", "B"),
/// ];
///
/// let exporter = Exporter::from_preset(Preset::Csv, dir.path().join("out"));
/// let path = exporter.export(&cars).unwrap();
///
/// assert_eq!(path, dir.path().join("out.csv"));
/// assert_eq!(
///     fs::read_to_string(path).unwrap(),
///     "\"id\",\"name\"\n\"1\",\"A\"\n\"2\",\"B\"\n"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exporter {
    config: FormatConfig,
    mode: OutputMode,
}

impl Exporter {
    /// Creates a delimited exporter, failing when delimiter, enclosure and
    /// record separator are not pairwise distinct.
    pub fn new<P, S1, S2, S3, S4>(
        target_path: P,
        delimiter: S1,
        enclosure: S2,
        file_extension: S3,
        record_separator: S4,
    ) -> ExportResult<Self>
    where
        P: Into<PathBuf>,
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
        S4: Into<String>,
    {
        ExporterBuilder::new(target_path)
            .delimiter(delimiter)
            .enclosure(enclosure)
            .file_extension(file_extension)
            .record_separator(record_separator)
            .build()
    }

    pub fn from_config(config: FormatConfig, mode: OutputMode) -> ExportResult<Self> {
        config.validate()?;
        Ok(Self { config, mode })
    }

    /// Exporter configured from one of the built-in presets.
    pub fn from_preset<P: Into<PathBuf>>(preset: Preset, target_path: P) -> Self {
        Self {
            config: preset.config(target_path),
            mode: preset.mode(),
        }
    }

    /// Same as [`Exporter::from_preset`] with the preset given by name
    /// (`"TSV"`, `"CSV"`, `"PSV"` or `"XML"`).
    pub fn from_preset_name<P: Into<PathBuf>>(name: &str, target_path: P) -> ExportResult<Self> {
        let preset: Preset = name.parse()?;
        Ok(Self::from_preset(preset, target_path))
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Full path of the file `export` writes.
    pub fn output_path(&self) -> PathBuf {
        self.config.output_path()
    }

    /// Re-applies a preset in place, optionally moving the target path.
    /// Quoting goes back to the preset's backslash escaping.
    pub fn change_preset(
        &mut self,
        preset: Preset,
        target_path: Option<PathBuf>,
    ) -> ExportResult<()> {
        let (delimiter, enclosure, extension, separator) = preset.values();
        let mut change = FormatChange::new()
            .delimiter(delimiter)
            .enclosure(enclosure)
            .file_extension(extension)
            .record_separator(separator)
            .quoting(Quoting::Backslash);
        change.target_path = target_path;

        self.change_format(change)?;
        self.mode = preset.mode();
        Ok(())
    }

    /// Same as [`Exporter::change_preset`] with the preset given by name. An
    /// unknown name leaves the exporter untouched.
    pub fn change_preset_by_name(
        &mut self,
        name: &str,
        target_path: Option<PathBuf>,
    ) -> ExportResult<()> {
        let preset: Preset = name.parse()?;
        self.change_preset(preset, target_path)
    }

    /// Overwrites the fields set in `change`. When the result breaks the
    /// distinctness rule the exporter is left as it was.
    ///
    /// ```
    /// use collection_export::core::exporter::{Exporter, FormatChange};
    /// use collection_export::core::format::Preset;
    /// use collection_export::error::ExportError;
    ///
    /// let mut exporter = Exporter::from_preset(Preset::Tsv, "report");
    /// exporter.change_format(FormatChange::new().enclosure("'")).unwrap();
    /// assert_eq!(exporter.config().enclosure, "'");
    ///
    /// let result = exporter.change_format(FormatChange::new().delimiter("'"));
    /// assert!(matches!(result, Err(ExportError::ConfigConflict { .. })));
    /// assert_eq!(exporter.config().delimiter, "\t");
    /// ```
    pub fn change_format(&mut self, change: FormatChange) -> ExportResult<()> {
        let mut config = self.config.clone();
        if let Some(target_path) = change.target_path {
            config.target_path = target_path;
        }
        if let Some(delimiter) = change.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(enclosure) = change.enclosure {
            config.enclosure = enclosure;
        }
        if let Some(file_extension) = change.file_extension {
            config.file_extension = file_extension;
        }
        if let Some(record_separator) = change.record_separator {
            config.record_separator = record_separator;
        }
        if let Some(quoting) = change.quoting {
            config.quoting = quoting;
        }
        config.validate()?;

        self.config = config;
        Ok(())
    }

    /// Field names of `record`, in attribute order.
    pub fn column_headers(record: &dyn Record) -> Vec<String> {
        record.attributes().into_iter().map(|(name, _)| name).collect()
    }

    /// Field values of `record`, in attribute order.
    pub fn column_values(record: &dyn Record) -> Vec<String> {
        record.attributes().into_iter().map(|(_, value)| value).collect()
    }

    /// Joins `values` the way a delimited line is written, using this
    /// exporter's delimiter and enclosure.
    pub fn implode<S: AsRef<str>>(&self, values: &[S]) -> String {
        implode(values, &self.config.delimiter, &self.config.enclosure)
    }

    /// Writes `collection` to [`Exporter::output_path`], truncating any
    /// existing file, and returns that path.
    ///
    /// On any error after the file was created, the partial file is removed
    /// before the error is returned.
    pub fn export<C>(&self, collection: &C) -> ExportResult<PathBuf>
    where
        C: RecordCollection + ?Sized,
    {
        let first = match collection.first() {
            Some(Entry::Record(record)) => record,
            Some(Entry::Malformed(reason)) => {
                return Err(ExportError::MalformedRecord {
                    index: 0,
                    reason: reason.to_string(),
                });
            }
            None => return Err(ExportError::EmptyCollection),
        };

        let path = self.output_path();
        debug!("Exporting {:?} collection to {}", self.mode, path.display());

        let written = match self.mode {
            OutputMode::Delimited => {
                let writer = DelimitedItemWriterBuilder::new()
                    .delimiter(self.config.delimiter.as_str())
                    .enclosure(self.config.enclosure.as_str())
                    .record_separator(self.config.record_separator.as_str())
                    .quoting(self.config.quoting)
                    .from_path(&path)?;
                write_records(writer, collection, first)
            }
            OutputMode::Xml => {
                let writer = XmlItemWriterBuilder::new().from_path(&path)?;
                write_records(writer, collection, first).and_then(|count| {
                    beautify(&path)?;
                    Ok(count)
                })
            }
        };

        match written {
            Ok(count) => {
                info!("Exported {} records to {}", count, path.display());
                Ok(path)
            }
            Err(error) => {
                remove_partial(&path);
                Err(error)
            }
        }
    }
}

/// Drives `writer` over the whole collection; the writer (and its file) is
/// dropped on return.
fn write_records<W, C>(writer: W, collection: &C, first: &dyn Record) -> ExportResult<usize>
where
    W: RecordWriter,
    C: RecordCollection + ?Sized,
{
    writer
        .accepts(first)
        .map_err(|reason| ExportError::MalformedRecord { index: 0, reason })?;
    writer.open(first, collection.type_name())?;

    let mut count = 0;
    for (index, entry) in collection.entries().enumerate() {
        let record = match entry {
            Entry::Record(record) => record,
            Entry::Malformed(reason) => {
                return Err(ExportError::MalformedRecord {
                    index,
                    reason: reason.to_string(),
                });
            }
        };
        writer
            .accepts(record)
            .map_err(|reason| ExportError::MalformedRecord { index, reason })?;
        writer.write(record)?;
        count += 1;
    }

    writer.close()?;
    Ok(count)
}

fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed partial file {}", path.display()),
        Err(error) => warn!("Unable to remove partial file {}: {}", path.display(), error),
    }
}

/// Field-by-field update for [`Exporter::change_format`]; unset fields keep
/// their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatChange {
    pub target_path: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub enclosure: Option<String>,
    pub file_extension: Option<String>,
    pub record_separator: Option<String>,
    pub quoting: Option<Quoting>,
}

impl FormatChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_path<P: Into<PathBuf>>(mut self, target_path: P) -> Self {
        self.target_path = Some(target_path.into());
        self
    }

    pub fn delimiter<S: Into<String>>(mut self, delimiter: S) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn enclosure<S: Into<String>>(mut self, enclosure: S) -> Self {
        self.enclosure = Some(enclosure.into());
        self
    }

    pub fn file_extension<S: Into<String>>(mut self, file_extension: S) -> Self {
        self.file_extension = Some(file_extension.into());
        self
    }

    pub fn record_separator<S: Into<String>>(mut self, record_separator: S) -> Self {
        self.record_separator = Some(record_separator.into());
        self
    }

    pub fn quoting(mut self, quoting: Quoting) -> Self {
        self.quoting = Some(quoting);
        self
    }
}

/// Builder for [`Exporter`]. Starts from comma, double quote, `.csv` and
/// newline in delimited mode.
///
/// ```
/// use collection_export::core::exporter::ExporterBuilder;
/// use collection_export::core::format::Quoting;
///
/// let exporter = ExporterBuilder::new("/tmp/cars")
///     .delimiter(";")
///     .quoting(Quoting::Standard)
///     .build()
///     .unwrap();
///
/// assert_eq!(exporter.output_path().to_str(), Some("/tmp/cars.csv"));
/// ```
pub struct ExporterBuilder {
    config: FormatConfig,
    mode: OutputMode,
}

impl ExporterBuilder {
    pub fn new<P: Into<PathBuf>>(target_path: P) -> Self {
        Self {
            config: FormatConfig::new(target_path),
            mode: OutputMode::Delimited,
        }
    }

    pub fn delimiter<S: Into<String>>(mut self, delimiter: S) -> Self {
        self.config.delimiter = delimiter.into();
        self
    }

    pub fn enclosure<S: Into<String>>(mut self, enclosure: S) -> Self {
        self.config.enclosure = enclosure.into();
        self
    }

    pub fn file_extension<S: Into<String>>(mut self, file_extension: S) -> Self {
        self.config.file_extension = file_extension.into();
        self
    }

    pub fn record_separator<S: Into<String>>(mut self, record_separator: S) -> Self {
        self.config.record_separator = record_separator.into();
        self
    }

    pub fn quoting(mut self, quoting: Quoting) -> Self {
        self.config.quoting = quoting;
        self
    }

    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(self) -> ExportResult<Exporter> {
        Exporter::from_config(self.config, self.mode)
    }
}
