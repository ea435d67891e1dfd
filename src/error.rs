use thiserror::Error;

#[derive(Error, Debug)]
/// Export error
pub enum ExportError {
    /// Two of delimiter, enclosure and record separator share the same value.
    #[error("Configuration conflict: {first} and {second} are both {value:?}")]
    ConfigConflict {
        first: &'static str,
        second: &'static str,
        value: String,
    },

    /// An element of the collection does not satisfy the record contract.
    #[error("Malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// The written XML document could not be parsed back for pretty-printing.
    #[error("XML round trip failed: {0}")]
    XmlRoundTrip(String),

    #[error("Cannot export an empty collection")]
    EmptyCollection,

    /// Standard quoting needs single byte delimiter and enclosure.
    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(error: serde_json::Error) -> Self {
        ExportError::Serialization(error.to_string())
    }
}

impl From<quick_xml::Error> for ExportError {
    fn from(error: quick_xml::Error) -> Self {
        match error {
            quick_xml::Error::Io(io) => {
                ExportError::Io(std::io::Error::new(io.kind(), io.to_string()))
            }
            other => ExportError::XmlRoundTrip(other.to_string()),
        }
    }
}

/// Result alias used across the crate.
pub type ExportResult<T> = Result<T, ExportError>;
