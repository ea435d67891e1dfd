use crate::{core::record::Record, error::ExportResult};

pub type RecordWriterResult = ExportResult<()>;

/// Output side of an export: opened once with the first record, fed every
/// record in order, then closed.
pub trait RecordWriter {
    /// Checks that `record` can be represented in this output, describing the
    /// problem when it cannot.
    fn accepts(&self, _record: &dyn Record) -> Result<(), String> {
        Ok(())
    }

    /// Writes whatever precedes the first record (header line, XML prolog).
    fn open(&self, _first: &dyn Record, _collection_type: &str) -> RecordWriterResult {
        Ok(())
    }

    fn write(&self, record: &dyn Record) -> RecordWriterResult;

    fn flush(&self) -> RecordWriterResult;

    /// Writes whatever follows the last record and flushes.
    fn close(&self) -> RecordWriterResult {
        self.flush()
    }
}
