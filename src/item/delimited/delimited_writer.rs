use std::{
    cell::RefCell,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::{
    core::{
        format::Quoting,
        item::{RecordWriter, RecordWriterResult},
        record::Record,
    },
    error::{ExportError, ExportResult},
};

/// Prefixes every `"`, `\` and `/` with a backslash.
///
/// ```
/// use collection_export::item::delimited::delimited_writer::escape;
///
/// assert_eq!(escape(r#"say "hi" to a/b"#), r#"say \"hi\" to a\/b"#);
/// assert_eq!(escape("plain"), "plain");
/// ```
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '/') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Joins values into one line: each value escaped and wrapped in `enclosure`,
/// separated by `delimiter`.
///
/// ```
/// use collection_export::item::delimited::delimited_writer::implode;
///
/// let line = implode(&["id", "name"], ",", "\"");
/// assert_eq!(line, r#""id","name""#);
/// ```
pub fn implode<S: AsRef<str>>(values: &[S], delimiter: &str, enclosure: &str) -> String {
    let mut line = String::new();
    for (i, value) in values.iter().enumerate() {
        line.push_str(enclosure);
        line.push_str(&escape(value.as_ref()));
        line.push_str(enclosure);
        if i != values.len() - 1 {
            line.push_str(delimiter);
        }
    }
    line
}

enum Sink<W: Write> {
    Backslash(BufWriter<W>),
    Standard(csv::Writer<W>),
}

/// Writes one header line and one line per record, each followed by the
/// record separator.
pub struct DelimitedItemWriter<W: Write> {
    sink: RefCell<Sink<W>>,
    delimiter: String,
    enclosure: String,
    record_separator: String,
}

impl<W: Write> DelimitedItemWriter<W> {
    fn write_line(&self, values: &[String]) -> RecordWriterResult {
        match &mut *self.sink.borrow_mut() {
            Sink::Backslash(out) => {
                let line = implode(values, &self.delimiter, &self.enclosure);
                out.write_all(line.as_bytes())?;
                out.write_all(self.record_separator.as_bytes())?;
            }
            Sink::Standard(out) => out.write_record(values)?,
        }
        Ok(())
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> ExportResult<W> {
        match self.sink.into_inner() {
            Sink::Backslash(out) => out
                .into_inner()
                .map_err(|error| ExportError::Io(error.into_error())),
            Sink::Standard(out) => out.into_inner().map_err(|error| {
                ExportError::Io(io::Error::new(error.error().kind(), error.to_string()))
            }),
        }
    }
}

impl<W: Write> RecordWriter for DelimitedItemWriter<W> {
    fn open(&self, first: &dyn Record, _collection_type: &str) -> RecordWriterResult {
        let headers: Vec<String> = first.attributes().into_iter().map(|(name, _)| name).collect();
        self.write_line(&headers)
    }

    fn write(&self, record: &dyn Record) -> RecordWriterResult {
        let values: Vec<String> = record
            .attributes()
            .into_iter()
            .map(|(_, value)| value)
            .collect();
        self.write_line(&values)
    }

    fn flush(&self) -> RecordWriterResult {
        match &mut *self.sink.borrow_mut() {
            Sink::Backslash(out) => out.flush()?,
            Sink::Standard(out) => out.flush()?,
        }
        Ok(())
    }
}

/// Builder for [`DelimitedItemWriter`].
///
/// ```
/// use collection_export::core::item::RecordWriter;
/// use collection_export::core::record::Model;
/// use collection_export::item::delimited::delimited_writer::DelimitedItemWriterBuilder;
///
/// let first = Model::new("Car").with("id", "1").with("make", "Ford");
/// let second = Model::new("Car").with("id", "2").with("make", "AC/DC");
///
/// let writer = DelimitedItemWriterBuilder::new()
///     .delimiter("|")
///     .from_writer(vec![])
///     .unwrap();
/// writer.open(&first, "Collection").unwrap();
/// writer.write(&first).unwrap();
/// writer.write(&second).unwrap();
/// writer.close().unwrap();
///
/// let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "\"id\"|\"make\"\n\"1\"|\"Ford\"\n\"2\"|\"AC\\/DC\"\n");
/// ```
pub struct DelimitedItemWriterBuilder {
    delimiter: String,
    enclosure: String,
    record_separator: String,
    quoting: Quoting,
}

impl Default for DelimitedItemWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DelimitedItemWriterBuilder {
    pub fn new() -> DelimitedItemWriterBuilder {
        DelimitedItemWriterBuilder {
            delimiter: ",".to_string(),
            enclosure: "\"".to_string(),
            record_separator: "\n".to_string(),
            quoting: Quoting::Backslash,
        }
    }

    pub fn delimiter<S: Into<String>>(mut self, delimiter: S) -> DelimitedItemWriterBuilder {
        self.delimiter = delimiter.into();
        self
    }

    pub fn enclosure<S: Into<String>>(mut self, enclosure: S) -> DelimitedItemWriterBuilder {
        self.enclosure = enclosure.into();
        self
    }

    pub fn record_separator<S: Into<String>>(mut self, separator: S) -> DelimitedItemWriterBuilder {
        self.record_separator = separator.into();
        self
    }

    pub fn quoting(mut self, quoting: Quoting) -> DelimitedItemWriterBuilder {
        self.quoting = quoting;
        self
    }

    /// Creates (or truncates) the file at `path`. The dialect is checked
    /// before the file is touched.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> ExportResult<DelimitedItemWriter<File>> {
        if self.quoting == Quoting::Standard {
            self.standard_dialect()?;
        }
        let file = File::create(path)?;
        self.from_writer(file)
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> ExportResult<DelimitedItemWriter<W>> {
        let sink = match self.quoting {
            Quoting::Backslash => Sink::Backslash(BufWriter::new(wtr)),
            Quoting::Standard => {
                let (delimiter, quote, terminator) = self.standard_dialect()?;
                let out = WriterBuilder::new()
                    .flexible(true)
                    .has_headers(false)
                    .delimiter(delimiter)
                    .quote(quote)
                    .double_quote(true)
                    .quote_style(QuoteStyle::Always)
                    .terminator(terminator)
                    .from_writer(wtr);
                Sink::Standard(out)
            }
        };

        Ok(DelimitedItemWriter {
            sink: RefCell::new(sink),
            delimiter: self.delimiter,
            enclosure: self.enclosure,
            record_separator: self.record_separator,
        })
    }

    fn standard_dialect(&self) -> ExportResult<(u8, u8, Terminator)> {
        let delimiter = single_byte("delimiter", &self.delimiter)?;
        let quote = single_byte("enclosure", &self.enclosure)?;
        let terminator = match self.record_separator.as_str() {
            "\r\n" => Terminator::CRLF,
            separator => Terminator::Any(single_byte("record separator", separator)?),
        };
        Ok((delimiter, quote, terminator))
    }
}

fn single_byte(name: &str, value: &str) -> ExportResult<u8> {
    match value.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(ExportError::UnsupportedDialect(format!(
            "standard quoting needs a single byte {}, got {:?}",
            name, value
        ))),
    }
}
