/// Delimited text output.
///
/// Every value is wrapped in the enclosure and values are joined with the
/// delimiter. Each line, the last one included, ends with the record
/// separator. Inside the enclosure, `"`, `\` and `/` are prefixed with a
/// backslash unless [`Quoting::Standard`](crate::core::format::Quoting) is
/// selected, in which case the `csv` crate writes RFC 4180 fields.
///
/// # Examples
///
/// ```
/// use collection_export::core::item::RecordWriter;
/// use collection_export::core::record::Model;
/// use collection_export::item::delimited::delimited_writer::DelimitedItemWriterBuilder;
///
/// let row = Model::new("Quote").with("author", "O'Brien").with("text", r#"He said "no""#);
///
/// let writer = DelimitedItemWriterBuilder::new()
///     .delimiter("\t")
///     .from_writer(vec![])
///     .unwrap();
/// writer.open(&row, "Collection").unwrap();
/// writer.write(&row).unwrap();
/// writer.close().unwrap();
///
/// let tsv = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(tsv, "\"author\"\t\"text\"\n\"O'Brien\"\t\"He said \\\"no\\\"\"\n");
/// ```
pub mod delimited_writer;
