#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Collection Export

 Writes an ordered collection of uniformly-shaped records to a file, either as
 delimited text (CSV, TSV, PSV or any custom dialect) or as an XML document.

 ## Core Concepts

- **Record:** anything exposing a type name and an ordered list of
  field name / value pairs. [`Model`](core::record::Model) is a ready-made
  implementation, and any serde `Serialize` struct can be turned into one.
- **RecordCollection:** an ordered source of records. `Vec<R>`, slices and
  [`Collection`](core::record::Collection) implement it. A collection may
  contain malformed elements; exporting it fails and leaves no file behind.
- **Exporter:** holds the format settings (delimiter, enclosure, record
  separator, extension, target path) and the output mode, and writes the
  collection to `<target path><extension>`.

 ## Presets

| **Preset** | **Delimiter** | **Enclosure** | **Extension** | **Separator** |
|------------|---------------|---------------|---------------|---------------|
| TSV        | tab           | `"`           | `.tsv`        | newline       |
| CSV        | `,`           | `"`           | `.csv`        | newline       |
| PSV        | `\|`          | `"`           | `.psv`        | newline       |
| XML        | unused        | unused        | `.xml`        | unused        |

 ## Getting Started

```rust
# use collection_export::{
#     core::{exporter::Exporter, format::Preset, record::Model},
#     error::ExportError,
# };
# use serde::Serialize;
# use std::fs;
#[derive(Serialize)]
struct Car {
    year: u16,
    make: String,
    model: String,
}

fn main() -> Result<(), ExportError> {
    let dir = tempfile::tempdir()?;
    let cars = vec![
        Car { year: 1948, make: "Porsche".to_string(), model: "356".to_string() },
        Car { year: 1995, make: "Peugeot".to_string(), model: "205".to_string() },
    ];
    let records = cars
        .iter()
        .map(Model::from_serialize)
        .collect::<Result<Vec<_>, _>>()?;

    let mut exporter = Exporter::from_preset(Preset::Csv, dir.path().join("cars"));
    let csv = exporter.export(&records)?;
    assert_eq!(
        fs::read_to_string(&csv)?,
        "\"year\",\"make\",\"model\"\n\"1948\",\"Porsche\",\"356\"\n\"1995\",\"Peugeot\",\"205\"\n"
    );

    exporter.change_preset(Preset::Xml, None)?;
    let xml = exporter.export(&records)?;
    assert!(fs::read_to_string(&xml)?.contains("<make>Peugeot</make>"));

    Ok(())
}
```

 ## Escaping

 Delimited values are backslash-escaped by default: `"`, `\` and `/` are
 prefixed with `\`. Select [`Quoting::Standard`](core::format::Quoting) for
 RFC 4180 output where the enclosure character is doubled instead. XML values
 are entity-escaped.

 ## Failures

 Every operation returns [`ExportResult`]. Once the output file has been
 created, any failure (a malformed record, a write error, or an XML document
 that cannot be parsed back) removes the file before the error is returned.
 */

/// Records, format settings and the exporter
pub mod core;

/// Error types for export operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Delimited and XML record writers
pub mod item;
