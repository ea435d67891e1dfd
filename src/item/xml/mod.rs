//! XML output.
//!
//! The writer produces a compact document using `quick-xml`; the beautifier
//! then re-parses the file and rewrites it with two-space indentation.
//!
//! ```xml
//! <?xml version="1.0"?>
//! <CarCollection>
//!   <Car>
//!     <id>1</id>
//!     <name>A</name>
//!   </Car>
//! </CarCollection>
//! ```

/// Compact XML record writer.
pub mod xml_writer;

/// Re-parse and indent pass over a written XML file.
pub mod xml_beautifier;

pub use xml_beautifier::beautify;
pub use xml_writer::{XmlItemWriter, XmlItemWriterBuilder, implode_to_xml};
