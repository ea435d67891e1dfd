/// This module provides the delimited text (CSV, TSV, PSV) record writer.
pub mod delimited;

/// This module provides the XML record writer and the pretty-printing pass.
pub mod xml;
