/// Collaborator contract: records, collections and stock implementations.
pub mod record;

/// Output side shared by the delimited and XML writers.
pub mod item;

/// Format settings, presets and output modes.
pub mod format;

/// The exporter and its builder.
pub mod exporter;

/// Feed templates describing an outgoing data file.
pub mod feed;
