//! Convenience re-exports for common usage.
//!
//! This module provides a single import for the most commonly used items
//! from the csv-seeder crate.
//!
//! # Example
//!
//! ```
//! use csv_seeder::prelude::*;
//!
//! let config = LoaderConfig::new().with_chunk_size(ChunkSize::Auto);
//! let loader = CsvBulkLoader::with_config(config);
//! # let _ = loader;
//! ```

// Error types
pub use crate::error::{SeedingError, SeedingResult};

// Core loader types
pub use crate::csv::{
	ChunkSize, CsvBulkLoader, CsvParser, DEFAULT_CHUNK_SIZE, DEFAULT_DELIMITER, Header,
	LoadReport, LoaderConfig, MalformedRow, ParsedRecord, Row, RowReader, TransportFormat,
};

// Sink types
pub use crate::csv::{RowSink, SinkRegistry, register_sink};

// Command types
pub use crate::commands::{SeedCsvArgs, SeedCsvCommand, SeedCsvOptions, SeedReport, SeedTarget};
