//! Streaming CSV database seeding for Rust.
//!
//! This crate seeds database tables from CSV files during test and
//! database-seeding workflows:
//!
//! - **Streaming loader**: bounded-memory CSV parsing with chunked bulk
//!   inserts and a total-rows-inserted report
//! - **Transport sniffing**: plain and gzip-compressed sources, detected
//!   from file content rather than extension
//! - **Sink registry**: explicit table-name-to-sink resolution, no
//!   reflection or naming conventions
//! - **`seedcsv` command**: seed many tables at once with conventional
//!   `{database}_{table}.csv` file lookup
//!
//! # Features
//!
//! - `gzip` - gzip-compressed source support (enabled by default)
//!
//! # Quick Start
//!
//! Implement [`RowSink`](csv::RowSink) for your table and stream a file
//! into it:
//!
//! ```ignore
//! use csv_seeder::prelude::*;
//!
//! let loader = CsvBulkLoader::with_config(
//!     LoaderConfig::new().with_chunk_size(ChunkSize::Fixed(500)),
//! );
//! let report = loader.load(Path::new("seeds/app_users.csv"), &sink).await?;
//! println!("inserted {} rows", report.rows_inserted);
//! ```
//!
//! Or register sinks and seed by table name:
//!
//! ```ignore
//! use csv_seeder::prelude::*;
//!
//! register_sink(UsersSink::new(pool.clone()));
//!
//! let command = SeedCsvCommand::new();
//! let args = SeedCsvArgs {
//!     targets: vec![SeedTarget::new("users")],
//! };
//! let options = SeedCsvOptions::new()
//!     .with_database("app")
//!     .with_verbosity(1);
//! let report = command.execute(args, options).await?;
//! ```
//!
//! # Architecture
//!
//! ## Core loader
//!
//! - [`Row`](csv::Row) / [`Header`](csv::Header) - named, ordered field
//!   values; null-sentinel tokens (`NULL`, `null` by default) become true
//!   nulls
//! - [`TransportFormat`](csv::TransportFormat) - content-based plain/gzip
//!   detection
//! - [`CsvParser`](csv::CsvParser) - streaming, quoting-aware record
//!   decoding
//! - [`CsvBulkLoader`](csv::CsvBulkLoader) - batching, sink delivery, and
//!   the [`LoadReport`](csv::LoadReport) statistics
//!
//! Rows are delivered to the sink in file order in batches of at most the
//! configured chunk size; with [`ChunkSize::Auto`](csv::ChunkSize) the size
//! is derived from the sink's bound-parameter ceiling. Records whose field
//! count does not match the header are skipped and reported, never silently
//! truncated.
//!
//! ## Sinks
//!
//! - [`RowSink`](csv::RowSink) trait - `clear`, `insert_rows`, and an
//!   optional parameter-ceiling hint
//! - [`register_sink`](csv::register_sink) /
//!   [`SinkRegistry`](csv::SinkRegistry) - global table-name resolution
//!
//! ## Commands
//!
//! - [`SeedCsvCommand`](commands::SeedCsvCommand) - seed registered tables
//!   from conventionally-named files

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod commands;
pub mod csv;
pub mod error;
pub mod prelude;

// Re-export commonly used types at crate root
pub use self::csv::{
	ChunkSize, CsvBulkLoader, CsvParser, Header, LoadReport, LoaderConfig, MalformedRow, Row,
	RowSink, TransportFormat,
};
pub use error::{SeedingError, SeedingResult};
