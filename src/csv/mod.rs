//! CSV seeding core.
//!
//! Everything needed to stream a delimited seed file into a table sink:
//! the data model ([`Header`], [`Row`], [`TransportFormat`]), the streaming
//! parser ([`CsvParser`]), the chunked bulk loader ([`CsvBulkLoader`]), and
//! the sink abstraction with its registry ([`RowSink`], [`SinkRegistry`]).

pub mod format;
pub mod loader;
pub mod parser;
pub mod registry;

pub use format::{Header, MalformedRow, Row, TransportFormat};
pub use loader::{ChunkSize, CsvBulkLoader, DEFAULT_CHUNK_SIZE, LoadReport, LoaderConfig};
pub use parser::{CsvParser, DEFAULT_DELIMITER, ParsedRecord, RowReader};
pub use registry::{RowSink, SinkRegistry, register_sink};
