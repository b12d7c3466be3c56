//! Streaming bulk loading.
//!
//! This module delivers parsed rows to a sink in bounded-size batches and
//! reports what was inserted, what was skipped, and why.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use super::{CsvParser, MalformedRow, ParsedRecord, Row, RowReader, RowSink};
use crate::error::{SeedingError, SeedingResult};

/// Default number of rows per insert batch.
pub const DEFAULT_CHUNK_SIZE: usize = 200;

/// Batch sizing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSize {
	/// A fixed number of rows per batch. Must be at least 1.
	Fixed(usize),

	/// Derive the batch size from the sink's bound-parameter ceiling:
	/// `max(1, limit / column_count)`. Falls back to
	/// [`DEFAULT_CHUNK_SIZE`] when the sink offers no hint.
	Auto,
}

impl Default for ChunkSize {
	fn default() -> Self {
		Self::Fixed(DEFAULT_CHUNK_SIZE)
	}
}

/// Immutable configuration for one load operation.
///
/// A config value is passed explicitly into each load; there is no ambient
/// process-wide state.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
	/// Field delimiter.
	pub delimiter: u8,

	/// Batch sizing policy.
	pub chunk_size: ChunkSize,

	/// Tokens normalized to null values.
	pub null_tokens: Vec<String>,

	/// Preset column names. When set, the first record is data.
	pub headers: Option<Vec<String>>,

	/// Whether to clear the sink before inserting.
	pub truncate: bool,
}

impl Default for LoaderConfig {
	fn default() -> Self {
		Self {
			delimiter: super::parser::DEFAULT_DELIMITER,
			chunk_size: ChunkSize::default(),
			null_tokens: CsvParser::default_null_tokens(),
			headers: None,
			truncate: true,
		}
	}
}

impl LoaderConfig {
	/// Creates a config with default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the field delimiter.
	pub fn with_delimiter(mut self, delimiter: u8) -> Self {
		self.delimiter = delimiter;
		self
	}

	/// Sets the batch sizing policy.
	pub fn with_chunk_size(mut self, chunk_size: ChunkSize) -> Self {
		self.chunk_size = chunk_size;
		self
	}

	/// Sets the tokens normalized to null values.
	pub fn with_null_tokens(mut self, tokens: Vec<String>) -> Self {
		self.null_tokens = tokens;
		self
	}

	/// Presets the column names.
	pub fn with_headers(mut self, headers: Vec<String>) -> Self {
		self.headers = Some(headers);
		self
	}

	/// Sets whether to clear the sink before inserting.
	pub fn with_truncate(mut self, truncate: bool) -> Self {
		self.truncate = truncate;
		self
	}
}

/// Statistics for one completed load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
	/// Total rows delivered to the sink, header excluded.
	pub rows_inserted: usize,

	/// Number of `insert_rows` calls made.
	pub batches_flushed: usize,

	/// Records skipped because their field count did not match the header.
	pub malformed: Vec<MalformedRow>,

	/// Source file path, when loading from a file.
	pub source: Option<String>,
}

/// Streams a CSV source into a sink in bounded-size batches.
///
/// The loader never buffers the whole file: it holds at most one open batch
/// plus one in-flight record. Batch boundaries are deterministic for a given
/// source and config.
///
/// # Example
///
/// ```ignore
/// let loader = CsvBulkLoader::with_config(
///     LoaderConfig::new().with_chunk_size(ChunkSize::Fixed(500)),
/// );
/// let report = loader.load(Path::new("seeds/app_users.csv"), &sink).await?;
/// println!("inserted {} rows", report.rows_inserted);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvBulkLoader {
	config: LoaderConfig,
}

impl CsvBulkLoader {
	/// Creates a loader with default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a loader with the given configuration.
	pub fn with_config(config: LoaderConfig) -> Self {
		Self { config }
	}

	/// Returns the loader configuration.
	pub fn config(&self) -> &LoaderConfig {
		&self.config
	}

	/// Loads a seed file into the sink.
	///
	/// The source is opened and format-sniffed before any sink mutation, so
	/// a missing or unreadable file never clears the destination. The sink
	/// is cleared exactly once when the config requests truncation, then
	/// rows are inserted in file order in batches of at most the resolved
	/// chunk size, with a final partial flush.
	///
	/// # Errors
	///
	/// - [`SeedingError::SourceUnavailable`] / [`SeedingError::UnsupportedFormat`]
	///   before any mutation.
	/// - Sink failures are propagated immediately; batches already flushed
	///   stay applied. Callers needing atomicity wrap the load in an
	///   external transaction.
	pub async fn load(&self, source: &Path, sink: &dyn RowSink) -> SeedingResult<LoadReport> {
		let reader = self.parser().open(source)?;
		self.run(reader, sink, Some(source.display().to_string()))
			.await
	}

	/// Loads already-decoded CSV input into the sink.
	///
	/// Same contract as [`load`](Self::load), without file access or
	/// format sniffing.
	pub async fn load_reader<R: Read + Send>(
		&self,
		input: R,
		sink: &dyn RowSink,
	) -> SeedingResult<LoadReport> {
		let reader = self.parser().from_reader(input)?;
		self.run(reader, sink, None).await
	}

	fn parser(&self) -> CsvParser {
		let mut parser = CsvParser::new()
			.with_delimiter(self.config.delimiter)
			.with_null_tokens(self.config.null_tokens.clone());
		if let Some(headers) = &self.config.headers {
			parser = parser.with_headers(headers.clone());
		}
		parser
	}

	fn resolve_chunk_size(&self, columns: usize, sink: &dyn RowSink) -> SeedingResult<usize> {
		match self.config.chunk_size {
			ChunkSize::Fixed(0) => Err(SeedingError::ValidationError {
				field: "chunk_size".to_string(),
				message: "must be at least 1".to_string(),
			}),
			ChunkSize::Fixed(size) => Ok(size),
			ChunkSize::Auto => Ok(sink
				.max_parameters_per_statement()
				.filter(|_| columns > 0)
				.map(|limit| (limit / columns).max(1))
				.unwrap_or(DEFAULT_CHUNK_SIZE)),
		}
	}

	async fn run<R: Read>(
		&self,
		mut reader: RowReader<R>,
		sink: &dyn RowSink,
		source: Option<String>,
	) -> SeedingResult<LoadReport> {
		let chunk_size = self.resolve_chunk_size(reader.header().len(), sink)?;

		if self.config.truncate {
			sink.clear().await?;
		}

		let mut report = LoadReport {
			source,
			..Default::default()
		};
		let mut batch: Vec<Row> = Vec::with_capacity(chunk_size);

		for record in reader.by_ref() {
			match record? {
				ParsedRecord::Row(row) => {
					batch.push(row);
					if batch.len() == chunk_size {
						Self::flush(sink, &mut batch, &mut report).await?;
					}
				}
				ParsedRecord::Malformed(malformed) => {
					warn!(
						line = malformed.line,
						expected = malformed.expected,
						found = malformed.found,
						"skipping malformed row"
					);
					report.malformed.push(malformed);
				}
			}
		}

		if !batch.is_empty() {
			Self::flush(sink, &mut batch, &mut report).await?;
		}

		info!(
			rows = report.rows_inserted,
			batches = report.batches_flushed,
			skipped = report.malformed.len(),
			"seed load complete"
		);
		Ok(report)
	}

	async fn flush(
		sink: &dyn RowSink,
		batch: &mut Vec<Row>,
		report: &mut LoadReport,
	) -> SeedingResult<()> {
		debug!(rows = batch.len(), "flushing batch");
		sink.insert_rows(batch).await?;
		report.rows_inserted += batch.len();
		report.batches_flushed += 1;
		batch.clear();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use parking_lot::Mutex;
	use rstest::rstest;
	use std::io::Write;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use tempfile::NamedTempFile;

	#[derive(Default)]
	struct CollectingSink {
		batches: Mutex<Vec<Vec<Row>>>,
		clears: AtomicUsize,
		max_parameters: Option<usize>,
		fail_on_batch: Option<usize>,
	}

	impl CollectingSink {
		fn new() -> Self {
			Self::default()
		}

		fn with_max_parameters(max_parameters: usize) -> Self {
			Self {
				max_parameters: Some(max_parameters),
				..Self::default()
			}
		}

		fn failing_on_batch(batch: usize) -> Self {
			Self {
				fail_on_batch: Some(batch),
				..Self::default()
			}
		}

		fn batch_sizes(&self) -> Vec<usize> {
			self.batches.lock().iter().map(|b| b.len()).collect()
		}

		fn rows(&self) -> Vec<Row> {
			self.batches.lock().iter().flatten().cloned().collect()
		}
	}

	#[async_trait]
	impl RowSink for CollectingSink {
		fn table(&self) -> &str {
			"collected"
		}

		async fn clear(&self) -> SeedingResult<()> {
			self.clears.fetch_add(1, Ordering::SeqCst);
			Ok(())
		}

		async fn insert_rows(&self, rows: &[Row]) -> SeedingResult<()> {
			let mut batches = self.batches.lock();
			if self.fail_on_batch == Some(batches.len() + 1) {
				return Err(SeedingError::SinkWriteFailed(
					"duplicate key".to_string(),
				));
			}
			batches.push(rows.to_vec());
			Ok(())
		}

		fn max_parameters_per_statement(&self) -> Option<usize> {
			self.max_parameters
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_batches_partition_rows_in_order() {
		let sink = CollectingSink::new();
		let loader = CsvBulkLoader::with_config(
			LoaderConfig::new().with_chunk_size(ChunkSize::Fixed(2)),
		);

		let input = &b"id,name\n1,a\n2,b\n3,c\n4,d\n5,e\n"[..];
		let report = loader.load_reader(input, &sink).await.unwrap();

		assert_eq!(report.rows_inserted, 5);
		assert_eq!(report.batches_flushed, 3);
		assert_eq!(sink.batch_sizes(), vec![2, 2, 1]);

		let names: Vec<_> = sink
			.rows()
			.iter()
			.map(|r| r.get("name").unwrap().to_string())
			.collect();
		assert_eq!(names, ["a", "b", "c", "d", "e"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_chunk_size_one() {
		let sink = CollectingSink::new();
		let loader = CsvBulkLoader::with_config(
			LoaderConfig::new().with_chunk_size(ChunkSize::Fixed(1)),
		);

		let input = &b"login,active\njohn.doe,1\njane.doe,0\n"[..];
		let report = loader.load_reader(input, &sink).await.unwrap();

		assert_eq!(report.rows_inserted, 2);
		assert_eq!(sink.batch_sizes(), vec![1, 1]);
		let rows = sink.rows();
		assert_eq!(rows[0].get("login"), Some("john.doe"));
		assert_eq!(rows[0].get("active"), Some("1"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_auto_chunk_derived_from_sink_hint() {
		// 8 parameters across 4 columns leaves room for 2 rows per batch.
		let sink = CollectingSink::with_max_parameters(8);
		let loader =
			CsvBulkLoader::with_config(LoaderConfig::new().with_chunk_size(ChunkSize::Auto));

		let input = &b"a,b,c,d\n1,2,3,4\n5,6,7,8\n9,10,11,12\n13,14,15,16\n17,18,19,20\n"[..];
		let report = loader.load_reader(input, &sink).await.unwrap();

		assert_eq!(report.rows_inserted, 5);
		assert_eq!(sink.batch_sizes(), vec![2, 2, 1]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_auto_chunk_without_hint_uses_default() {
		let sink = CollectingSink::new();
		let loader =
			CsvBulkLoader::with_config(LoaderConfig::new().with_chunk_size(ChunkSize::Auto));

		let input = &b"a,b\n1,2\n3,4\n5,6\n"[..];
		let report = loader.load_reader(input, &sink).await.unwrap();

		assert_eq!(report.rows_inserted, 3);
		assert_eq!(report.batches_flushed, 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_truncate_clears_sink_once() {
		let sink = CollectingSink::new();
		let loader = CsvBulkLoader::new();

		loader
			.load_reader(&b"a,b\n1,2\n"[..], &sink)
			.await
			.unwrap();
		assert_eq!(sink.clears.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_truncate_disabled_leaves_sink() {
		let sink = CollectingSink::new();
		let loader =
			CsvBulkLoader::with_config(LoaderConfig::new().with_truncate(false));

		loader
			.load_reader(&b"a,b\n1,2\n"[..], &sink)
			.await
			.unwrap();
		assert_eq!(sink.clears.load(Ordering::SeqCst), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_malformed_rows_skipped_and_reported() {
		let sink = CollectingSink::new();
		let loader = CsvBulkLoader::new();

		let input = &b"a,b\n1,2,3\n4,5\n"[..];
		let report = loader.load_reader(input, &sink).await.unwrap();

		assert_eq!(report.rows_inserted, 1);
		assert_eq!(report.malformed.len(), 1);
		assert_eq!(report.malformed[0].line, 2);
		assert_eq!(report.malformed[0].found, 3);
	}

	#[rstest]
	#[tokio::test]
	async fn test_zero_chunk_size_rejected_before_mutation() {
		let sink = CollectingSink::new();
		let loader = CsvBulkLoader::with_config(
			LoaderConfig::new().with_chunk_size(ChunkSize::Fixed(0)),
		);

		let result = loader.load_reader(&b"a,b\n1,2\n"[..], &sink).await;
		assert!(matches!(
			result,
			Err(SeedingError::ValidationError { .. })
		));
		assert_eq!(sink.clears.load(Ordering::SeqCst), 0);
		assert!(sink.batch_sizes().is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_sink_failure_propagates_and_keeps_prior_batches() {
		let sink = CollectingSink::failing_on_batch(2);
		let loader = CsvBulkLoader::with_config(
			LoaderConfig::new().with_chunk_size(ChunkSize::Fixed(2)),
		);

		let input = &b"a,b\n1,2\n3,4\n5,6\n7,8\n"[..];
		let result = loader.load_reader(input, &sink).await;

		assert!(matches!(result, Err(SeedingError::SinkWriteFailed(_))));
		assert_eq!(sink.batch_sizes(), vec![2]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_empty_input_inserts_nothing() {
		let sink = CollectingSink::new();
		let loader = CsvBulkLoader::new();

		let report = loader.load_reader(&b""[..], &sink).await.unwrap();
		assert_eq!(report.rows_inserted, 0);
		assert_eq!(report.batches_flushed, 0);
		assert!(sink.batch_sizes().is_empty());
		// The requested clear still happens.
		assert_eq!(sink.clears.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_load_missing_file_before_mutation() {
		let sink = CollectingSink::new();
		let loader = CsvBulkLoader::new();

		let result = loader
			.load(Path::new("/nonexistent/users.csv"), &sink)
			.await;
		assert!(matches!(result, Err(SeedingError::SourceUnavailable(_))));
		assert_eq!(sink.clears.load(Ordering::SeqCst), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_load_from_file_records_source() {
		let mut file = NamedTempFile::new().unwrap();
		write!(file, "a,b\n1,NULL\n").unwrap();

		let sink = CollectingSink::new();
		let loader = CsvBulkLoader::new();
		let report = loader.load(file.path(), &sink).await.unwrap();

		assert_eq!(report.rows_inserted, 1);
		assert_eq!(
			report.source.as_deref(),
			Some(file.path().display().to_string().as_str())
		);
		assert!(sink.rows()[0].is_null("b"));
	}
}
