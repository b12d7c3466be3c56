//! In-memory row sink for integration tests.
//!
//! Stands in for a database table: rows accumulate in memory, `clear`
//! wipes them, and every insert call is logged so tests can assert on
//! batch boundaries.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use csv_seeder::csv::{Row, RowSink};
use csv_seeder::error::SeedingResult;
use parking_lot::Mutex;

#[derive(Default)]
struct MemoryState {
	rows: Mutex<Vec<Row>>,
	batch_sizes: Mutex<Vec<usize>>,
	clears: AtomicUsize,
	max_parameters: Option<usize>,
}

/// Shared-state sink: clones observe the same table contents, so a test
/// can register one clone and keep another for assertions.
#[derive(Clone)]
pub struct MemorySink {
	table: String,
	state: Arc<MemoryState>,
}

impl MemorySink {
	pub fn new(table: &str) -> Self {
		Self {
			table: table.to_string(),
			state: Arc::new(MemoryState::default()),
		}
	}

	pub fn with_max_parameters(table: &str, limit: usize) -> Self {
		Self {
			table: table.to_string(),
			state: Arc::new(MemoryState {
				max_parameters: Some(limit),
				..MemoryState::default()
			}),
		}
	}

	/// Current table contents.
	pub fn rows(&self) -> Vec<Row> {
		self.state.rows.lock().clone()
	}

	/// Sizes of the insert batches received, in order.
	pub fn batch_sizes(&self) -> Vec<usize> {
		self.state.batch_sizes.lock().clone()
	}

	/// Number of times the sink was cleared.
	pub fn clears(&self) -> usize {
		self.state.clears.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl RowSink for MemorySink {
	fn table(&self) -> &str {
		&self.table
	}

	async fn clear(&self) -> SeedingResult<()> {
		self.state.rows.lock().clear();
		self.state.clears.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	async fn insert_rows(&self, rows: &[Row]) -> SeedingResult<()> {
		self.state.batch_sizes.lock().push(rows.len());
		self.state.rows.lock().extend_from_slice(rows);
		Ok(())
	}

	fn max_parameters_per_statement(&self) -> Option<usize> {
		self.state.max_parameters
	}
}
