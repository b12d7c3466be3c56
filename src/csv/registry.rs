//! Sink registry for table seeding.
//!
//! This module provides the destination abstraction rows are delivered to,
//! and a global registry mapping table names to registered sinks. The
//! registry replaces naming-convention class resolution with an explicit
//! mapping supplied by the caller.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::Row;
use crate::error::{SeedingError, SeedingResult};

/// Destination for seeded rows.
///
/// Implement this trait for each table that should support CSV seeding.
/// A sink stands in for a database table: it can be cleared and accepts
/// bulk inserts of named rows.
#[async_trait]
pub trait RowSink: Send + Sync {
	/// Returns the table name this sink writes to.
	fn table(&self) -> &str;

	/// Wipes the destination. Idempotent.
	async fn clear(&self) -> SeedingResult<()>;

	/// Inserts a batch of rows, in order.
	///
	/// Each call carries at most one chunk of rows. Implementations should
	/// surface rejected batches as [`SeedingError::SinkWriteFailed`].
	async fn insert_rows(&self, rows: &[Row]) -> SeedingResult<()>;

	/// Upper bound on bound parameters per insert statement, if the
	/// destination engine has one.
	///
	/// Used to derive a chunk size when the loader is configured with
	/// automatic chunking.
	fn max_parameters_per_statement(&self) -> Option<usize> {
		None
	}
}

/// Global registry for row sinks.
static SINK_REGISTRY: Lazy<RwLock<HashMap<String, Arc<dyn RowSink>>>> =
	Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers a sink in the global registry under its table name.
///
/// # Example
///
/// ```ignore
/// struct UsersSink;
///
/// #[async_trait]
/// impl RowSink for UsersSink {
///     fn table(&self) -> &str { "users" }
///     async fn clear(&self) -> SeedingResult<()> { todo!() }
///     async fn insert_rows(&self, rows: &[Row]) -> SeedingResult<()> { todo!() }
/// }
///
/// register_sink(UsersSink);
/// ```
pub fn register_sink<S: RowSink + 'static>(sink: S) {
	let table = sink.table().to_string();
	SINK_REGISTRY.write().insert(table, Arc::new(sink));
}

/// Sink registry providing access to registered sinks.
#[derive(Debug, Default)]
pub struct SinkRegistry;

impl SinkRegistry {
	/// Creates a new sink registry reference.
	pub fn new() -> Self {
		Self
	}

	/// Gets the sink registered for a table.
	pub fn get_sink(&self, table: &str) -> Option<Arc<dyn RowSink>> {
		SINK_REGISTRY.read().get(table).cloned()
	}

	/// Checks if a sink is registered for the table.
	pub fn has_sink(&self, table: &str) -> bool {
		SINK_REGISTRY.read().contains_key(table)
	}

	/// Returns all registered table names.
	pub fn table_names(&self) -> Vec<String> {
		SINK_REGISTRY.read().keys().cloned().collect()
	}

	/// Clears all registered sinks.
	///
	/// This is primarily useful for testing.
	pub fn clear(&self) {
		SINK_REGISTRY.write().clear();
	}

	/// Returns the number of registered sinks.
	pub fn len(&self) -> usize {
		SINK_REGISTRY.read().len()
	}

	/// Returns true if no sinks are registered.
	pub fn is_empty(&self) -> bool {
		SINK_REGISTRY.read().is_empty()
	}

	/// Gets the sink for a table, or fails with
	/// [`SeedingError::SinkNotFound`].
	pub fn resolve(&self, table: &str) -> SeedingResult<Arc<dyn RowSink>> {
		self.get_sink(table)
			.ok_or_else(|| SeedingError::SinkNotFound(table.to_string()))
	}
}
