//! Error types for the seeding module.
//!
//! This module defines the error types used throughout the csv-seeder crate.

use thiserror::Error;

/// Errors that can occur during seeding operations.
#[derive(Debug, Error)]
pub enum SeedingError {
	/// Source file is missing or unreadable.
	#[error("Source unavailable: {0}")]
	SourceUnavailable(String),

	/// Content sniffing recognized neither plain text nor gzip.
	#[error("Unsupported source format: {0}")]
	UnsupportedFormat(String),

	/// Destination rejected a batch of rows.
	#[error("Sink write failed: {0}")]
	SinkWriteFailed(String),

	/// No sink was registered for the table.
	#[error("Sink not found for table: {0}")]
	SinkNotFound(String),

	/// Validation failed for a specific field.
	#[error("Validation error: {field}: {message}")]
	ValidationError {
		/// Field that failed validation.
		field: String,
		/// Validation error message.
		message: String,
	},

	/// I/O operation failed.
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	/// CSV decode error (broken quoting, invalid UTF-8).
	#[error("CSV error: {0}")]
	CsvError(#[from] csv::Error),
}

/// Result type alias for seeding operations.
pub type SeedingResult<T> = Result<T, SeedingError>;
