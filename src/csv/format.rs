//! Row and transport format definitions.
//!
//! This module defines the data model for seed files: the header captured
//! from the first record, the named rows assembled from each subsequent
//! record, and the transport format a source is stored in.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::error::{SeedingError, SeedingResult};

/// Ordered sequence of column names captured from the first record.
///
/// Immutable for the remainder of a parse. Every subsequent record is
/// expected to carry exactly this many fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
	columns: Vec<String>,
}

impl Header {
	/// Creates a header from a list of column names.
	pub fn new(columns: Vec<String>) -> Self {
		Self { columns }
	}

	/// Returns the column names in file order.
	pub fn columns(&self) -> &[String] {
		&self.columns
	}

	/// Returns the number of columns.
	pub fn len(&self) -> usize {
		self.columns.len()
	}

	/// Returns true if the header has no columns.
	pub fn is_empty(&self) -> bool {
		self.columns.is_empty()
	}

	/// Returns the positional index of a column name.
	pub fn index_of(&self, name: &str) -> Option<usize> {
		self.columns.iter().position(|c| c == name)
	}
}

/// A single data record: an ordered mapping from column name to field value.
///
/// A value of `None` is a true null, produced when the source field matched
/// one of the configured null-sentinel tokens.
///
/// # Example
///
/// ```
/// # use std::sync::Arc;
/// # use csv_seeder::csv::{Header, Row};
/// let header = Arc::new(Header::new(vec!["login".into(), "active".into()]));
/// let row = Row::new(header, vec![Some("john.doe".into()), None]);
/// assert_eq!(row.get("login"), Some("john.doe"));
/// assert!(row.is_null("active"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
	header: Arc<Header>,
	values: Vec<Option<String>>,
}

impl Row {
	/// Creates a row from a shared header and positional values.
	///
	/// Callers must supply exactly one value per header column.
	pub fn new(header: Arc<Header>, values: Vec<Option<String>>) -> Self {
		debug_assert_eq!(header.len(), values.len());
		Self { header, values }
	}

	/// Returns the value of a column, or `None` if the column is absent or
	/// its value is null.
	pub fn get(&self, column: &str) -> Option<&str> {
		let index = self.header.index_of(column)?;
		self.values[index].as_deref()
	}

	/// Returns true if the column exists and holds a null value.
	pub fn is_null(&self, column: &str) -> bool {
		self.header
			.index_of(column)
			.map(|index| self.values[index].is_none())
			.unwrap_or(false)
	}

	/// Returns the column names in file order.
	pub fn columns(&self) -> &[String] {
		self.header.columns()
	}

	/// Returns the field values in file order.
	pub fn values(&self) -> &[Option<String>] {
		&self.values
	}

	/// Iterates over `(column, value)` pairs in file order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
		self.header
			.columns()
			.iter()
			.map(|c| c.as_str())
			.zip(self.values.iter().map(|v| v.as_deref()))
	}

	/// Returns the number of fields.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns true if the row has no fields.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Converts the row into a JSON object, with nulls for absent values.
	pub fn to_json(&self) -> Value {
		let mut map = serde_json::Map::with_capacity(self.len());
		for (column, value) in self.iter() {
			let value = match value {
				Some(v) => Value::String(v.to_string()),
				None => Value::Null,
			};
			map.insert(column.to_string(), value);
		}
		Value::Object(map)
	}
}

impl Serialize for Row {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.len()))?;
		for (column, value) in self.iter() {
			map.serialize_entry(column, &value)?;
		}
		map.end()
	}
}

/// A record whose field count did not match the header.
///
/// Malformed rows are skipped and reported on the load result instead of
/// aborting the load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
	/// 1-based line of the record start in the source file.
	pub line: u64,

	/// Number of fields the header defines.
	pub expected: usize,

	/// Number of fields the record carried.
	pub found: usize,
}

impl std::fmt::Display for MalformedRow {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"line {}: expected {} fields, found {}",
			self.line, self.expected, self.found
		)
	}
}

/// Transport format of a seed file, decided by content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum TransportFormat {
	/// Plain delimited text (default).
	#[default]
	Plain,

	/// Gzip-compressed delimited text (requires the `gzip` feature).
	Gzip,
}

/// Gzip stream magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

impl TransportFormat {
	/// Sniffs the transport format from the leading bytes of a source.
	///
	/// Detection is content-based, never extension-based: a gzip stream is
	/// recognized by its `1F 8B` magic, and a prefix containing a NUL byte
	/// is rejected as binary. An empty prefix sniffs as plain text, so an
	/// empty file loads zero rows instead of failing.
	///
	/// # Example
	///
	/// ```
	/// # use csv_seeder::csv::TransportFormat;
	/// assert_eq!(TransportFormat::sniff(b"a,b\n1,2\n").unwrap(), TransportFormat::Plain);
	/// assert_eq!(TransportFormat::sniff(&[0x1f, 0x8b, 0x08]).unwrap(), TransportFormat::Gzip);
	/// assert!(TransportFormat::sniff(&[0x00, 0x01, 0x02]).is_err());
	/// ```
	pub fn sniff(prefix: &[u8]) -> SeedingResult<Self> {
		if prefix.starts_with(&GZIP_MAGIC) {
			return Ok(Self::Gzip);
		}

		if prefix.contains(&0) {
			return Err(SeedingError::UnsupportedFormat(
				"source is neither delimited text nor gzip".to_string(),
			));
		}

		Ok(Self::Plain)
	}

	/// Returns the MIME type for this format.
	pub fn mime_type(&self) -> &'static str {
		match self {
			Self::Plain => "text/csv",
			Self::Gzip => "application/x-gzip",
		}
	}
}

impl std::fmt::Display for TransportFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Plain => write!(f, "plain"),
			Self::Gzip => write!(f, "gzip"),
		}
	}
}
