//! Streaming CSV parsing.
//!
//! This module opens a seed source, sniffs its transport format, and decodes
//! it record by record into named [`Row`]s under bounded memory.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecordsIntoIter};
#[cfg(feature = "gzip")]
use flate2::read::GzDecoder;

use super::{Header, MalformedRow, Row, TransportFormat};
use crate::error::{SeedingError, SeedingResult};

/// Default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Parser for delimited seed files.
///
/// The parser is configured once and can open any number of sources. Each
/// [`open`](CsvParser::open) call sniffs the transport format from the file
/// content, never from the extension, so gzip-compressed seeds need no
/// special naming.
///
/// # Example
///
/// ```
/// use csv_seeder::csv::CsvParser;
///
/// let parser = CsvParser::new().with_delimiter(b';');
/// let reader = parser.from_reader(&b"login;active\njohn.doe;1\n"[..]).unwrap();
/// let rows: Vec<_> = reader.collect::<Result<Vec<_>, _>>().unwrap();
/// assert_eq!(rows.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CsvParser {
	delimiter: u8,
	null_tokens: Vec<String>,
	headers: Option<Vec<String>>,
}

impl Default for CsvParser {
	fn default() -> Self {
		Self {
			delimiter: DEFAULT_DELIMITER,
			null_tokens: Self::default_null_tokens(),
			headers: None,
		}
	}
}

impl CsvParser {
	/// Creates a parser with default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the default null-sentinel tokens.
	pub fn default_null_tokens() -> Vec<String> {
		vec!["NULL".to_string(), "null".to_string()]
	}

	/// Sets the field delimiter.
	pub fn with_delimiter(mut self, delimiter: u8) -> Self {
		self.delimiter = delimiter;
		self
	}

	/// Sets the tokens normalized to null values.
	pub fn with_null_tokens(mut self, tokens: Vec<String>) -> Self {
		self.null_tokens = tokens;
		self
	}

	/// Presets the column names.
	///
	/// With preset headers the first record of the source is treated as
	/// data instead of being captured as the header.
	pub fn with_headers(mut self, headers: Vec<String>) -> Self {
		self.headers = Some(headers);
		self
	}

	/// Opens a seed file and returns a streaming row reader.
	///
	/// The transport format is sniffed from the file's leading bytes:
	/// gzip streams are decompressed transparently, binary content is
	/// rejected with [`SeedingError::UnsupportedFormat`].
	///
	/// # Errors
	///
	/// Returns [`SeedingError::SourceUnavailable`] if the file is missing
	/// or unreadable.
	pub fn open(&self, path: &Path) -> SeedingResult<RowReader<Box<dyn Read + Send>>> {
		let file = File::open(path)
			.map_err(|e| SeedingError::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
		let mut buffered = BufReader::new(file);

		let format = {
			let prefix = buffered.fill_buf().map_err(|e| {
				SeedingError::SourceUnavailable(format!("{}: {}", path.display(), e))
			})?;
			TransportFormat::sniff(prefix)?
		};

		let input: Box<dyn Read + Send> = match format {
			TransportFormat::Plain => Box::new(buffered),
			#[cfg(feature = "gzip")]
			TransportFormat::Gzip => Box::new(GzDecoder::new(buffered)),
			#[cfg(not(feature = "gzip"))]
			TransportFormat::Gzip => {
				return Err(SeedingError::UnsupportedFormat(
					"gzip sources require the 'gzip' feature".to_string(),
				));
			}
		};

		self.from_reader(input)
	}

	/// Builds a streaming row reader over already-decoded input.
	///
	/// No format sniffing happens here; the input must be plain delimited
	/// text. The header record is consumed immediately unless headers were
	/// preset.
	pub fn from_reader<R: Read>(&self, input: R) -> SeedingResult<RowReader<R>> {
		let reader = ReaderBuilder::new()
			.delimiter(self.delimiter)
			.has_headers(false)
			.flexible(true)
			.from_reader(input);
		let mut records = reader.into_records();

		let header = match &self.headers {
			Some(columns) => Header::new(columns.clone()),
			None => match records.next() {
				Some(Ok(record)) => Header::new(record.iter().map(str::to_string).collect()),
				Some(Err(e)) => return Err(decode_error(e)),
				None => Header::default(),
			},
		};

		Ok(RowReader {
			records,
			header: Arc::new(header),
			null_tokens: self.null_tokens.clone(),
		})
	}
}

/// Maps reader failures to the seeding error model: an interrupted source
/// read is a source problem, anything else is a decode problem.
fn decode_error(e: csv::Error) -> SeedingError {
	if matches!(e.kind(), csv::ErrorKind::Io(_)) {
		SeedingError::SourceUnavailable(e.to_string())
	} else {
		e.into()
	}
}

/// Outcome of decoding one data record.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecord {
	/// A well-formed row.
	Row(Row),

	/// A record whose field count did not match the header.
	Malformed(MalformedRow),
}

/// Pull-based iterator over the data records of one source.
///
/// Holds at most one in-flight record; rows are assembled lazily so the
/// whole file is never buffered in memory.
pub struct RowReader<R: Read> {
	records: StringRecordsIntoIter<R>,
	header: Arc<Header>,
	null_tokens: Vec<String>,
}

impl<R: Read> RowReader<R> {
	/// Returns the header captured for this source.
	pub fn header(&self) -> &Arc<Header> {
		&self.header
	}

	fn normalize(&self, field: &str) -> Option<String> {
		if self.null_tokens.iter().any(|token| token == field) {
			None
		} else {
			Some(field.to_string())
		}
	}
}

impl<R: Read> Iterator for RowReader<R> {
	type Item = SeedingResult<ParsedRecord>;

	fn next(&mut self) -> Option<Self::Item> {
		let record = match self.records.next()? {
			Ok(record) => record,
			Err(e) => return Some(Err(decode_error(e))),
		};

		if record.len() != self.header.len() {
			let line = record.position().map(|p| p.line()).unwrap_or(0);
			return Some(Ok(ParsedRecord::Malformed(MalformedRow {
				line,
				expected: self.header.len(),
				found: record.len(),
			})));
		}

		let values = record.iter().map(|field| self.normalize(field)).collect();
		Some(Ok(ParsedRecord::Row(Row::new(
			Arc::clone(&self.header),
			values,
		))))
	}
}
