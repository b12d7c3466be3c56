//! seedcsv command implementation.
//!
//! This command seeds one or more tables from CSV files, resolving each
//! table to its registered sink and each file by naming convention.

use std::path::PathBuf;

use crate::csv::{CsvBulkLoader, LoaderConfig, SinkRegistry};
use crate::error::{SeedingError, SeedingResult};

/// Default directory seed files are looked up in.
pub const DEFAULT_BASE_PATH: &str = "database/seeds/csv";

/// One table to seed, with an optional explicit file override.
#[derive(Debug, Clone)]
pub struct SeedTarget {
	/// Table name, used for sink resolution and filename convention.
	pub table: String,

	/// Explicit seed file path. When unset, the path is resolved as
	/// `{base_path}/{database}_{table}.csv`.
	pub csv_file: Option<PathBuf>,
}

impl SeedTarget {
	/// Creates a target resolved by naming convention.
	pub fn new(table: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			csv_file: None,
		}
	}

	/// Creates a target with an explicit seed file.
	pub fn with_file(table: impl Into<String>, csv_file: impl Into<PathBuf>) -> Self {
		Self {
			table: table.into(),
			csv_file: Some(csv_file.into()),
		}
	}
}

/// Arguments for the seedcsv command.
#[derive(Debug, Clone, Default)]
pub struct SeedCsvArgs {
	/// Tables to seed, in order.
	pub targets: Vec<SeedTarget>,
}

/// Options for the seedcsv command.
#[derive(Debug, Clone)]
pub struct SeedCsvOptions {
	/// Directory seed files are looked up in.
	pub base_path: PathBuf,

	/// Database name used as the filename prefix.
	pub database: Option<String>,

	/// Skip tables with no registered sink instead of failing.
	pub ignore_missing: bool,

	/// Verbosity level.
	pub verbosity: u8,

	/// Loader configuration applied to every table.
	pub config: LoaderConfig,
}

impl Default for SeedCsvOptions {
	fn default() -> Self {
		Self {
			base_path: PathBuf::from(DEFAULT_BASE_PATH),
			database: None,
			ignore_missing: false,
			verbosity: 0,
			config: LoaderConfig::default(),
		}
	}
}

impl SeedCsvOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the seed file directory.
	pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
		self.base_path = base_path.into();
		self
	}

	/// Sets the database name used as the filename prefix.
	pub fn with_database(mut self, database: impl Into<String>) -> Self {
		self.database = Some(database.into());
		self
	}

	/// Sets the ignore missing flag.
	pub fn with_ignore_missing(mut self, ignore: bool) -> Self {
		self.ignore_missing = ignore;
		self
	}

	/// Sets the verbosity level.
	pub fn with_verbosity(mut self, level: u8) -> Self {
		self.verbosity = level;
		self
	}

	/// Sets the loader configuration.
	pub fn with_config(mut self, config: LoaderConfig) -> Self {
		self.config = config;
		self
	}

	/// Resolves the conventional seed file path for a table.
	///
	/// # Example
	///
	/// ```
	/// # use csv_seeder::commands::SeedCsvOptions;
	/// let options = SeedCsvOptions::new()
	///     .with_base_path("seeds")
	///     .with_database("app");
	/// assert_eq!(options.csv_path("users").to_str(), Some("seeds/app_users.csv"));
	/// ```
	pub fn csv_path(&self, table: &str) -> PathBuf {
		let filename = match &self.database {
			Some(database) => format!("{}_{}.csv", database, table),
			None => format!("{}.csv", table),
		};
		self.base_path.join(filename)
	}
}

/// Result statistics for one seedcsv run.
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
	/// Number of tables seeded.
	pub tables_seeded: usize,

	/// Total rows inserted across all tables.
	pub rows_inserted: usize,

	/// Tables skipped because no sink was registered.
	pub skipped_tables: Vec<String>,

	/// Per-row warnings accumulated across all tables.
	pub warnings: Vec<String>,
}

/// The seedcsv command for seeding tables from CSV files.
///
/// # Example
///
/// ```ignore
/// let command = SeedCsvCommand::new();
/// let args = SeedCsvArgs {
///     targets: vec![SeedTarget::new("users")],
/// };
/// let options = SeedCsvOptions::new()
///     .with_database("app")
///     .with_verbosity(1);
/// let report = command.execute(args, options).await?;
/// println!("Seeded {} rows", report.rows_inserted);
/// ```
#[derive(Debug, Default)]
pub struct SeedCsvCommand;

impl SeedCsvCommand {
	/// Creates a new seedcsv command.
	pub fn new() -> Self {
		Self
	}

	/// Returns the command name.
	pub fn name(&self) -> &str {
		"seedcsv"
	}

	/// Returns the command description.
	pub fn description(&self) -> &str {
		"Seeds database tables from CSV files"
	}

	/// Returns the command help text.
	pub fn help(&self) -> &str {
		r#"
Usage: seedcsv [options] table [table ...]

Seeds the named table(s) from CSV files.

Arguments:
  table                One or more tables to seed

Options:
  --path DIR           Directory to look up seed files in
  --database DB        Database name used as the filename prefix
  --ignore-missing     Skip tables with no registered sink
  --verbosity LEVEL    Verbosity level (0=minimal, 1=normal, 2=verbose)

Seed files are resolved as {path}/{database}_{table}.csv and may be
gzip-compressed; the format is detected from the file content.
"#
	}

	/// Executes the seedcsv command.
	///
	/// Each target table is resolved to its registered sink and loaded from
	/// its seed file. Tables are processed in order; the first hard failure
	/// aborts the run, leaving already-seeded tables in place.
	pub async fn execute(
		&self,
		args: SeedCsvArgs,
		options: SeedCsvOptions,
	) -> SeedingResult<SeedReport> {
		if args.targets.is_empty() {
			return Err(SeedingError::ValidationError {
				field: "targets".to_string(),
				message: "At least one table must be specified".to_string(),
			});
		}

		let registry = SinkRegistry::new();
		let loader = CsvBulkLoader::with_config(options.config.clone());
		let mut report = SeedReport::default();

		for target in &args.targets {
			let path = target
				.csv_file
				.clone()
				.unwrap_or_else(|| options.csv_path(&target.table));

			if !path.exists() {
				return Err(SeedingError::SourceUnavailable(
					path.display().to_string(),
				));
			}

			let Some(sink) = registry.get_sink(&target.table) else {
				if options.ignore_missing {
					report.skipped_tables.push(target.table.clone());
					continue;
				}
				return Err(SeedingError::SinkNotFound(target.table.clone()));
			};

			let load = loader.load(&path, sink.as_ref()).await?;

			report.tables_seeded += 1;
			report.rows_inserted += load.rows_inserted;
			report.warnings.extend(
				load.malformed
					.iter()
					.map(|m| format!("{}: {}", target.table, m)),
			);

			if options.verbosity > 0 {
				println!(
					"Seeded: {} ({} rows)",
					self.display_table(&options, &target.table),
					load.rows_inserted
				);
			}
		}

		if options.verbosity > 0 {
			self.print_warnings(&report);
		}

		Ok(report)
	}

	/// Formats a table name for console output, `database.table` when a
	/// database name is configured.
	fn display_table(&self, options: &SeedCsvOptions, table: &str) -> String {
		match &options.database {
			Some(database) => format!("{}.{}", database, table),
			None => table.to_string(),
		}
	}

	/// Prints accumulated warnings and skipped tables.
	fn print_warnings(&self, report: &SeedReport) {
		if !report.skipped_tables.is_empty() {
			println!("Skipped tables: {:?}", report.skipped_tables);
		}

		if !report.warnings.is_empty() {
			eprintln!("Warnings:");
			for warning in &report.warnings {
				eprintln!("  - {}", warning);
			}
		}
	}
}
