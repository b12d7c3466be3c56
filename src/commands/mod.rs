//! Management commands for database seeding.
//!
//! Command-style wrappers over the core loader, for use from a host
//! application's seeding entrypoint.

pub mod seed_csv;

pub use seed_csv::{SeedCsvArgs, SeedCsvCommand, SeedCsvOptions, SeedReport, SeedTarget};
