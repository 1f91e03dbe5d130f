//! I/O module
//!
//! Handles persistence backends and report output.
//!
//! # Components
//!
//! - `file_backend` - Documents as JSON files with atomic replace
//! - `memory_backend` - In-memory documents for tests and benchmarks
//! - `csv_format` - CSV export of wallet balances

pub mod csv_format;
pub mod file_backend;
pub mod memory_backend;

pub use csv_format::write_wallets_csv;
pub use file_backend::FileBackend;
pub use memory_backend::MemoryBackend;
