// Database module
// SQLite document store holding article collections

pub mod sqlite;

pub use sqlite::*;
