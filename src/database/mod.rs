pub mod error;
pub mod manager;
pub mod models;
pub mod search;
pub mod sort;

pub use error::{parse_id, BadData, DataError, DataResult};
pub use manager::{DatabaseError, DatabaseManager};
