pub mod base;
pub mod base_traits;
pub mod error;

pub use base::{UPSERT_CHUNK_ROWS, clear_rows, upsert_rows};
pub use base_traits::UpsertTarget;
pub use error::{StoreError, StoreResult};
