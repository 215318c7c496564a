pub mod connection;
pub mod dao;
pub mod entities;
pub mod sql_guard;
pub mod store;

pub use dao::{StoreError, StoreResult};
pub use store::{DatasetStore, QueryRow, QueryStore};
