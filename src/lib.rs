pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod seed;
pub mod test_helpers;
