pub mod config;
pub mod inventory;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod parser;
pub mod report;
pub mod version;
