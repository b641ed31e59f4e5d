pub mod config;
pub mod contacts;
pub mod log;
pub mod trigger;
