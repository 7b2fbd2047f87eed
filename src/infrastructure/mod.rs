pub mod config;
pub mod hc3;
pub mod http;
pub mod process;
pub mod repositories;
