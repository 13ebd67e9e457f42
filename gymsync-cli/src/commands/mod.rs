pub mod config;
pub mod devices;
pub mod serve;
pub mod sync;
