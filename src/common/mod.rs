pub mod config;
pub mod error;
pub mod file_utils;
pub mod mode;
pub mod resources;
pub mod tokenizer;

pub use config::Config;
pub use mode::DataMode;
