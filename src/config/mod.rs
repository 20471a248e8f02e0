// Re-export all items from the submodules
mod dialect;
mod reader_config;

pub use dialect::{Dialect, DocumentFormat};

pub use reader_config::{load_config, ReaderConfig, ValidatorConfig};
