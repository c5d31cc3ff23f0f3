mod loader;
mod types;

pub use loader::{ConfigLoader, parse_window};
pub use types::CliConfig;
