mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{CliOverrides, ConfigSources, build_config};
pub use models::AppConfig;
