pub mod loader;
pub mod schema;
pub mod settings;

pub use loader::ConfigLoader;
pub use schema::{FetchConfig, OutputConfig};
pub use settings::Configuration;
