//! Client configuration: explicit options, the YAML settings file and the
//! loader that resolves them (with environment fallback) exactly once.

pub mod loader;
pub mod settings;

pub use loader::{load_options, ClientConfig, Credentials};
pub use settings::{ClientOptions, LogFormat, LoggingConfig};
