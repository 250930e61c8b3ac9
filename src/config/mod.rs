/// Configuration module - Load and validate license server configuration
pub mod loader;
pub mod schema;

pub use loader::load_config;
pub use schema::ServerConfig;
