pub mod loader;
pub mod schema;

pub use loader::{
    load_from_env, load_from_path, load_from_str, ConfigError, SettingsError, SettingsOrigin,
    CONFIG_ENV_VAR,
};
pub use schema::{Settings, ValidationError, ValidationIssue};
