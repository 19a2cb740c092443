use std::env;

/// Display name reported to the host client.
pub const PLUGIN_NAME: &str = "AdminTools";

/// Prefix the host stores hotkey bindings under.
pub const HOTKEY_PREFIX: &str = "JAT";

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "ADMINTOOLS_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

/// Resolves the tracing filter from the environment, falling back to `info`.
pub fn log_filter() -> String {
    match env::var(LOG_ENV) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => DEFAULT_LOG_FILTER.to_string(),
    }
}
