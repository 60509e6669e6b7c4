//! HTTP server configuration object and helpers.

use appointment_api::settings::AppSettings;

/// Resolved configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) expose_exception_details: bool,
    pub(crate) simulate_failures: bool,
}

impl ServerConfig {
    /// Resolve defaults from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &AppSettings) -> Self {
        let (host, port) = settings.bind_addr();
        Self {
            host: host.to_owned(),
            port,
            expose_exception_details: settings.expose_exception_details,
            simulate_failures: settings.simulate_failures,
        }
    }
}
