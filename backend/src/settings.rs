//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `APPOINTMENT_API_*` environment variables and
//! configuration files. Bind address fields are optional with accessor
//! defaults; the boolean switches are environment and file only, so an absent
//! CLI flag never masks them.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Runtime configuration for the appointment API.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APPOINTMENT_API")]
pub struct AppSettings {
    /// Address to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Include exception message, inner cause and stack trace in 500
    /// envelopes. Defaults to on in debug builds only.
    #[ortho_config(default = cfg!(debug_assertions), skip_cli)]
    pub expose_exception_details: bool,
    /// Let the demo endpoints fail at random to exercise failure envelopes.
    #[ortho_config(default = true, skip_cli)]
    pub simulate_failures: bool,
}

impl AppSettings {
    /// Host and port the server binds to.
    pub fn bind_addr(&self) -> (&str, u16) {
        (
            self.host.as_deref().unwrap_or(DEFAULT_HOST),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "APPOINTMENT_API_HOST",
        "APPOINTMENT_API_PORT",
        "APPOINTMENT_API_EXPOSE_EXCEPTION_DETAILS",
        "APPOINTMENT_API_SIMULATE_FAILURES",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("appointment-api")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), ("0.0.0.0", 8080));
        assert_eq!(settings.expose_exception_details, cfg!(debug_assertions));
        assert!(settings.simulate_failures);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("APPOINTMENT_API_HOST", Some("127.0.0.1".to_owned())),
            ("APPOINTMENT_API_PORT", Some("9090".to_owned())),
            (
                "APPOINTMENT_API_EXPOSE_EXCEPTION_DETAILS",
                Some("false".to_owned()),
            ),
            ("APPOINTMENT_API_SIMULATE_FAILURES", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), ("127.0.0.1", 9090));
        assert!(!settings.expose_exception_details);
        assert!(!settings.simulate_failures);
    }

    #[rstest]
    #[case("true", true)]
    #[case("false", false)]
    fn boolean_switches_follow_the_environment(#[case] raw: &str, #[case] expected: bool) {
        let _guard = lock_env([
            ("APPOINTMENT_API_HOST", None),
            ("APPOINTMENT_API_PORT", None),
            ("APPOINTMENT_API_EXPOSE_EXCEPTION_DETAILS", Some(raw.to_owned())),
            ("APPOINTMENT_API_SIMULATE_FAILURES", Some(raw.to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.expose_exception_details, expected);
        assert_eq!(settings.simulate_failures, expected);
    }

    #[rstest]
    fn boolean_switches_are_not_cli_flags() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let parsed = AppSettings::load_from_iter([
            OsString::from("appointment-api"),
            OsString::from("--simulate-failures"),
        ]);
        assert!(parsed.is_err());
    }
}
