//! Runtime configuration for the BOX 1V1 server, read from the environment.

use crate::services::rating::DEFAULT_K_FACTOR;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Maximum rating swing per match. Always > 0.
    pub k_factor: u32,
    /// Public roster page; preview links redirect here.
    pub site_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: "0.0.0.0".into(),
            port: 3001,
            database_path: "box1v1.db".into(),
            k_factor: DEFAULT_K_FACTOR,
            site_url: "/box1v1/".into(),
        }
    }
}

fn parsed_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("Ignoring invalid {}={:?}, using default", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();

        let k_factor = match parsed_var("ELO_K_FACTOR", defaults.k_factor) {
            0 => {
                log::warn!("ELO_K_FACTOR must be positive, using {}", DEFAULT_K_FACTOR);
                DEFAULT_K_FACTOR
            }
            k => k,
        };

        Settings {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed_var("PORT", defaults.port),
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            k_factor,
            site_url: env::var("SITE_URL").unwrap_or(defaults.site_url),
        }
    }
}
