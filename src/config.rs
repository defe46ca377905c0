use std::env;
use std::path::PathBuf;

use crate::services::auth::Credentials;

// sha256 of the original deployment's admin password; override both halves
// of the pair via env in any real deployment.
const DEFAULT_ADMIN_USERNAME: &str = "travel.leafwaysoln";
const DEFAULT_ADMIN_PASSWORD_SHA256: &str =
    "5416bcc58982f8325a3aa6d2e94c1afce4032e27a1ad7426dc18c3882e72b7b6";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub receipt_prefix: String,
    pub default_currency: String,
    pub admin_username: String,
    pub admin_password_sha256: String,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            bind_addr: env_str("LEAFWAY_BIND_ADDR", "127.0.0.1:8080"),
            database_path: PathBuf::from(env_str("LEAFWAY_DB_PATH", "leafway.sqlite")),
            receipt_prefix: env_str("LEAFWAY_RECEIPT_PREFIX", "LW"),
            default_currency: env_str("LEAFWAY_DEFAULT_CURRENCY", "INR"),
            admin_username: env_str("LEAFWAY_ADMIN_USERNAME", DEFAULT_ADMIN_USERNAME),
            admin_password_sha256: env_str(
                "LEAFWAY_ADMIN_PASSWORD_SHA256",
                DEFAULT_ADMIN_PASSWORD_SHA256,
            ),
            secure_cookies: env_bool("LEAFWAY_SECURE_COOKIES", false),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.admin_username.clone(),
            password_sha256: self.admin_password_sha256.clone(),
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            bind_addr: "127.0.0.1:0".to_string(),
            database_path: PathBuf::from(":memory:"),
            receipt_prefix: "LW".to_string(),
            default_currency: "INR".to_string(),
            admin_username: "admin".to_string(),
            admin_password_sha256: crate::utils::sha256_hex("hunter2"),
            secure_cookies: false,
        }
    }
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
