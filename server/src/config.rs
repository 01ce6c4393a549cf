//! Runtime configuration read from the environment.

use anyhow::{Context, Result};
use envconfig::Envconfig;

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    #[envconfig(from = "BILLING_DATABASE_URL", default = "sqlite:tuition_billing.db")]
    pub database_url: String,

    #[envconfig(from = "BILLING_HOST", default = "127.0.0.1")]
    pub host: String,

    #[envconfig(from = "BILLING_PORT", default = "3000")]
    pub port: u16,

    /// Origin allowed by CORS, usually the admin frontend
    #[envconfig(from = "BILLING_CORS_ORIGIN", default = "http://localhost:8080")]
    pub cors_origin: String,

    /// Insert the default impuestos and monedas on startup if missing
    #[envconfig(from = "BILLING_SEED_CATALOGS", default = "true")]
    pub seed_catalogs: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::init_from_env().context("invalid billing configuration")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::init_from_hashmap(&HashMap::new()).unwrap();
        assert_eq!(config.database_url, "sqlite:tuition_billing.db");
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert!(config.seed_catalogs);
    }

    #[test]
    fn test_overrides_and_bad_port() {
        let mut vars = HashMap::new();
        vars.insert("BILLING_PORT".to_string(), "8081".to_string());
        vars.insert("BILLING_SEED_CATALOGS".to_string(), "false".to_string());
        let config = Config::init_from_hashmap(&vars).unwrap();
        assert_eq!(config.port, 8081);
        assert!(!config.seed_catalogs);

        vars.insert("BILLING_PORT".to_string(), "not-a-port".to_string());
        assert!(Config::init_from_hashmap(&vars).is_err());
    }
}
