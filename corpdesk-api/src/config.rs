/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `CASCADE_ADD_POLICY`: `delete` or `restrict` (default: delete)
/// - `RUN_MIGRATIONS`: Apply pending migrations at startup (default: true)
/// - `RUST_LOG`: Log filter (default: debug for corpdesk crates)
///
/// # Example
///
/// ```no_run
/// use corpdesk_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use corpdesk_shared::cascade::{AddDeletePolicy, CascadeConfig};
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Cascade rule configuration
    pub cascade: CascadeConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Apply pending migrations at startup
    pub run_migrations: bool,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is read first, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` is missing
    /// - A variable has an invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("Invalid API_PORT: {}", e))?;

        let cors_origins = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins = parse_origins(&cors_origins);
        let production = parse_bool("PRODUCTION", env::var("PRODUCTION").ok(), false)?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("Invalid DATABASE_MAX_CONNECTIONS: {}", e))?;

        let run_migrations = parse_bool("RUN_MIGRATIONS", env::var("RUN_MIGRATIONS").ok(), true)?;

        let add_policy = match env::var("CASCADE_ADD_POLICY") {
            Ok(value) => AddDeletePolicy::parse(&value).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid CASCADE_ADD_POLICY '{}': expected 'delete' or 'restrict'",
                    value
                )
            })?,
            Err(_) => AddDeletePolicy::default(),
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                run_migrations,
            },
            cascade: CascadeConfig { add_policy },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();

    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}

fn parse_bool(name: &str, value: Option<String>, default: bool) -> anyhow::Result<bool> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("Invalid {}: '{}' is not a boolean", name, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
                run_migrations: true,
            },
            cascade: CascadeConfig::default(),
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("https://a.example, https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(parse_origins(" , "), vec!["*"]);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", Some("TRUE".to_string()), false).unwrap());
        assert!(!parse_bool("X", Some("0".to_string()), true).unwrap());
        assert!(parse_bool("X", None, true).unwrap());
        assert!(parse_bool("X", Some("maybe".to_string()), false).is_err());
    }
}
