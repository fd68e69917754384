/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Postgres URL. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    /// Run the job dispatcher inside the API process (default: `true`).
    pub embedded_worker: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | unset (in-memory store)    |
    /// | `EMBEDDED_WORKER`      | `true`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let embedded_worker = std::env::var("EMBEDDED_WORKER")
            .map(|v| parse_bool(&v).expect("EMBEDDED_WORKER must be true or false"))
            .unwrap_or(true);

        let config = Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            embedded_worker,
        };
        if let Err(msg) = config.validate() {
            panic!("{msg}");
        }
        config
    }

    /// Reject combinations that would leave requests unprocessed.
    ///
    /// Without an embedded worker, processing relies on a standalone worker
    /// reading the shared database, which the in-memory store cannot be.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.embedded_worker && self.database_url.is_none() {
            return Err("EMBEDDED_WORKER=false requires DATABASE_URL so a standalone worker can see requests");
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" ON "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("No"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    fn config(database_url: Option<&str>, embedded_worker: bool) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origins: vec![],
            request_timeout_secs: 30,
            database_url: database_url.map(str::to_string),
            embedded_worker,
        }
    }

    #[test]
    fn external_worker_without_database_is_rejected() {
        assert!(config(None, false).validate().is_err());
    }

    #[test]
    fn supported_worker_modes_validate() {
        assert!(config(None, true).validate().is_ok());
        assert!(config(Some("postgres://localhost/weather"), false).validate().is_ok());
        assert!(config(Some("postgres://localhost/weather"), true).validate().is_ok());
    }
}
