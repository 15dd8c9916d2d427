//! Server configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded first, if present). Missing or malformed
//! values fall back to defaults, with a warning in the log.
use std::{env, fmt::Display, io::Write, str::FromStr, time::Duration};

use cms_common::{parse_boolean_flag, parse_env_or_default, Secret};
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_CMS_HOST: &str = "127.0.0.1";
const DEFAULT_CMS_PORT: u16 = 8380;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/cat_match.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;
const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// Upper bound on every call into the store. Calls that take longer fail with a transient error.
    pub store_timeout: Duration,
    /// If true, pending database migrations are applied at startup.
    pub run_migrations: bool,
    pub auth: AuthConfig,
    /// If set, every new match request is POSTed to this URL as JSON.
    pub notify_webhook_url: Option<String>,
    /// The queue length of each event handler. Events that arrive while the queue is full are dropped.
    pub event_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CMS_HOST.to_string(),
            port: DEFAULT_CMS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            run_migrations: true,
            auth: AuthConfig::default(),
            notify_webhook_url: None,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CMS_HOST").ok().unwrap_or_else(|| DEFAULT_CMS_HOST.into());
        let port = env_or_default("CMS_PORT", DEFAULT_CMS_PORT);
        let database_url = env::var("CMS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ CMS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections = env_or_default("CMS_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let store_timeout = Duration::from_millis(env_or_default("CMS_STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS));
        let run_migrations = parse_boolean_flag(env::var("CMS_RUN_MIGRATIONS").ok(), true);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let notify_webhook_url = env::var("CMS_NOTIFY_WEBHOOK_URL").ok().filter(|s| !s.trim().is_empty());
        match &notify_webhook_url {
            Some(url) => info!("🪛️ New match requests will be posted to {url}"),
            None => info!("🪛️ CMS_NOTIFY_WEBHOOK_URL is not set. New match requests will only be logged."),
        }
        let event_buffer_size = env_or_default("CMS_EVENT_BUFFER_SIZE", DEFAULT_EVENT_BUFFER_SIZE);
        Self {
            host,
            port,
            database_url,
            max_connections,
            store_timeout,
            run_migrations,
            auth,
            notify_webhook_url,
            event_buffer_size,
        }
    }
}

fn env_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    let (value, err) = parse_env_or_default(env::var(name).ok(), default);
    if let Some(e) = err {
        error!("🪛️ Invalid configuration value for {name}. {e} Using the default, {default}, instead.");
    }
    value
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared secret used to sign and verify access tokens (HS256).
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this since every token will be invalidated when the server restarts. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect::<String>();
        match &mut tmpfile {
            Some((f, p)) => match writeln!(f, "{secret}") {
                Ok(()) => warn!(
                    "🚨️🚨️🚨️ The JWT secret for this session was written to {}. If this is a production instance, you \
                     are doing it wrong! Set the CMS_JWT_SECRET environment variable instead. 🚨️🚨️🚨️",
                    p.to_str().unwrap_or("???")
                ),
                Err(e) => warn!("🪛️ Could not write the JWT secret to the temporary file. {e}"),
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT secret.");
            },
        }
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self { jwt_secret: Secret::new(secret.into()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("CMS_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [CMS_JWT_SECRET]")))?;
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ServerError::ConfigurationError(format!(
                "CMS_JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters long"
            )));
        }
        Ok(Self::new(secret))
    }
}
