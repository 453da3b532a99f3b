//! Database connection settings.
//!
//! Read from the process environment:
//!
//! | variable       | default      |
//! |----------------|--------------|
//! | `DB_HOST`      | `localhost`  |
//! | `DB_PORT`      | `5432`       |
//! | `DB_NAME`      | `music_room` |
//! | `DB_USER`      | `postgres`   |
//! | `DB_PASSWORD`  | `admin`      |
//! | `DATABASE_URL` | unset        |
//!
//! `DATABASE_URL` overrides the individual settings. A `sqlite:` URL selects
//! the `SQLite` store; anything else is handed to the Postgres driver.

use std::fmt;
use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;

use crate::{Error, Result};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_NAME: &str = "music_room";
const DEFAULT_USER: &str = "postgres";
const DEFAULT_PASSWORD: &str = "admin";

/// Where scan records are stored.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database name.
    pub name: String,
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
    /// Full connection URL; takes precedence over the fields above.
    pub url: Option<String>,
}

/// Resolved connection target.
#[derive(Debug, Clone)]
pub enum DbTarget {
    /// Postgres server.
    Postgres(PgConnectOptions),
    /// `SQLite` database URL (`sqlite:path` or `sqlite::memory:`).
    Sqlite(String),
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            name: DEFAULT_NAME.to_string(),
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            url: None,
        }
    }
}

impl DbConfig {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `DB_PORT` is not a valid port number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `DB_PORT` is not a valid port number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("DB_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| Error::Config(format!("DB_PORT is not a port number: {port}")))?,
            None => defaults.port,
        };

        Ok(Self {
            host: get("DB_HOST").unwrap_or(defaults.host),
            port,
            name: get("DB_NAME").unwrap_or(defaults.name),
            user: get("DB_USER").unwrap_or(defaults.user),
            password: get("DB_PASSWORD").unwrap_or(defaults.password),
            url: get("DATABASE_URL"),
        })
    }

    /// Replaces the connection URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Resolves the connection target.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is set but is not a valid Postgres URL.
    pub fn target(&self) -> Result<DbTarget> {
        match &self.url {
            Some(url) if url.starts_with("sqlite:") => Ok(DbTarget::Sqlite(url.clone())),
            Some(url) => Ok(DbTarget::Postgres(PgConnectOptions::from_str(url)?)),
            None => Ok(DbTarget::Postgres(
                PgConnectOptions::new()
                    .host(&self.host)
                    .port(self.port)
                    .database(&self.name)
                    .username(&self.user)
                    .password(&self.password),
            )),
        }
    }
}

/// Never prints the password.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("url", &self.url.as_ref().map(|_| "<set>"))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) if url.starts_with("sqlite:") => f.write_str(url),
            Some(_) => f.write_str("DATABASE_URL"),
            None => write!(
                f,
                "postgres://{}@{}:{}/{}",
                self.user, self.host, self.port, self.name
            ),
        }
    }
}
