//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use service::domain::booking;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: Server,

    /// Database configuration.
    #[serde(default)]
    pub database: Postgres,

    /// [JWT] configuration.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[serde(default)]
    pub jwt: Jwt,

    /// Booking configuration.
    #[serde(default)]
    pub booking: Booking,

    /// Administrator to seed on startup, if any.
    #[serde(default)]
    pub admin: Option<Admin>,

    /// Log configuration.
    #[serde(default)]
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("CONF")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// [JWT] configuration.
///
/// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Jwt {
    /// Secret signing the issued tokens.
    #[default("secret".to_owned())]
    pub secret: String,

    /// Lifetime of an issued session.
    #[default(time::Duration::from_secs(60 * 60 * 24))]
    #[serde(with = "humantime_serde")]
    pub session_expiration: time::Duration,
}

impl Jwt {
    /// Builds the [`service::Config`] out of this [`Jwt`] configuration and
    /// the provided [`booking::Pickup`].
    #[must_use]
    pub fn into_service_config(
        self,
        pickup: booking::Pickup,
    ) -> service::Config {
        let Self {
            secret,
            session_expiration,
        } = self;
        service::Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                secret.as_bytes(),
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                secret.as_bytes(),
            ),
            session_expiration,
            pickup,
        }
    }
}

/// Booking configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Booking {
    /// Name of the location where booked cars are handed over.
    #[default("Kimihurura".to_owned())]
    pub pickup_location: String,

    /// Address of the location where booked cars are handed over.
    #[default("Kigali Cars, 14 KG 690 St, Kigali".to_owned())]
    pub pickup_address: String,
}

impl Booking {
    /// Returns the [`booking::Pickup`] described by this [`Booking`]
    /// configuration.
    ///
    /// # Errors
    ///
    /// If the location or the address is invalid.
    pub fn pickup(&self) -> Result<booking::Pickup, ConfigError> {
        let location = booking::PickupLocation::new(&*self.pickup_location)
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "invalid `booking.pickup_location`: `{}`",
                    self.pickup_location,
                ))
            })?;
        let address = booking::PickupAddress::new(&*self.pickup_address)
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "invalid `booking.pickup_address`: `{}`",
                    self.pickup_address,
                ))
            })?;
        Ok(booking::Pickup { location, address })
    }
}

/// Administrator account created on startup unless its login is taken.
#[derive(Clone, Debug, Deserialize)]
pub struct Admin {
    /// Name of the administrator.
    pub name: String,

    /// Login of the administrator.
    pub login: String,

    /// Password of the administrator.
    pub password: String,

    /// Email of the administrator.
    pub email: String,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{Booking, Config};

    #[test]
    fn defaults_when_no_file() {
        let config = Config::new("no-such-config-file").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.dbname, "postgres");
        assert_eq!(
            config.jwt.session_expiration,
            Duration::from_secs(60 * 60 * 24),
        );
        assert!(config.admin.is_none());

        let pickup = config.booking.pickup().unwrap();
        assert_eq!(pickup.location.to_string(), "Kimihurura");
        assert_eq!(
            pickup.address.to_string(),
            "Kigali Cars, 14 KG 690 St, Kigali",
        );
    }

    #[test]
    fn rejects_blank_pickup() {
        let booking = Booking {
            pickup_location: " ".to_owned(),
            ..Booking::default()
        };

        assert!(booking.pickup().is_err());
    }
}
