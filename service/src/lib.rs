//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use std::{sync::Arc, time::Duration};

use common::{clock, Clock};
use derive_more::Debug;

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query};
use self::domain::booking;

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [`Duration`] after which a [`Session`] expires.
    ///
    /// [`Session`]: domain::user::Session
    pub session_expiration: Duration,

    /// [`booking::Pickup`] assigned to fully paid [`Booking`]s.
    ///
    /// [`Booking`]: domain::Booking
    pub pickup: booking::Pickup,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Clock`] providing the current time to this [`Service`].
    clock: Arc<dyn Clock>,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters, running on the
    /// [`clock::System`].
    #[must_use]
    pub fn new(config: Config, database: Db) -> Self {
        Self::with_clock(config, database, clock::System)
    }

    /// Creates a new [`Service`] with the provided parameters, running on the
    /// provided [`Clock`].
    #[must_use]
    pub fn with_clock(
        config: Config,
        database: Db,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            config,
            database,
            clock: Arc::new(clock),
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Clock`] of this [`Service`].
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }
}
