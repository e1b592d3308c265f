//! [`Query`] collection of dashboard rollups.

use common::operations::By;

use crate::{domain::user, read};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries the fleet rollup.
pub type Fleet = DatabaseQuery<By<read::dashboard::Fleet, ()>>;

/// Queries the platform rollup.
pub type Overview = DatabaseQuery<By<read::dashboard::Overview, ()>>;

/// Queries the rollup of a client [`User`].
pub type Client = DatabaseQuery<By<read::dashboard::Client, user::Id>>;
