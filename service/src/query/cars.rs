//! [`Query`] collection related to the multiple [`Car`]s.

use common::operations::By;

use crate::{domain::Car, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a list of [`Car`]s, newest first.
pub type List = DatabaseQuery<By<Vec<Car>, read::car::Filter>>;
