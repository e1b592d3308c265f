//! [`Query`] collection related to the multiple [`Booking`]s.

use common::operations::By;

use crate::{domain::Booking, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a list of [`Booking`]s, newest first.
pub type List = DatabaseQuery<By<Vec<Booking>, read::booking::Filter>>;
