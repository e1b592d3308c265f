//! [`Query`] collection related to the multiple [`Payment`]s.

use common::operations::By;

use crate::domain::{booking, payment, Payment};
#[cfg(doc)]
use crate::{domain::Booking, Query};

use super::DatabaseQuery;

/// Queries [`Payment`]s of a [`Booking`], oldest first.
pub type ByBooking = DatabaseQuery<By<Vec<Payment>, booking::Id>>;

/// Queries [`Payment`]s having the provided [`payment::Status`], oldest
/// first.
pub type ByStatus = DatabaseQuery<By<Vec<Payment>, payment::Status>>;
