//! [`Car`] read model definitions.

use derive_more::Deref;

#[cfg(doc)]
use crate::domain::{Booking, Car};

/// Indicator whether any [`Booking`] references a [`Car`].
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct HasBookings(pub bool);

/// Selector of [`Car`] lists, newest first.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Filter {
    /// Every [`Car`] of the fleet.
    All,

    /// [`Car`]s which can be booked right now.
    ///
    /// [`Car`]s with any required field blank are excluded.
    Available,
}
