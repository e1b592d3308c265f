//! [`Booking`] read model definitions.

use crate::domain::user;
#[cfg(doc)]
use crate::domain::{Booking, User};

/// Selector of [`Booking`] lists, newest first.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Filter {
    /// Every [`Booking`].
    All,

    /// [`Booking`]s made by the client [`User`] with the provided ID.
    Client(user::Id),
}
