//! Dashboard read models: rollups over [`Car`]s, [`Booking`]s, [`Payment`]s
//! and [`User`]s.

use common::Money;

#[cfg(doc)]
use crate::domain::{booking, Booking, Car, Payment, User};

/// Fleet rollup shown to managers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Fleet {
    /// Number of [`Car`]s in the fleet.
    pub total_cars: i32,

    /// Number of [`Car`]s which can be booked.
    pub available_cars: i32,

    /// Number of [`booking::Status::Pending`] [`Booking`]s.
    pub pending_bookings: i32,

    /// Number of [`Payment`]s waiting for review.
    pub pending_payments: i32,
}

/// Platform rollup shown to admins.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Overview {
    /// Number of [`User`]s.
    pub total_users: i32,

    /// Number of managers.
    pub total_managers: i32,

    /// Number of clients.
    pub total_clients: i32,

    /// Number of [`Booking`]s.
    pub total_bookings: i32,

    /// Total amount of approved and fully paid [`Booking`]s, per currency.
    pub revenue: Vec<Money>,
}

/// Rollup of a single client's [`Booking`]s.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Client {
    /// Number of [`Booking`]s made.
    pub total_bookings: i32,

    /// Number of [`Booking`]s neither cancelled nor completed.
    pub active_bookings: i32,

    /// Number of [`booking::Status::Completed`] [`Booking`]s.
    pub completed_bookings: i32,

    /// Total amount of fully paid [`Booking`]s, per currency.
    pub total_spent: Vec<Money>,
}

/// Adds the provided [`Money`] to the per currency `totals`.
pub(crate) fn accumulate(totals: &mut Vec<Money>, money: Money) {
    if let Some(total) =
        totals.iter_mut().find(|m| m.currency == money.currency)
    {
        total.amount += money.amount;
    } else {
        totals.push(money);
    }
}
