//! Dashboard rollups definitions.

use common::Money;
use juniper::GraphQLObject;
use service::read;

/// Rollup of the fleet state.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "FleetDashboard")]
pub struct Fleet {
    /// Number of `Car`s in the fleet.
    pub total_cars: i32,

    /// Number of `Car`s which can be booked.
    pub available_cars: i32,

    /// Number of `Booking`s waiting for the full payment.
    pub pending_bookings: i32,

    /// Number of `Payment`s waiting for a review.
    pub pending_payments: i32,
}

impl From<read::dashboard::Fleet> for Fleet {
    fn from(fleet: read::dashboard::Fleet) -> Self {
        let read::dashboard::Fleet {
            total_cars,
            available_cars,
            pending_bookings,
            pending_payments,
        } = fleet;
        Self {
            total_cars,
            available_cars,
            pending_bookings,
            pending_payments,
        }
    }
}

/// Rollup of the whole portal.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "OverviewDashboard")]
pub struct Overview {
    /// Number of `User`s.
    pub total_users: i32,

    /// Number of managers.
    pub total_managers: i32,

    /// Number of clients.
    pub total_clients: i32,

    /// Number of `Booking`s.
    pub total_bookings: i32,

    /// Amount paid for approved and completed `Booking`s, per currency.
    pub revenue: Vec<Money>,
}

impl From<read::dashboard::Overview> for Overview {
    fn from(overview: read::dashboard::Overview) -> Self {
        let read::dashboard::Overview {
            total_users,
            total_managers,
            total_clients,
            total_bookings,
            revenue,
        } = overview;
        Self {
            total_users,
            total_managers,
            total_clients,
            total_bookings,
            revenue,
        }
    }
}

/// Rollup of the current client `Booking`s.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "ClientDashboard")]
pub struct Client {
    /// Number of `Booking`s made.
    pub total_bookings: i32,

    /// Number of `Booking`s neither cancelled nor completed.
    pub active_bookings: i32,

    /// Number of completed `Booking`s.
    pub completed_bookings: i32,

    /// Amount paid for fully paid `Booking`s, per currency.
    pub total_spent: Vec<Money>,
}

impl From<read::dashboard::Client> for Client {
    fn from(client: read::dashboard::Client) -> Self {
        let read::dashboard::Client {
            total_bookings,
            active_bookings,
            completed_bookings,
            total_spent,
        } = client;
        Self {
            total_bookings,
            active_bookings,
            completed_bookings,
            total_spent,
        }
    }
}
