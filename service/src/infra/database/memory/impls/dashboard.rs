//! Dashboard [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{booking, payment, user},
    infra::{
        database::{self, memory::Storage, Memory},
        Database,
    },
    read::{self, dashboard::accumulate},
};

/// Converts the provided count into a dashboard counter.
fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl<S: Storage> Database<Select<By<read::dashboard::Fleet, ()>>>
    for Memory<S>
{
    type Ok = read::dashboard::Fleet;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::dashboard::Fleet, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.read(|s| read::dashboard::Fleet {
            total_cars: count(s.cars.len()),
            available_cars: count(
                s.cars.values().filter(|c| c.is_available).count(),
            ),
            pending_bookings: count(
                s.bookings
                    .values()
                    .filter(|b| b.status == booking::Status::Pending)
                    .count(),
            ),
            pending_payments: count(
                s.payments
                    .values()
                    .filter(|p| p.status == payment::Status::Pending)
                    .count(),
            ),
        })
    }
}

impl<S: Storage> Database<Select<By<read::dashboard::Overview, ()>>>
    for Memory<S>
{
    type Ok = read::dashboard::Overview;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::dashboard::Overview, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.read(|s| {
            let users = s
                .users
                .values()
                .filter(|u| u.deleted_at.is_none())
                .collect::<Vec<_>>();
            let with_role = |role: user::Role| {
                count(users.iter().filter(|u| u.role == role).count())
            };

            let mut revenue = vec![];
            for b in s.bookings.values().filter(|b| {
                b.full_payment_paid()
                    && matches!(
                        b.status,
                        booking::Status::Approved | booking::Status::Completed,
                    )
            }) {
                accumulate(&mut revenue, b.total_amount);
            }

            read::dashboard::Overview {
                total_users: count(users.len()),
                total_managers: with_role(user::Role::Manager),
                total_clients: with_role(user::Role::Client),
                total_bookings: count(s.bookings.len()),
                revenue,
            }
        })
    }
}

impl<S: Storage> Database<Select<By<read::dashboard::Client, user::Id>>>
    for Memory<S>
{
    type Ok = read::dashboard::Client;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::dashboard::Client, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let client_id = by.into_inner();
        self.read(|s| {
            let mut dashboard = read::dashboard::Client::default();
            for b in s.bookings.values().filter(|b| b.client_id == client_id)
            {
                dashboard.total_bookings += 1;
                match b.status {
                    booking::Status::Pending | booking::Status::Approved => {
                        dashboard.active_bookings += 1;
                    }
                    booking::Status::Completed => {
                        dashboard.completed_bookings += 1;
                    }
                    booking::Status::Rejected => {}
                }
                if b.full_payment_paid()
                    && b.status != booking::Status::Rejected
                {
                    accumulate(&mut dashboard.total_spent, b.total_amount);
                }
            }
            dashboard
        })
    }
}
