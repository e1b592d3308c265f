//! Dashboard [`Database`] implementations.

use common::{
    operations::{By, Select},
    Money,
};
use tracerr::Traced;

use crate::{
    domain::{booking, payment, user},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::{self, dashboard::accumulate},
};

impl<C> Database<Select<By<read::dashboard::Fleet, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::dashboard::Fleet;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::dashboard::Fleet, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT (SELECT COUNT(*)::INT4 FROM cars) AS total_cars, \
                   (SELECT COUNT(*)::INT4 \
                    FROM cars \
                    WHERE is_available) AS available_cars, \
                   (SELECT COUNT(*)::INT4 \
                    FROM bookings \
                    WHERE status = $1::INT2) AS pending_bookings, \
                   (SELECT COUNT(*)::INT4 \
                    FROM payments \
                    WHERE status = $2::INT2) AS pending_payments";
        let row = self
            .query_opt(
                SQL,
                &[&booking::Status::Pending, &payment::Status::Pending],
            )
            .await
            .map_err(tracerr::wrap!())?;

        Ok(row.map_or_else(read::dashboard::Fleet::default, |row| {
            read::dashboard::Fleet {
                total_cars: row.get("total_cars"),
                available_cars: row.get("available_cars"),
                pending_bookings: row.get("pending_bookings"),
                pending_payments: row.get("pending_payments"),
            }
        }))
    }
}

impl<C> Database<Select<By<read::dashboard::Overview, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::dashboard::Overview;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::dashboard::Overview, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const COUNTS_SQL: &str = "\
            SELECT COUNT(*)::INT4 AS total_users, \
                   (COUNT(*) FILTER (WHERE role = $1::INT2))::INT4 \
                       AS total_managers, \
                   (COUNT(*) FILTER (WHERE role = $2::INT2))::INT4 \
                       AS total_clients, \
                   (SELECT COUNT(*)::INT4 FROM bookings) AS total_bookings \
            FROM users \
            WHERE deleted_at IS NULL";
        let mut overview = self
            .query_opt(
                COUNTS_SQL,
                &[&user::Role::Manager, &user::Role::Client],
            )
            .await
            .map_err(tracerr::wrap!())?
            .map_or_else(read::dashboard::Overview::default, |row| {
                read::dashboard::Overview {
                    total_users: row.get("total_users"),
                    total_managers: row.get("total_managers"),
                    total_clients: row.get("total_clients"),
                    total_bookings: row.get("total_bookings"),
                    revenue: vec![],
                }
            });

        const REVENUE_SQL: &str = "\
            SELECT SUM(total_amount) AS amount, amount_currency \
            FROM bookings \
            WHERE full_payment_paid_at IS NOT NULL \
              AND status IN ($1::INT2, $2::INT2) \
            GROUP BY amount_currency";
        for row in self
            .query(
                REVENUE_SQL,
                &[&booking::Status::Approved, &booking::Status::Completed],
            )
            .await
            .map_err(tracerr::wrap!())?
        {
            accumulate(
                &mut overview.revenue,
                Money {
                    amount: row.get("amount"),
                    currency: row.get("amount_currency"),
                },
            );
        }

        Ok(overview)
    }
}

impl<C> Database<Select<By<read::dashboard::Client, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::dashboard::Client;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::dashboard::Client, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let client_id = by.into_inner();

        const COUNTS_SQL: &str = "\
            SELECT COUNT(*)::INT4 AS total_bookings, \
                   (COUNT(*) FILTER (\
                       WHERE status IN ($2::INT2, $3::INT2)\
                   ))::INT4 AS active_bookings, \
                   (COUNT(*) FILTER (WHERE status = $4::INT2))::INT4 \
                       AS completed_bookings \
            FROM bookings \
            WHERE client_id = $1::UUID";
        let mut dashboard = self
            .query_opt(
                COUNTS_SQL,
                &[
                    &client_id,
                    &booking::Status::Pending,
                    &booking::Status::Approved,
                    &booking::Status::Completed,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .map_or_else(read::dashboard::Client::default, |row| {
                read::dashboard::Client {
                    total_bookings: row.get("total_bookings"),
                    active_bookings: row.get("active_bookings"),
                    completed_bookings: row.get("completed_bookings"),
                    total_spent: vec![],
                }
            });

        const SPENT_SQL: &str = "\
            SELECT SUM(total_amount) AS amount, amount_currency \
            FROM bookings \
            WHERE client_id = $1::UUID \
              AND full_payment_paid_at IS NOT NULL \
              AND status <> $2::INT2 \
            GROUP BY amount_currency";
        for row in self
            .query(SPENT_SQL, &[&client_id, &booking::Status::Rejected])
            .await
            .map_err(tracerr::wrap!())?
        {
            accumulate(
                &mut dashboard.total_spent,
                Money {
                    amount: row.get("amount"),
                    currency: row.get("amount_currency"),
                },
            );
        }

        Ok(dashboard)
    }
}
