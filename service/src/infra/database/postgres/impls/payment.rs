//! [`Payment`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, payment, Payment},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `payments` table.
const COLUMNS: &str = "\
    id, booking_id, amount, amount_currency, kind, \
    payment_code, status, paid_at, \
    approved_by, approved_at, created_at";

/// Builds a [`Payment`] out of the provided [`Row`] with all the
/// [`COLUMNS`].
fn from_row(row: &Row) -> Payment {
    Payment {
        id: row.get("id"),
        booking_id: row.get("booking_id"),
        amount: Money {
            amount: row.get("amount"),
            currency: row.get("amount_currency"),
        },
        kind: row.get("kind"),
        payment_code: row.get("payment_code"),
        status: row.get("status"),
        paid_at: row.get("paid_at"),
        approved_by: row.get("approved_by"),
        approved_at: row.get("approved_at"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Payment>, payment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM payments \
             WHERE id = $1::UUID"
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Payment>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let booking_id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM payments \
             WHERE booking_id = $1::UUID \
             ORDER BY created_at, id"
        );
        Ok(self
            .query(&sql, &[&booking_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Payment>, payment::Status>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, payment::Status>>,
    ) -> Result<Self::Ok, Self::Err> {
        let status = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM payments \
             WHERE status = $1::INT2 \
             ORDER BY created_at, id"
        );
        Ok(self
            .query(&sql, &[&status])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Payment>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(payment)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Payment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(payment): Update<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Payment {
            id,
            booking_id,
            amount,
            kind,
            payment_code,
            status,
            paid_at,
            approved_by,
            approved_at,
            created_at,
        } = payment;

        const SQL: &str = "\
            INSERT INTO payments (\
                id, booking_id, amount, amount_currency, kind, \
                payment_code, status, paid_at, \
                approved_by, approved_at, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::NUMERIC, $4::INT2, $5::INT2, \
                $6::VARCHAR, $7::INT2, $8::TIMESTAMPTZ, \
                $9::UUID, $10::TIMESTAMPTZ, $11::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status, \
                approved_by = EXCLUDED.approved_by, \
                approved_at = EXCLUDED.approved_at";
        self.exec(
            SQL,
            &[
                &id,
                &booking_id,
                &amount.amount,
                &amount.currency,
                &kind,
                &payment_code,
                &status,
                &paid_at,
                &approved_by,
                &approved_at,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Payment, payment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Payment, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: payment::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM payments \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
