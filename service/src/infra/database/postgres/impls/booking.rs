//! [`Booking`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `bookings` table.
const COLUMNS: &str = "\
    id, car_id, client_id, \
    start_date, end_date, total_cars, \
    total_amount, deposit_amount, amount_currency, \
    discount_applied, status, payment_code, \
    deposit_paid_at, full_payment_paid_at, \
    pickup_location, pickup_address, \
    created_at, updated_at";

/// Builds a [`Booking`] out of the provided [`Row`] with all the
/// [`COLUMNS`].
fn from_row(row: &Row) -> Booking {
    let currency = row.get("amount_currency");
    let location: Option<booking::PickupLocation> = row.get("pickup_location");
    let address: Option<booking::PickupAddress> = row.get("pickup_address");

    Booking {
        id: row.get("id"),
        car_id: row.get("car_id"),
        client_id: row.get("client_id"),
        #[allow(unsafe_code, reason = "`CHECK` constraint holds invariants")]
        period: unsafe {
            booking::Period::new_unchecked(
                row.get("start_date"),
                row.get("end_date"),
            )
        },
        total_cars: row.get("total_cars"),
        total_amount: Money {
            amount: row.get("total_amount"),
            currency,
        },
        deposit_amount: Money {
            amount: row.get("deposit_amount"),
            currency,
        },
        discount_applied: row.get("discount_applied"),
        status: row.get("status"),
        payment_code: row.get("payment_code"),
        deposit_paid_at: row.get("deposit_paid_at"),
        full_payment_paid_at: row.get("full_payment_paid_at"),
        pickup: location
            .zip(address)
            .map(|(location, address)| booking::Pickup { location, address }),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
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

impl<C> Database<Select<By<Vec<Booking>, read::booking::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, read::booking::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let rows = match by.into_inner() {
            read::booking::Filter::All => {
                let sql = format!(
                    "SELECT {COLUMNS} \
                     FROM bookings \
                     ORDER BY created_at DESC, id"
                );
                self.query(&sql, &[]).await
            }
            read::booking::Filter::Client(client_id) => {
                let sql = format!(
                    "SELECT {COLUMNS} \
                     FROM bookings \
                     WHERE client_id = $1::UUID \
                     ORDER BY created_at DESC, id"
                );
                self.query(&sql, &[&client_id]).await
            }
        }
        .map_err(tracerr::wrap!())?;

        Ok(rows.iter().map(from_row).collect())
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Booking>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(booking)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            car_id,
            client_id,
            period,
            total_cars,
            total_amount,
            deposit_amount,
            discount_applied,
            status,
            payment_code,
            deposit_paid_at,
            full_payment_paid_at,
            pickup,
            created_at,
            updated_at,
        } = booking;
        let (pickup_location, pickup_address) =
            pickup.map(|p| (p.location, p.address)).unzip();

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, car_id, client_id, \
                start_date, end_date, total_cars, \
                total_amount, deposit_amount, amount_currency, \
                discount_applied, status, payment_code, \
                deposit_paid_at, full_payment_paid_at, \
                pickup_location, pickup_address, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::DATE, $5::DATE, $6::INT2, \
                $7::NUMERIC, $8::NUMERIC, $9::INT2, \
                $10::BOOLEAN, $11::INT2, $12::VARCHAR, \
                $13::TIMESTAMPTZ, $14::TIMESTAMPTZ, \
                $15::VARCHAR, $16::VARCHAR, \
                $17::TIMESTAMPTZ, $18::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status, \
                deposit_paid_at = EXCLUDED.deposit_paid_at, \
                full_payment_paid_at = EXCLUDED.full_payment_paid_at, \
                pickup_location = EXCLUDED.pickup_location, \
                pickup_address = EXCLUDED.pickup_address, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &car_id,
                &client_id,
                &period.start(),
                &period.end(),
                &total_cars,
                &total_amount.amount,
                &deposit_amount.amount,
                &total_amount.currency,
                &discount_applied,
                &status,
                &payment_code,
                &deposit_paid_at,
                &full_payment_paid_at,
                &pickup_location,
                &pickup_address,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        // `payments` are removed by `ON DELETE CASCADE`.
        const SQL: &str = "\
            DELETE FROM bookings \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM bookings \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
