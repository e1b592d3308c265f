//! [`Car`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{car, Car},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `cars` table.
const COLUMNS: &str = "\
    id, brand, model, year, color, plate, \
    specifications, image_url, \
    daily_rate, daily_rate_currency, \
    is_available, created_at, updated_at";

/// Builds a [`Car`] out of the provided [`Row`] with all the [`COLUMNS`].
fn from_row(row: &Row) -> Car {
    Car {
        id: row.get("id"),
        brand: row.get("brand"),
        model: row.get("model"),
        year: row.get("year"),
        color: row.get("color"),
        plate: row.get("plate"),
        specifications: row.get("specifications"),
        image_url: row.get("image_url"),
        daily_rate: Money {
            amount: row.get("daily_rate"),
            currency: row.get("daily_rate_currency"),
        },
        is_available: row.get("is_available"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Car>, car::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Car>, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM cars \
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

impl<'p, C> Database<Select<By<Option<Car>, &'p car::Plate>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Car>, &'p car::Plate>>,
    ) -> Result<Self::Ok, Self::Err> {
        let plate = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM cars \
             WHERE plate = $1::VARCHAR"
        );
        Ok(self
            .query_opt(&sql, &[plate])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Car>, read::car::Filter>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Car>, read::car::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filtering = match by.into_inner() {
            read::car::Filter::All => "",
            read::car::Filter::Available => {
                "WHERE is_available \
                   AND brand <> '' \
                   AND model <> '' \
                   AND plate <> '' \
                   AND year > 0 \
                   AND daily_rate > 0"
            }
        };

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM cars \
             {filtering} \
             ORDER BY created_at DESC, id"
        );
        Ok(self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<read::car::HasBookings, car::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::car::HasBookings;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::car::HasBookings, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT EXISTS (\
                SELECT 1 \
                FROM bookings \
                WHERE car_id = $1::UUID\
            )";
        let row = self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(read::car::HasBookings(
            row.is_some_and(|r| r.get::<_, bool>(0)),
        ))
    }
}

impl<C> Database<Insert<Car>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Car>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(car): Insert<Car>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(car)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Car>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(car): Update<Car>,
    ) -> Result<Self::Ok, Self::Err> {
        let Car {
            id,
            brand,
            model,
            year,
            color,
            plate,
            specifications,
            image_url,
            daily_rate,
            is_available,
            created_at,
            updated_at,
        } = car;

        const SQL: &str = "\
            INSERT INTO cars (\
                id, brand, model, year, color, plate, \
                specifications, image_url, \
                daily_rate, daily_rate_currency, \
                is_available, created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, $4::INT2, \
                $5::VARCHAR, $6::VARCHAR, \
                $7::TEXT, $8::VARCHAR, \
                $9::NUMERIC, $10::INT2, \
                $11::BOOLEAN, $12::TIMESTAMPTZ, $13::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET brand = EXCLUDED.brand, \
                model = EXCLUDED.model, \
                year = EXCLUDED.year, \
                color = EXCLUDED.color, \
                plate = EXCLUDED.plate, \
                specifications = EXCLUDED.specifications, \
                image_url = EXCLUDED.image_url, \
                daily_rate = EXCLUDED.daily_rate, \
                daily_rate_currency = EXCLUDED.daily_rate_currency, \
                is_available = EXCLUDED.is_available, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &brand,
                &model,
                &year,
                &color,
                &plate,
                &specifications,
                &image_url,
                &daily_rate.amount,
                &daily_rate.currency,
                &is_available,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Car, car::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Car, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM cars \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Car, car::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Car, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: car::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM cars \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<'p, C> Database<Lock<By<Car, &'p car::Plate>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Car, &'p car::Plate>>,
    ) -> Result<Self::Ok, Self::Err> {
        let plate = by.into_inner();

        const SQL: &str = "\
            INSERT INTO cars_plates_lock \
            VALUES ($1::VARCHAR) \
            ON CONFLICT (plate) DO UPDATE \
            SET plate = EXCLUDED.plate";
        self.query(SQL, &[plate])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
