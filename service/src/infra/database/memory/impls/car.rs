//! [`Car`]-related [`Database`] implementations.

use std::cmp::Reverse;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{car, Car},
    infra::{
        database::{
            self,
            memory::{Error, Storage, Table},
            Memory,
        },
        Database,
    },
    read,
};

impl<S: Storage> Database<Select<By<Option<Car>, car::Id>>> for Memory<S> {
    type Ok = Option<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Car>, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| s.cars.get(&id).cloned())
    }
}

impl<'p, S: Storage> Database<Select<By<Option<Car>, &'p car::Plate>>>
    for Memory<S>
{
    type Ok = Option<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Car>, &'p car::Plate>>,
    ) -> Result<Self::Ok, Self::Err> {
        let plate = by.into_inner();
        self.read(|s| s.cars.values().find(|c| &c.plate == plate).cloned())
    }
}

impl<S: Storage> Database<Select<By<Vec<Car>, read::car::Filter>>>
    for Memory<S>
{
    type Ok = Vec<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Car>, read::car::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut cars = self.read(|s| {
            s.cars
                .values()
                .filter(|c| match filter {
                    read::car::Filter::All => true,
                    read::car::Filter::Available => c.is_listable(),
                })
                .cloned()
                .collect::<Vec<_>>()
        })?;
        cars.sort_by_key(|c| Reverse(c.created_at));
        Ok(cars)
    }
}

impl<S: Storage> Database<Select<By<read::car::HasBookings, car::Id>>>
    for Memory<S>
{
    type Ok = read::car::HasBookings;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::car::HasBookings, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| {
            read::car::HasBookings(s.bookings.values().any(|b| b.car_id == id))
        })
    }
}

impl<S: Storage> Database<Insert<Car>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(car): Insert<Car>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(car)).await.map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Update<Car>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(car): Update<Car>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(Table::Cars, move |s| {
            if s.cars.values().any(|c| c.plate == car.plate && c.id != car.id)
            {
                return Err(Error::UniqueViolation("cars_plate"));
            }
            _ = s.cars.insert(car.id, car.clone());
            Ok(())
        })
    }
}

impl<S: Storage> Database<Delete<By<Car, car::Id>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Car, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.write(Table::Cars, move |s| {
            if s.bookings.values().any(|b| b.car_id == id) {
                return Err(Error::ForeignKeyViolation("bookings_car_id"));
            }
            _ = s.cars.remove(&id);
            Ok(())
        })
    }
}

impl<S: Storage> Database<Lock<By<Car, car::Id>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Car, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<'p, S: Storage> Database<Lock<By<Car, &'p car::Plate>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Car, &'p car::Plate>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}
