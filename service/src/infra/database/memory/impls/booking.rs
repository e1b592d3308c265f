//! [`Booking`]-related [`Database`] implementations.

use std::cmp::Reverse;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
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

impl<S: Storage> Database<Select<By<Option<Booking>, booking::Id>>>
    for Memory<S>
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| s.bookings.get(&id).cloned())
    }
}

impl<S: Storage> Database<Select<By<Vec<Booking>, read::booking::Filter>>>
    for Memory<S>
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, read::booking::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut bookings = self.read(|s| {
            s.bookings
                .values()
                .filter(|b| match filter {
                    read::booking::Filter::All => true,
                    read::booking::Filter::Client(id) => b.client_id == id,
                })
                .cloned()
                .collect::<Vec<_>>()
        })?;
        bookings.sort_by_key(|b| Reverse(b.created_at));
        Ok(bookings)
    }
}

impl<S: Storage> Database<Insert<Booking>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(booking)).await.map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Update<Booking>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(Table::Bookings, move |s| {
            if !s.cars.contains_key(&booking.car_id) {
                return Err(Error::ForeignKeyViolation("bookings_car_id"));
            }
            if !s.users.contains_key(&booking.client_id) {
                return Err(Error::ForeignKeyViolation("bookings_client_id"));
            }
            if s.bookings.values().any(|b| {
                b.payment_code == booking.payment_code && b.id != booking.id
            }) {
                return Err(Error::UniqueViolation("bookings_payment_code"));
            }
            _ = s.bookings.insert(booking.id, booking.clone());
            Ok(())
        })
    }
}

impl<S: Storage> Database<Delete<By<Booking, booking::Id>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.write(Table::Bookings, move |s| {
            s.payments.retain(|_, p| p.booking_id != id);
            _ = s.bookings.remove(&id);
            Ok(())
        })
    }
}

impl<S: Storage> Database<Lock<By<Booking, booking::Id>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}
