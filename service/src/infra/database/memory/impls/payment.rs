//! [`Payment`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{booking, payment, Payment},
    infra::{
        database::{
            self,
            memory::{Error, Storage, Table},
            Memory,
        },
        Database,
    },
};

impl<S: Storage> Database<Select<By<Option<Payment>, payment::Id>>>
    for Memory<S>
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| s.payments.get(&id).cloned())
    }
}

impl<S: Storage> Database<Select<By<Vec<Payment>, booking::Id>>>
    for Memory<S>
{
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut payments = self.read(|s| {
            s.payments
                .values()
                .filter(|p| p.booking_id == id)
                .cloned()
                .collect::<Vec<_>>()
        })?;
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }
}

impl<S: Storage> Database<Select<By<Vec<Payment>, payment::Status>>>
    for Memory<S>
{
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, payment::Status>>,
    ) -> Result<Self::Ok, Self::Err> {
        let status = by.into_inner();
        let mut payments = self.read(|s| {
            s.payments
                .values()
                .filter(|p| p.status == status)
                .cloned()
                .collect::<Vec<_>>()
        })?;
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }
}

impl<S: Storage> Database<Insert<Payment>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(payment)).await.map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Update<Payment>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(payment): Update<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(Table::Payments, move |s| {
            if !s.bookings.contains_key(&payment.booking_id) {
                return Err(Error::ForeignKeyViolation("payments_booking_id"));
            }
            _ = s.payments.insert(payment.id, payment.clone());
            Ok(())
        })
    }
}

impl<S: Storage> Database<Lock<By<Payment, payment::Id>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Payment, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}
