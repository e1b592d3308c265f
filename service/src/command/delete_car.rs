//! [`Command`] for deleting a [`Car`].

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{activity, car, user, Activity, Car, User},
    infra::{database, Database},
    read, Service,
};

use super::{record, Command, Initiator};

/// [`Command`] for deleting a [`Car`].
///
/// [`Car`]s referenced by any [`Booking`] cannot be deleted.
///
/// [`Booking`]: crate::domain::Booking
#[derive(Clone, Copy, Debug)]
pub struct DeleteCar {
    /// ID of the [`Car`] to delete.
    pub car_id: car::Id,

    /// [`Initiator`] of this [`Command`].
    pub initiator: Initiator,
}

impl<Db> Command<DeleteCar> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<Activity>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Car, car::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::car::HasBookings, car::Id>>,
            Ok = read::car::HasBookings,
            Err = Traced<database::Error>,
        > + Database<Delete<By<Car, car::Id>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Car;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteCar) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteCar { car_id, initiator } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<User>, _>::new(initiator.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|u| u.can(user::Capability::ManageFleet))
                .ok_or(E::NotPermitted(initiator.user_id))
                .map_err(tracerr::wrap!())?,
        );

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent bookings of the deleted `Car`.
        tx.execute(Lock(By::<Car, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let car = tx
            .execute(Select(By::<Option<Car>, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(car_id))
            .map_err(tracerr::wrap!())?;

        let has_bookings = tx
            .execute(Select(By::<read::car::HasBookings, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if *has_bookings {
            return Err(tracerr::new!(E::CarInUse(car_id)));
        }

        tx.execute(Delete(By::<Car, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        record(
            self.database(),
            Activity::new(
                Some(initiator.user_id),
                activity::Action::CarDeleted,
                format!("Removed {} {} ({})", car.brand, car.model, car.plate),
                initiator.ip_address,
                self.clock().now().coerce(),
            ),
        )
        .await;

        Ok(car)
    }
}

/// Error of [`DeleteCar`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Car`] is referenced by some bookings.
    #[display("`Car(id: {_0})` is referenced by bookings")]
    #[from(ignore)]
    CarInUse(#[error(not(source))] car::Id),

    /// [`Car`] doesn't exist.
    #[display("`Car(id: {_0})` does not exist")]
    #[from(ignore)]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Initiator`] is not permitted to manage the fleet.
    #[display("`User(id: {_0})` is not permitted to manage the fleet")]
    #[from(ignore)]
    NotPermitted(#[error(not(source))] user::Id),
}
