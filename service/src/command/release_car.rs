//! [`Command`] for releasing a [`Car`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{activity, car, user, Activity, Car, User},
    infra::{database, Database},
    Service,
};

use super::{record, Command, Initiator};

/// [`Command`] for releasing a [`Car`], so it can be booked again.
///
/// Releasing an available [`Car`] is a no-op.
#[derive(Clone, Copy, Debug)]
pub struct ReleaseCar {
    /// ID of the [`Car`] to release.
    pub car_id: car::Id,

    /// [`Initiator`] of this [`Command`].
    pub initiator: Initiator,
}

impl<Db> Command<ReleaseCar> for Service<Db>
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
        > + Database<Update<Car>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Car;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ReleaseCar) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReleaseCar { car_id, initiator } = cmd;

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

        // Avoid concurrent bookings of the same `Car`.
        tx.execute(Lock(By::<Car, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut car = tx
            .execute(Select(By::<Option<Car>, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(car_id))
            .map_err(tracerr::wrap!())?;

        let now = self.clock().now();
        if !car.release(now.coerce()) {
            return Ok(car);
        }

        tx.execute(Update(car.clone()))
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
                activity::Action::CarReleased,
                format!("Released {} {} ({})", car.brand, car.model, car.plate),
                initiator.ip_address,
                now.coerce(),
            ),
        )
        .await;

        Ok(car)
    }
}

/// Error of [`ReleaseCar`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
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
