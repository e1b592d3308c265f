//! [`Command`] for deleting a [`User`].

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{activity, booking, car, user, Activity, Booking, Car, User},
    infra::{database, Database},
    read, Service,
};

use super::{record, Command, Initiator};

/// [`Command`] for deleting a [`User`] by an administrator.
///
/// The [`User`] is kept as deleted, while all the [`Booking`]s made by them
/// are removed along with their payments. [`Car`]s of the removed open
/// [`Booking`]s are released.
#[derive(Clone, Copy, Debug)]
pub struct DeleteUser {
    /// ID of the [`User`] to delete.
    pub user_id: user::Id,

    /// [`Initiator`] of this [`Command`].
    pub initiator: Initiator,
}

impl<Db> Command<DeleteUser> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<Activity>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<User, user::Id>>, Err = Traced<database::Error>>
        + Database<Update<User>, Err = Traced<database::Error>>
        + Database<
            Select<By<Vec<Booking>, read::booking::Filter>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<Car, car::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<Update<Car>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteUser { user_id, initiator } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<User>, _>::new(initiator.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|u| u.can(user::Capability::ManageUsers))
                .ok_or(E::NotPermitted(initiator.user_id))
                .map_err(tracerr::wrap!())?,
        );
        if user_id == initiator.user_id {
            return Err(tracerr::new!(E::SelfDeletion(user_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::<User, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let now = self.clock().now();
        let bookings = tx
            .execute(Select(By::<Vec<Booking>, _>::new(
                read::booking::Filter::Client(user_id),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        for booking in &bookings {
            if !booking.is_closed() {
                tx.execute(Lock(By::<Car, _>::new(booking.car_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                let car = tx
                    .execute(Select(By::<Option<Car>, _>::new(booking.car_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if let Some(mut car) = car {
                    if car.release(now.coerce()) {
                        tx.execute(Update(car))
                            .await
                            .map_err(tracerr::map_from_and_wrap!(=> E))
                            .map(drop)?;
                    }
                }
            }
            tx.execute(Delete(By::<Booking, _>::new(booking.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        user.deleted_at = Some(now.coerce());
        tx.execute(Update(user.clone()))
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
                activity::Action::UserDeleted,
                format!(
                    "Deleted {} `{}` with {} booking(s)",
                    user.role,
                    user.login,
                    bookings.len(),
                ),
                initiator.ip_address,
                now.coerce(),
            ),
        )
        .await;

        Ok(user)
    }
}

/// Error of [`DeleteUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Initiator`] is not permitted to manage users.
    #[display("`User(id: {_0})` is not permitted to manage users")]
    #[from(ignore)]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`Initiator`] tries to delete themselves.
    #[display("`User(id: {_0})` cannot delete themselves")]
    #[from(ignore)]
    SelfDeletion(#[error(not(source))] user::Id),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
