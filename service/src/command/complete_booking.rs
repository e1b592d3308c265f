//! [`Command`] for completing a [`Booking`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{activity, booking, car, user, Activity, Booking, Car, User},
    infra::{database, Database},
    Service,
};

use super::{record, Command, Initiator};

/// [`Command`] for completing a fulfilled [`Booking`], releasing its [`Car`].
///
/// Completing a completed [`Booking`] is a no-op.
#[derive(Clone, Copy, Debug)]
pub struct CompleteBooking {
    /// ID of the [`Booking`] to complete.
    pub booking_id: booking::Id,

    /// [`Initiator`] of this [`Command`].
    pub initiator: Initiator,
}

impl<Db> Command<CompleteBooking> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<Activity>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<Car, car::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Update<Car>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CompleteBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteBooking {
            booking_id,
            initiator,
        } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<User>, _>::new(initiator.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|u| u.can(user::Capability::ManageBookings))
                .ok_or(E::NotPermitted(initiator.user_id))
                .map_err(tracerr::wrap!())?,
        );

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent payment reviews of the same `Booking`.
        tx.execute(Lock(By::<Booking, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        let now = self.clock().now();
        let changed = booking
            .apply(booking::Transition::Completed, now.coerce())
            .map_err(tracerr::from_and_wrap!(=> E))?;
        if !changed {
            return Ok(booking);
        }

        tx.execute(Lock(By::<Car, _>::new(booking.car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut car = tx
            .execute(Select(By::<Option<Car>, _>::new(booking.car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(booking.car_id))
            .map_err(tracerr::wrap!())?;
        if car.release(now.coerce()) {
            tx.execute(Update(car))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Update(booking.clone()))
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
                activity::Action::BookingCompleted,
                format!(
                    "Completed booking {} of client {}",
                    booking.payment_code, booking.client_id,
                ),
                initiator.ip_address,
                now.coerce(),
            ),
        )
        .await;

        Ok(booking)
    }
}

/// Error of [`CompleteBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] doesn't exist.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Car`] of the [`Booking`] doesn't exist.
    #[display("`Car(id: {_0})` does not exist")]
    #[from(ignore)]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Initiator`] is not permitted to manage bookings.
    #[display("`User(id: {_0})` is not permitted to manage bookings")]
    #[from(ignore)]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`Booking`] cannot be completed.
    #[display("Cannot complete `Booking`: {_0}")]
    Transition(booking::TransitionError),
}
