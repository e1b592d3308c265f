//! [`Command`] for creating a new [`Booking`].

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

/// [`Command`] for creating a new [`Booking`] on behalf of its client.
///
/// The booked [`Car`] is reserved in the same transaction.
#[derive(Clone, Copy, Debug)]
pub struct CreateBooking {
    /// ID of the [`Car`] to book.
    pub car_id: car::Id,

    /// First day of the rent.
    pub start_date: booking::StartDate,

    /// Last day of the rent.
    pub end_date: booking::EndDate,

    /// Number of cars to book.
    pub total_cars: booking::NumCars,

    /// [`Initiator`] of this [`Command`], being the client.
    pub initiator: Initiator,
}

impl<Db> Command<CreateBooking> for Service<Db>
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
        + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            car_id,
            start_date,
            end_date,
            total_cars,
            initiator,
        } = cmd;

        let client = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(initiator.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|u| u.can(user::Capability::Book))
            .ok_or(E::NotPermitted(initiator.user_id))
            .map_err(tracerr::wrap!())?;

        let now = self.clock().now();
        let period =
            booking::Period::new(start_date, end_date, self.clock().today())
                .map_err(tracerr::from_and_wrap!(=> E))?;

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
        car.reserve(now.coerce())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let quote =
            booking::Quote::calculate(car.daily_rate, &period, total_cars);
        let booking = Booking {
            id: booking::Id::new(),
            car_id,
            client_id: client.id,
            period,
            total_cars,
            total_amount: quote.total_amount,
            deposit_amount: quote.deposit_amount,
            discount_applied: quote.discount_applied,
            status: booking::Status::Pending,
            payment_code: booking::PaymentCode::generate(),
            deposit_paid_at: None,
            full_payment_paid_at: None,
            pickup: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        tx.execute(Update(car.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(booking.clone()))
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
                Some(client.id),
                activity::Action::BookingCreated,
                format!(
                    "{} booked {} {} ({}) x{} from {} to {}: total {}, \
                     deposit {}{}",
                    client.login,
                    car.brand,
                    car.model,
                    car.plate,
                    booking.total_cars,
                    booking.period.start(),
                    booking.period.end(),
                    booking.total_amount,
                    booking.deposit_amount,
                    if booking.discount_applied {
                        ", bulk discount applied"
                    } else {
                        ""
                    },
                ),
                initiator.ip_address,
                now.coerce(),
            ),
        )
        .await;

        Ok(booking)
    }
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Car`] doesn't exist.
    #[display("`Car(id: {_0})` does not exist")]
    #[from(ignore)]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Car`] is reserved already.
    #[display("{_0}")]
    CarUnavailable(car::Unavailable),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Requested [`booking::Period`] is invalid.
    #[display("Invalid booking period: {_0}")]
    InvalidPeriod(booking::PeriodError),

    /// [`Initiator`] is not permitted to book cars.
    #[display("`User(id: {_0})` is not permitted to book cars")]
    #[from(ignore)]
    NotPermitted(#[error(not(source))] user::Id),
}
