//! [`Command`] for creating a new [`Car`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{activity, car, user, Activity, Car, User},
    infra::{database, Database},
    Service,
};

use super::{record, Command, Initiator};

/// [`Command`] for creating a new [`Car`].
#[derive(Clone, Debug)]
pub struct CreateCar {
    /// [`car::Brand`] of a new [`Car`].
    pub brand: car::Brand,

    /// [`car::Model`] of a new [`Car`].
    pub model: car::Model,

    /// [`car::Year`] of a new [`Car`].
    pub year: car::Year,

    /// [`car::Color`] of a new [`Car`].
    pub color: Option<car::Color>,

    /// [`car::Plate`] of a new [`Car`].
    pub plate: car::Plate,

    /// [`car::Specifications`] of a new [`Car`].
    pub specifications: Option<car::Specifications>,

    /// [`car::ImageUrl`] of a new [`Car`].
    pub image_url: Option<car::ImageUrl>,

    /// Daily rate of a new [`Car`].
    pub daily_rate: Money,

    /// [`Initiator`] of this [`Command`].
    pub initiator: Initiator,
}

impl<Db> Command<CreateCar> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<Activity>, Err = Traced<database::Error>>,
    Transacted<Db>: for<'p> Database<
            Lock<By<Car, &'p car::Plate>>,
            Err = Traced<database::Error>,
        > + for<'p> Database<
            Select<By<Option<Car>, &'p car::Plate>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<Insert<Car>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Car;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateCar) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateCar {
            brand,
            model,
            year,
            color,
            plate,
            specifications,
            image_url,
            daily_rate,
            initiator,
        } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<User>, _>::new(initiator.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|u| u.can(user::Capability::ManageFleet))
                .ok_or(E::NotPermitted(initiator.user_id))
                .map_err(tracerr::wrap!())?,
        );

        if daily_rate.is_negative() {
            return Err(tracerr::new!(E::NegativeDailyRate(daily_rate)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent `Car` creation with the same `car::Plate`.
        tx.execute(Lock(By::<Car, _>::new(&plate)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let existing = tx
            .execute(Select(By::<Option<Car>, _>::new(&plate)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::PlateOccupied(plate)));
        }

        let now = self.clock().now();
        let car = Car {
            id: car::Id::new(),
            brand,
            model,
            year,
            color,
            plate,
            specifications,
            image_url,
            daily_rate,
            is_available: true,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        tx.execute(Insert(car.clone()))
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
                activity::Action::CarCreated,
                format!(
                    "Added {} {} ({}) at {} per day",
                    car.brand, car.model, car.plate, car.daily_rate,
                ),
                initiator.ip_address,
                now.coerce(),
            ),
        )
        .await;

        Ok(car)
    }
}

/// Error of [`CreateCar`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Daily rate is negative.
    #[display("Daily rate cannot be negative: {_0}")]
    NegativeDailyRate(#[error(not(source))] Money),

    /// [`Initiator`] is not permitted to manage the fleet.
    #[display("`User(id: {_0})` is not permitted to manage the fleet")]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`car::Plate`] is already registered.
    #[display("`{_0}` plate is registered already")]
    PlateOccupied(#[error(not(source))] car::Plate),
}
