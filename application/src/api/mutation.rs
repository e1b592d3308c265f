//! GraphQL [`Mutation`]s definitions.

use common::{Date, Money};
use juniper::{graphql_object, Nullable};
use service::{
    command::{self, create_user::Origin},
    domain::{booking, car, user},
    Command as _,
};

use crate::{api, define_error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User` with the provided credentials and contact info.
    ///
    /// Anonymous requests sign a new client up. Authenticated administrators
    /// create `User`s of any `UserRole`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LOGIN_OCCUPIED` - provided `UserLogin` is occupied by another `User`;
    /// - `NOT_PERMITTED` - the current `User` doesn't manage `User`s, or a
    ///                     non-client `UserRole` is requested on sign up.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUser",
            login = %login,
            name = %name,
            otel.name = Self::SPAN_NAME,
            phone = ?phone,
            role = ?role,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        login: api::user::Login,
        password: api::user::Password,
        email: api::user::Email,
        phone: Option<api::user::Phone>,
        role: Option<api::user::Role>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let origin = if ctx.try_current_session().await?.is_some() {
            Origin::Admin {
                role: role.map_or(user::Role::Client, Into::into),
                initiator: ctx.initiator().await?,
            }
        } else {
            if role.is_some_and(|r| r != api::user::Role::Client) {
                return Err(api::PrivilegeError::NotPermitted.into())
                    .map_err(ctx.error());
            }
            Origin::SignUp {
                ip_address: ctx.client_ip(),
            }
        };

        ctx.service()
            .execute(command::CreateUser {
                name: name.into(),
                login: login.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                email: email.into(),
                phone: phone.map(Into::into),
                origin,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `UserSession` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials does not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUserSession",
            login = %login,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        login: api::user::Login,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                login: login.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                ip_address: ctx.client_ip(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            role: output.user.role,
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Updates the `User` with the provided ID, or the current one if no ID
    /// is provided.
    ///
    /// Only the provided fields are changed. An explicit `null` `phone`
    /// removes it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the provided ID does not exist;
    /// - `NOT_PERMITTED` - the current `User` doesn't manage `User`s and
    ///                     updates another `User` or its own `UserRole`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = ?email,
            gql.name = "updateUser",
            id = ?id,
            name = ?name,
            otel.name = Self::SPAN_NAME,
            phone = ?phone,
            role = ?role,
        ),
    )]
    pub async fn update_user(
        id: Option<api::user::Id>,
        name: Option<api::user::Name>,
        email: Option<api::user::Email>,
        phone: Nullable<api::user::Phone>,
        password: Option<api::user::Password>,
        role: Option<api::user::Role>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let initiator = ctx.initiator().await?;

        ctx.service()
            .execute(command::UpdateUser {
                user_id: id.map_or(initiator.user_id, Into::into),
                name: name.map(Into::into),
                email: email.map(Into::into),
                phone: phone.explicit().map(|p| p.map(Into::into)),
                password: password.map(|p| {
                    secrecy::SecretBox::init_with(move || p.into())
                }),
                role: role.map(Into::into),
                initiator,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `User` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the provided ID does not exist;
    /// - `SELF_DELETION` - the current `User` tries to delete itself;
    /// - `NOT_PERMITTED` - the current `User` doesn't manage `User`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteUser",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::DeleteUser {
                user_id: id.into(),
                initiator: ctx.initiator().await?,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Adds a new `Car` to the fleet.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_CAR_YEAR` - provided `year` is out of range;
    /// - `NEGATIVE_DAILY_RATE` - provided `dailyRate` is negative;
    /// - `PLATE_OCCUPIED` - another `Car` has the provided `CarPlate`;
    /// - `NOT_PERMITTED` - the current `User` doesn't manage the fleet.
    #[tracing::instrument(
        skip_all,
        fields(
            brand = %brand,
            color = ?color,
            daily_rate = %daily_rate,
            gql.name = "createCar",
            model = %model,
            otel.name = Self::SPAN_NAME,
            plate = %plate,
            year = %year,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn create_car(
        brand: api::car::Brand,
        model: api::car::Model,
        year: i32,
        color: Option<api::car::Color>,
        plate: api::car::Plate,
        specifications: Option<api::car::Specifications>,
        image_url: Option<api::car::ImageUrl>,
        daily_rate: Money,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        let year = car::Year::new(year)
            .ok_or_else(|| InputError::InvalidCarYear.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateCar {
                brand: brand.into(),
                model: model.into(),
                year,
                color: color.map(Into::into),
                plate: plate.into(),
                specifications: specifications.map(Into::into),
                image_url: image_url.map(Into::into),
                daily_rate,
                initiator: ctx.initiator().await?,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Removes the `Car` with the provided ID from the fleet.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `CAR_IN_USE` - the `Car` is referenced by `Booking`s;
    /// - `NOT_PERMITTED` - the current `User` doesn't manage the fleet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteCar",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_car(
        id: api::car::Id,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        ctx.service()
            .execute(command::DeleteCar {
                car_id: id.into(),
                initiator: ctx.initiator().await?,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Car` with the provided ID as unavailable.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `CAR_UNAVAILABLE` - the `Car` is reserved already;
    /// - `NOT_PERMITTED` - the current `User` doesn't manage the fleet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reserveCar",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reserve_car(
        id: api::car::Id,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        ctx.service()
            .execute(command::ReserveCar {
                car_id: id.into(),
                initiator: ctx.initiator().await?,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Car` with the provided ID as available.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `NOT_PERMITTED` - the current `User` doesn't manage the fleet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "releaseCar",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn release_car(
        id: api::car::Id,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        ctx.service()
            .execute(command::ReleaseCar {
                car_id: id.into(),
                initiator: ctx.initiator().await?,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Books the `Car` with the provided ID for the provided days, both
    /// included.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_TOTAL_CARS` - provided `totalCars` is not positive;
    /// - `START_IN_PAST` - provided `startDate` is in the past;
    /// - `END_NOT_AFTER_START` - provided `endDate` is not later than the
    ///                           `startDate`;
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `CAR_UNAVAILABLE` - the `Car` is reserved already;
    /// - `NOT_PERMITTED` - the current `User` is not a client.
    #[tracing::instrument(
        skip_all,
        fields(
            car_id = %car_id,
            end_date = %end_date,
            gql.name = "createBooking",
            otel.name = Self::SPAN_NAME,
            start_date = %start_date,
            total_cars = %total_cars,
        ),
    )]
    pub async fn create_booking(
        car_id: api::car::Id,
        start_date: Date,
        end_date: Date,
        total_cars: i32,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let total_cars = booking::NumCars::new(total_cars)
            .ok_or_else(|| InputError::InvalidTotalCars.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateBooking {
                car_id: car_id.into(),
                start_date: start_date.coerce(),
                end_date: end_date.coerce(),
                total_cars,
                initiator: ctx.initiator().await?,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the `Booking` with the provided ID and releases its `Car`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the provided ID does not
    ///                          exist;
    /// - `BOOKING_CLOSED` - the `Booking` is cancelled or completed already;
    /// - `NOT_PERMITTED` - the current `User` doesn't manage `Booking`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cancelBooking",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_booking(
        id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        ctx.service()
            .execute(command::CancelBooking {
                booking_id: id.into(),
                initiator: ctx.initiator().await?,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Completes the approved `Booking` with the provided ID and releases its
    /// `Car`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the provided ID does not
    ///                          exist;
    /// - `BOOKING_CLOSED` - the `Booking` is cancelled or completed already;
    /// - `BOOKING_NOT_APPROVED` - the `Booking` is not paid in full yet;
    /// - `NOT_PERMITTED` - the current `User` doesn't manage `Booking`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "completeBooking",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn complete_booking(
        id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        ctx.service()
            .execute(command::CompleteBooking {
                booking_id: id.into(),
                initiator: ctx.initiator().await?,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Reports a payment for the `Booking` with the provided ID as made.
    ///
    /// The amount is derived from the `Booking` and the `PaymentKind`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the provided ID does not
    ///                          exist;
    /// - `BOOKING_CLOSED` - the `Booking` is cancelled or completed already;
    /// - `PAYMENT_ALREADY_SUBMITTED` - a payment of the same kind is pending
    ///                                 or approved already;
    /// - `NOT_PERMITTED` - the current `User` is not the client of the
    ///                     `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_id = %booking_id,
            gql.name = "submitPayment",
            kind = ?kind,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn submit_payment(
        booking_id: api::booking::Id,
        kind: api::payment::Kind,
        ctx: &Context,
    ) -> Result<api::Payment, Error> {
        ctx.service()
            .execute(command::SubmitPayment {
                booking_id: booking_id.into(),
                kind: kind.into(),
                initiator: ctx.initiator().await?,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Approves the `Payment` with the provided ID and marks its `Booking`
    /// accordingly.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PAYMENT_NOT_EXISTS` - the `Payment` with the provided ID does not
    ///                          exist;
    /// - `BOOKING_CLOSED` - the `Booking` is cancelled or completed already;
    /// - `NOT_PERMITTED` - the current `User` doesn't review `Payment`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "approvePayment",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn approve_payment(
        id: api::payment::Id,
        ctx: &Context,
    ) -> Result<api::payment::ReviewResult, Error> {
        ctx.service()
            .execute(command::ApprovePayment {
                payment_id: id.into(),
                initiator: ctx.initiator().await?,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Rejects the `Payment` with the provided ID and revokes its effect on
    /// the `Booking`, if any.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PAYMENT_NOT_EXISTS` - the `Payment` with the provided ID does not
    ///                          exist;
    /// - `BOOKING_CLOSED` - the `Booking` is cancelled or completed already;
    /// - `NOT_PERMITTED` - the current `User` doesn't review `Payment`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "rejectPayment",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reject_payment(
        id: api::payment::Id,
        ctx: &Context,
    ) -> Result<api::payment::ReviewResult, Error> {
        ctx.service()
            .execute(command::RejectPayment {
                payment_id: id.into(),
                initiator: ctx.initiator().await?,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum InputError {
        #[code = "INVALID_CAR_YEAR"]
        #[status = BAD_REQUEST]
        #[message = "`Car` year must be positive"]
        InvalidCarYear,

        #[code = "INVALID_TOTAL_CARS"]
        #[status = BAD_REQUEST]
        #[message = "Number of booked cars must be positive"]
        InvalidTotalCars,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LOGIN_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserLogin` is occupied by another `User`"]
                LoginOccupied,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::LoginOccupied(_) => Error::LoginOccupied.into(),
            Self::NotPermitted(_) => api::PrivilegeError::NotPermitted.into(),
            Self::PasswordHash(_) => return None,
        })
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = FORBIDDEN]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::update_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::NotPermitted.into(),
            Self::PasswordHash(_) => return None,
            Self::UserNotExists(_) => api::query::UserError::NotExists.into(),
        })
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SELF_DELETION"]
                #[status = CONFLICT]
                #[message = "`User` cannot delete itself"]
                SelfDeletion,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::NotPermitted.into(),
            Self::SelfDeletion(_) => Error::SelfDeletion.into(),
            Self::UserNotExists(_) => api::query::UserError::NotExists.into(),
        })
    }
}

impl AsError for command::create_car::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NEGATIVE_DAILY_RATE"]
                #[status = BAD_REQUEST]
                #[message = "`Car` daily rate cannot be negative"]
                NegativeDailyRate,

                #[code = "PLATE_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`CarPlate` is registered for another `Car`"]
                PlateOccupied,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NegativeDailyRate(_) => Error::NegativeDailyRate.into(),
            Self::NotPermitted(_) => api::PrivilegeError::NotPermitted.into(),
            Self::PlateOccupied(_) => Error::PlateOccupied.into(),
        })
    }
}

impl AsError for command::delete_car::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CAR_IN_USE"]
                #[status = CONFLICT]
                #[message = "`Car` is referenced by `Booking`s"]
                CarInUse,
            }
        }

        Some(match self {
            Self::CarInUse(_) => Error::CarInUse.into(),
            Self::CarNotExists(_) => api::query::CarError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::NotPermitted.into(),
        })
    }
}

impl AsError for command::reserve_car::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::CarNotExists(_) => api::query::CarError::NotExists.into(),
            Self::CarUnavailable(e) => return e.try_as_error(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::NotPermitted.into(),
        })
    }
}

impl AsError for command::release_car::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::CarNotExists(_) => api::query::CarError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::NotPermitted.into(),
        })
    }
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::CarNotExists(_) => api::query::CarError::NotExists.into(),
            Self::CarUnavailable(e) => return e.try_as_error(),
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidPeriod(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::NotPermitted.into(),
        })
    }
}

impl AsError for command::cancel_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::BookingNotExists(_) => {
                api::query::BookingError::NotExists.into()
            }
            Self::CarNotExists(_) => api::query::CarError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::NotPermitted.into(),
            Self::Transition(e) => return e.try_as_error(),
        })
    }
}

impl AsError for command::complete_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::BookingNotExists(_) => {
                api::query::BookingError::NotExists.into()
            }
            Self::CarNotExists(_) => api::query::CarError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::NotPermitted.into(),
            Self::Transition(e) => return e.try_as_error(),
        })
    }
}

impl AsError for command::submit_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PAYMENT_ALREADY_SUBMITTED"]
                #[status = CONFLICT]
                #[message = "`Payment` of this kind is pending or approved"]
                AlreadySubmitted,
            }
        }

        Some(match self {
            Self::AlreadySubmitted(_) => Error::AlreadySubmitted.into(),
            Self::BookingClosed(s) => {
                return booking::TransitionError::Closed(*s).try_as_error()
            }
            Self::BookingNotExists(_) => {
                api::query::BookingError::NotExists.into()
            }
            Self::Db(e) => return e.try_as_error(),
            Self::Inconsistent(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::NotPermitted.into(),
        })
    }
}

impl AsError for command::review_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PAYMENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Payment` with the provided ID does not exist"]
                PaymentNotExists,
            }
        }

        Some(match self {
            Self::BookingNotExists(_) => {
                api::query::BookingError::NotExists.into()
            }
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::NotPermitted.into(),
            Self::PaymentNotExists(_) => Error::PaymentNotExists.into(),
            Self::Transition(e) => return e.try_as_error(),
        })
    }
}

#[cfg(test)]
mod spec {
    use service::{
        command,
        domain::{payment, user},
    };

    use crate::AsError as _;

    #[test]
    fn traces_self_deletion() {
        use command::delete_user::ExecutionError as E;

        let err = tracerr::new!(E::SelfDeletion(user::Id::new())).into_error();

        assert_eq!(err.code, "SELF_DELETION");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        assert!(err.backtrace.is_some());
    }

    #[test]
    fn hides_unknown_login_behind_wrong_credentials() {
        use command::create_user_session::ExecutionError as E;

        let unknown = E::UserNotExists(user::Id::new()).as_error();
        let wrong = E::WrongCredentials.as_error();

        assert_eq!(unknown.code, "WRONG_CREDENTIALS");
        assert_eq!(unknown.code, wrong.code);
        assert_eq!(unknown.message, wrong.message);
    }

    #[test]
    fn maps_permission_errors_to_forbidden() {
        use command::reserve_car::ExecutionError as E;

        let err = E::NotPermitted(user::Id::new()).as_error();

        assert_eq!(err.code, "NOT_PERMITTED");
        assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn maps_duplicate_payment_to_conflict() {
        use command::submit_payment::ExecutionError as E;

        let err = E::AlreadySubmitted(payment::Kind::Deposit).as_error();

        assert_eq!(err.code, "PAYMENT_ALREADY_SUBMITTED");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
    }
}
