//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{domain::user::Capability, query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist;
    /// - `NOT_PERMITTED` - the current `User` is neither the staff nor the
    ///                     requested `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "user",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let session = ctx.current_session().await?;
        let is_permitted = session.user_id == id
            || session.role.can(Capability::ManageUsers)
            || session.role.can(Capability::ManageBookings);
        if !is_permitted {
            return Err(api::PrivilegeError::NotPermitted.into())
                .map_err(ctx.error());
        }

        ctx.service()
            .execute(query::user::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `User`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous;
    /// - `NOT_PERMITTED` - the current `User` doesn't manage `User`s.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "users",
            last = ?last,
            otel.name = Self::SPAN_NAME,
            role = ?role,
        ),
    )]
    pub async fn users(
        first: Option<i32>,
        after: Option<api::user::list::Cursor>,
        last: Option<i32>,
        before: Option<api::user::list::Cursor>,
        role: Option<api::user::Role>,
        ctx: &Context,
    ) -> Result<api::user::list::Connection, Error> {
        const DEFAULT_PAGE_SIZE: i32 = 10;

        let arguments = read::user::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;

        _ = ctx.require(Capability::ManageUsers).await?;

        ctx.service()
            .execute(query::users::List::by(read::user::list::Selector {
                arguments,
                filter: read::user::list::Filter {
                    role: role.map(Into::into),
                },
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Car` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "car",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn car(
        id: api::car::Id,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        ctx.service()
            .execute(query::car::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| CarError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists the whole fleet, newest `Car`s first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_PERMITTED` - the current `User` doesn't manage the fleet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cars",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cars(ctx: &Context) -> Result<Vec<api::Car>, Error> {
        _ = ctx.require(Capability::ManageFleet).await?;

        ctx.service()
            .execute(query::cars::List::by(read::car::Filter::All))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cars| cars.into_iter().map(Into::into).collect())
    }

    /// Lists the `Car`s which can be booked right now, newest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "availableCars",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn available_cars(
        ctx: &Context,
    ) -> Result<Vec<api::Car>, Error> {
        ctx.service()
            .execute(query::cars::List::by(read::car::Filter::Available))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cars| cars.into_iter().map(Into::into).collect())
    }

    /// Returns the `Booking` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist;
    /// - `NOT_PERMITTED` - the current `User` is neither the staff nor the
    ///                     client of the `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "booking",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn booking(
        id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let session = ctx.current_session().await?;

        let booking = ctx
            .service()
            .execute(query::booking::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| BookingError::NotExists.into())
            .map_err(ctx.error())?;

        let is_permitted = api::user::Id::from(booking.client_id)
            == session.user_id
            || session.role.can(Capability::ManageBookings)
            || session.role.can(Capability::ReviewPayments);
        if !is_permitted {
            return Err(api::PrivilegeError::NotPermitted.into())
                .map_err(ctx.error());
        }

        Ok(booking.into())
    }

    /// Lists all the `Booking`s, newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_PERMITTED` - the current `User` doesn't manage `Booking`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "bookings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn bookings(ctx: &Context) -> Result<Vec<api::Booking>, Error> {
        _ = ctx.require(Capability::ManageBookings).await?;

        ctx.service()
            .execute(query::bookings::List::by(read::booking::Filter::All))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bookings| bookings.into_iter().map(Into::into).collect())
    }

    /// Lists the `Booking`s of the current `User`, newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_PERMITTED` - the current `User` is not a client.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myBookings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_bookings(
        ctx: &Context,
    ) -> Result<Vec<api::Booking>, Error> {
        let my_id = ctx.require(Capability::Book).await?.user_id;

        ctx.service()
            .execute(query::bookings::List::by(read::booking::Filter::Client(
                my_id.into(),
            )))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bookings| bookings.into_iter().map(Into::into).collect())
    }

    /// Returns the `Payment` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PAYMENT_NOT_EXISTS` - the `Payment` with the specified ID does not
    ///                          exist;
    /// - `NOT_PERMITTED` - the current `User` is neither the staff nor the
    ///                     client of the paid `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "payment",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn payment(
        id: api::payment::Id,
        ctx: &Context,
    ) -> Result<api::Payment, Error> {
        let session = ctx.current_session().await?;

        let payment = ctx
            .service()
            .execute(query::payment::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| PaymentError::NotExists.into())
            .map_err(ctx.error())?;

        if !session.role.can(Capability::ReviewPayments)
            && !session.role.can(Capability::ManageBookings)
        {
            let booking = ctx
                .service()
                .execute(query::booking::ById::by(payment.booking_id))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())?;
            let is_owner = booking.is_some_and(|b| {
                api::user::Id::from(b.client_id) == session.user_id
            });
            if !is_owner {
                return Err(api::PrivilegeError::NotPermitted.into())
                    .map_err(ctx.error());
            }
        }

        Ok(payment.into())
    }

    /// Lists the `Payment`s waiting for a review, oldest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_PERMITTED` - the current `User` doesn't review `Payment`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "pendingPayments",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn pending_payments(
        ctx: &Context,
    ) -> Result<Vec<api::Payment>, Error> {
        _ = ctx.require(Capability::ReviewPayments).await?;

        ctx.service()
            .execute(query::payments::ByStatus::by(
                service::domain::payment::Status::Pending,
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|payments| payments.into_iter().map(Into::into).collect())
    }

    /// Fetches the page of the `Activity` log.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous;
    /// - `NOT_PERMITTED` - the current `User` cannot browse the log.
    #[tracing::instrument(
        skip_all,
        fields(
            action = ?action,
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "activities",
            last = ?last,
            otel.name = Self::SPAN_NAME,
            user_id = ?user_id,
        ),
    )]
    pub async fn activities(
        first: Option<i32>,
        after: Option<api::activity::list::Cursor>,
        last: Option<i32>,
        before: Option<api::activity::list::Cursor>,
        user_id: Option<api::user::Id>,
        action: Option<api::activity::Action>,
        ctx: &Context,
    ) -> Result<api::activity::list::Connection, Error> {
        const DEFAULT_PAGE_SIZE: i32 = 20;

        let arguments = read::activity::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;

        _ = ctx.require(Capability::ViewActivity).await?;

        ctx.service()
            .execute(query::activities::List::by(
                read::activity::list::Selector {
                    arguments,
                    filter: read::activity::list::Filter {
                        user_id: user_id.map(Into::into),
                        action: action.map(Into::into),
                    },
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the rollup of the fleet state.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_PERMITTED` - the current `User` doesn't manage the fleet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "fleetDashboard",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn fleet_dashboard(
        ctx: &Context,
    ) -> Result<api::dashboard::Fleet, Error> {
        _ = ctx.require(Capability::ManageFleet).await?;

        ctx.service()
            .execute(query::dashboard::Fleet::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the rollup of the whole portal.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_PERMITTED` - the current `User` doesn't manage `User`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "overviewDashboard",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn overview_dashboard(
        ctx: &Context,
    ) -> Result<api::dashboard::Overview, Error> {
        _ = ctx.require(Capability::ManageUsers).await?;

        ctx.service()
            .execute(query::dashboard::Overview::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the rollup of the current client `Booking`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_PERMITTED` - the current `User` is not a client.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myDashboard",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_dashboard(
        ctx: &Context,
    ) -> Result<api::dashboard::Client, Error> {
        let my_id = ctx.require(Capability::Book).await?.user_id;

        ctx.service()
            .execute(query::dashboard::Client::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum BookingError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum CarError {
        #[code = "CAR_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Car` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum PaymentError {
        #[code = "PAYMENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Payment` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
