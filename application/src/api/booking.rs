//! [`Booking`]-related definitions.

use std::future;

use common::{Date, DateTime, DateTimeOf, Handler as _, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// A booking of a car.
#[derive(Clone, Debug, From)]
pub struct Booking {
    /// ID of this [`Booking`].
    id: Id,

    /// Underlying [`domain::Booking`].
    booking: OnceCell<domain::Booking>,
}

impl From<domain::Booking> for Booking {
    fn from(booking: domain::Booking) -> Self {
        Self {
            id: booking.id.into(),
            booking: OnceCell::new_with(Some(booking)),
        }
    }
}

impl Booking {
    /// Creates a new [`Booking`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Booking`] with the provided ID exists,
    /// otherwise accessing this [`Booking`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            booking: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Booking`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Booking`] doesn't exist.
    async fn booking(&self, ctx: &Context) -> Result<&domain::Booking, Error> {
        let id = self.id.into();
        self.booking
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::booking::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|b| {
                        future::ready(b.ok_or_else(|| {
                            api::query::BookingError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A booking of a car.
#[graphql_object(context = Context)]
impl Booking {
    /// Unique identifier of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Booked `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.car",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn car(&self, ctx: &Context) -> Result<api::Car, Error> {
        let id = self.booking(ctx).await?.car_id;
        #[expect(
            unsafe_code,
            reason = "`Booking` references an existing `Car`"
        )]
        Ok(unsafe { api::Car::new_unchecked(id) })
    }

    /// Client `User` who made this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.client",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn client(&self, ctx: &Context) -> Result<api::User, Error> {
        let id = self.booking(ctx).await?.client_id;
        #[expect(
            unsafe_code,
            reason = "`Booking` references an existing `User`"
        )]
        Ok(unsafe { api::User::new_unchecked(id) })
    }

    /// First day of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.startDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn start_date(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.booking(ctx).await?.period.start().coerce())
    }

    /// Last day of this `Booking`, included.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.endDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn end_date(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.booking(ctx).await?.period.end().coerce())
    }

    /// Number of days this `Booking` lasts.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.days",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn days(&self, ctx: &Context) -> Result<i32, Error> {
        let days = self.booking(ctx).await?.period.days();
        i32::try_from(days)
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Number of cars booked.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.totalCars",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn total_cars(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(i16::from(self.booking(ctx).await?.total_cars).into())
    }

    /// Amount to be paid for this `Booking`, discount included.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.totalAmount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn total_amount(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.booking(ctx).await?.total_amount)
    }

    /// Amount of the deposit to be paid upfront.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.depositAmount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn deposit_amount(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.booking(ctx).await?.deposit_amount)
    }

    /// Indicator whether the bulk discount was applied.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.discountApplied",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn discount_applied(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.booking(ctx).await?.discount_applied)
    }

    /// Status of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.booking(ctx).await?.status.into())
    }

    /// Code to be referenced by the payments for this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.paymentCode",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn payment_code(
        &self,
        ctx: &Context,
    ) -> Result<PaymentCode, Error> {
        Ok(self.booking(ctx).await?.payment_code.clone().into())
    }

    /// `DateTime` when the deposit was approved, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.depositPaidAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn deposit_paid_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self
            .booking(ctx)
            .await?
            .deposit_paid_at
            .map(DateTimeOf::coerce))
    }

    /// `DateTime` when the full payment was approved, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.fullPaymentPaidAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn full_payment_paid_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self
            .booking(ctx)
            .await?
            .full_payment_paid_at
            .map(DateTimeOf::coerce))
    }

    /// Place to pick the booked cars up at, once paid in full.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.pickup",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn pickup(&self, ctx: &Context) -> Result<Option<Pickup>, Error> {
        Ok(self.booking(ctx).await?.pickup.clone().map(Into::into))
    }

    /// `Payment`s submitted for this `Booking`, oldest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.payments",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn payments(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Payment>, Error> {
        ctx.service()
            .execute(query::payments::ByBooking::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|payments| payments.into_iter().map(Into::into).collect())
    }

    /// `DateTime` when this `Booking` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.booking(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when this `Booking` was updated last time.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.updatedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn updated_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.booking(ctx).await?.updated_at.coerce())
    }
}

/// Unique identifier of a `Booking`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::booking::Id)]
#[into(domain::booking::Id)]
#[graphql(name = "BookingId", transparent)]
pub struct Id(Uuid);

/// Code correlating a `Booking` with its `Payment`s.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PaymentCode",
    with = scalar::Via::<domain::booking::PaymentCode>,
)]
pub struct PaymentCode(domain::booking::PaymentCode);

/// Status of a `Booking`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "BookingStatus")]
pub enum Status {
    /// Waiting for the full payment.
    Pending,

    /// Paid in full and confirmed.
    Approved,

    /// Cancelled by the staff.
    Rejected,

    /// Fulfilled.
    Completed,
}

impl From<domain::booking::Status> for Status {
    fn from(status: domain::booking::Status) -> Self {
        use domain::booking::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Approved => Self::Approved,
            S::Rejected => Self::Rejected,
            S::Completed => Self::Completed,
        }
    }
}

/// Place where booked cars are handed over.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "BookingPickup")]
pub struct Pickup {
    /// Short name of the location.
    pub location: String,

    /// Full address of the location.
    pub address: String,
}

impl From<domain::booking::Pickup> for Pickup {
    fn from(pickup: domain::booking::Pickup) -> Self {
        Self {
            location: pickup.location.to_string(),
            address: pickup.address.to_string(),
        }
    }
}
