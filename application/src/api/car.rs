//! [`Car`]-related definitions.

use std::future;

use common::{DateTime, Handler as _, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// A car of the fleet.
#[derive(Clone, Debug, From)]
pub struct Car {
    /// ID of this [`Car`].
    id: Id,

    /// Underlying [`domain::Car`].
    car: OnceCell<domain::Car>,
}

impl From<domain::Car> for Car {
    fn from(car: domain::Car) -> Self {
        Self {
            id: car.id.into(),
            car: OnceCell::new_with(Some(car)),
        }
    }
}

impl Car {
    /// Creates a new [`Car`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Car`] with the provided ID exists,
    /// otherwise accessing this [`Car`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            car: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Car`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Car`] doesn't exist.
    async fn car(&self, ctx: &Context) -> Result<&domain::Car, Error> {
        let id = self.id.into();
        self.car
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::car::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|c| {
                        future::ready(c.ok_or_else(|| {
                            api::query::CarError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A car of the fleet.
#[graphql_object(context = Context)]
impl Car {
    /// Unique identifier of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Brand of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.brand",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn brand(&self, ctx: &Context) -> Result<Brand, Error> {
        Ok(self.car(ctx).await?.brand.clone().into())
    }

    /// Model of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.model",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn model(&self, ctx: &Context) -> Result<Model, Error> {
        Ok(self.car(ctx).await?.model.clone().into())
    }

    /// Manufacturing year of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.year",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn year(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(i16::from(self.car(ctx).await?.year).into())
    }

    /// Color of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.color",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn color(&self, ctx: &Context) -> Result<Option<Color>, Error> {
        Ok(self.car(ctx).await?.color.clone().map(Into::into))
    }

    /// Registration plate of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.plate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn plate(&self, ctx: &Context) -> Result<Plate, Error> {
        Ok(self.car(ctx).await?.plate.clone().into())
    }

    /// Technical specifications of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.specifications",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn specifications(
        &self,
        ctx: &Context,
    ) -> Result<Option<Specifications>, Error> {
        Ok(self.car(ctx).await?.specifications.clone().map(Into::into))
    }

    /// URL of this `Car` picture.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.imageUrl",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn image_url(
        &self,
        ctx: &Context,
    ) -> Result<Option<ImageUrl>, Error> {
        Ok(self.car(ctx).await?.image_url.clone().map(Into::into))
    }

    /// Price of renting this `Car` for a day.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.dailyRate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn daily_rate(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.car(ctx).await?.daily_rate)
    }

    /// Indicator whether this `Car` is not reserved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.isAvailable",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_available(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.car(ctx).await?.is_available)
    }

    /// `DateTime` when this `Car` was added to the fleet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.car(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when this `Car` was updated last time.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.updatedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn updated_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.car(ctx).await?.updated_at.coerce())
    }
}

/// Unique identifier of a `Car`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::car::Id)]
#[into(domain::car::Id)]
#[graphql(name = "CarId", transparent)]
pub struct Id(Uuid);

/// Brand of a `Car`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "CarBrand", with = scalar::Via::<domain::car::Brand>)]
pub struct Brand(domain::car::Brand);

/// Model of a `Car`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "CarModel", with = scalar::Via::<domain::car::Model>)]
pub struct Model(domain::car::Model);

/// Color of a `Car`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "CarColor", with = scalar::Via::<domain::car::Color>)]
pub struct Color(domain::car::Color);

/// Registration plate of a `Car`.
///
/// Normalized to upper case without surrounding whitespace.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "CarPlate", with = scalar::Via::<domain::car::Plate>)]
pub struct Plate(domain::car::Plate);

/// Technical specifications of a `Car`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CarSpecifications",
    with = scalar::Via::<domain::car::Specifications>,
)]
pub struct Specifications(domain::car::Specifications);

/// URL of a `Car` picture.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CarImageUrl",
    with = scalar::Via::<domain::car::ImageUrl>,
)]
pub struct ImageUrl(domain::car::ImageUrl);
