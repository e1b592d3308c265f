//! [`Payment`]-related definitions.

use common::{DateTime, DateTimeOf, Money};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::{command, domain};
use uuid::Uuid;

use crate::{api, Context};

/// A payment submitted for a `Booking`.
#[derive(Clone, Debug, From, Into)]
pub struct Payment(domain::Payment);

/// A payment submitted for a `Booking`.
#[graphql_object(context = Context)]
impl Payment {
    /// Unique identifier of this `Payment`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `Booking` this `Payment` is made for.
    #[must_use]
    pub fn booking(&self) -> api::Booking {
        #[expect(
            unsafe_code,
            reason = "`Payment` references an existing `Booking`"
        )]
        unsafe {
            api::Booking::new_unchecked(self.0.booking_id)
        }
    }

    /// Amount of this `Payment`.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.0.amount
    }

    /// Kind of this `Payment`.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.0.kind.into()
    }

    /// Code of the `Booking` this `Payment` references.
    #[must_use]
    pub fn payment_code(&self) -> api::booking::PaymentCode {
        self.0.payment_code.clone().into()
    }

    /// Status of this `Payment`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `Payment` was reported as paid.
    #[must_use]
    pub fn paid_at(&self) -> DateTime {
        self.0.paid_at.coerce()
    }

    /// `User` who reviewed this `Payment` last time, if any.
    #[must_use]
    pub fn approved_by(&self) -> Option<api::User> {
        self.0.approved_by.map(|id| {
            #[expect(
                unsafe_code,
                reason = "`Payment` references an existing `User`"
            )]
            unsafe {
                api::User::new_unchecked(id)
            }
        })
    }

    /// `DateTime` when this `Payment` was reviewed last time, if it was.
    #[must_use]
    pub fn approved_at(&self) -> Option<DateTime> {
        self.0.approved_at.map(DateTimeOf::coerce)
    }

    /// `DateTime` when this `Payment` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Payment`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::payment::Id)]
#[into(domain::payment::Id)]
#[graphql(name = "PaymentId", transparent)]
pub struct Id(Uuid);

/// Kind of a `Payment`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PaymentKind")]
pub enum Kind {
    /// Upfront part of the `Booking` total amount.
    Deposit,

    /// The whole `Booking` total amount.
    Full,
}

impl From<domain::payment::Kind> for Kind {
    fn from(kind: domain::payment::Kind) -> Self {
        use domain::payment::Kind as K;
        match kind {
            K::Deposit => Self::Deposit,
            K::Full => Self::Full,
        }
    }
}

impl From<Kind> for domain::payment::Kind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Deposit => Self::Deposit,
            Kind::Full => Self::Full,
        }
    }
}

/// Status of a `Payment`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PaymentStatus")]
pub enum Status {
    /// Waiting for a review.
    Pending,

    /// Confirmed as received.
    Approved,

    /// Declined.
    Rejected,
}

impl From<domain::payment::Status> for Status {
    fn from(status: domain::payment::Status) -> Self {
        use domain::payment::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Approved => Self::Approved,
            S::Rejected => Self::Rejected,
        }
    }
}

/// Result of a `Payment` review.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context, name = "ReviewPaymentResult")]
pub struct ReviewResult {
    /// Reviewed `Payment`.
    pub payment: Payment,

    /// `Booking` the reviewed `Payment` is made for, after the review.
    pub booking: api::Booking,
}

impl From<command::review_payment::Output> for ReviewResult {
    fn from(output: command::review_payment::Output) -> Self {
        let command::review_payment::Output { payment, booking } = output;
        Self {
            payment: payment.into(),
            booking: booking.into(),
        }
    }
}
