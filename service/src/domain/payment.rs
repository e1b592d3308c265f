//! [`Payment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{booking, user};

/// Payment a client claims to have made for a [`Booking`].
///
/// Stays [`Status::Pending`] until a manager reviews it.
///
/// [`Booking`]: crate::domain::Booking
#[derive(Clone, Debug)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the [`Booking`] this [`Payment`] is made for.
    ///
    /// [`Booking`]: crate::domain::Booking
    pub booking_id: booking::Id,

    /// Amount of this [`Payment`].
    pub amount: Money,

    /// [`Kind`] of this [`Payment`].
    pub kind: Kind,

    /// [`booking::PaymentCode`] copied from the [`Booking`].
    ///
    /// [`Booking`]: crate::domain::Booking
    pub payment_code: booking::PaymentCode,

    /// [`Status`] of this [`Payment`].
    pub status: Status,

    /// [`DateTime`] when the client reported this [`Payment`] as paid.
    pub paid_at: PaidDateTime,

    /// ID of the [`User`] who reviewed this [`Payment`] last time, if any.
    ///
    /// [`User`]: crate::domain::User
    pub approved_by: Option<user::Id>,

    /// [`DateTime`] when this [`Payment`] was reviewed last time, if it was.
    pub approved_at: Option<ReviewDateTime>,

    /// [`DateTime`] when this [`Payment`] was created.
    pub created_at: CreationDateTime,
}

impl Payment {
    /// Marks this [`Payment`] as reviewed by the provided [`User`] with the
    /// given verdict.
    ///
    /// Returns whether the [`Status`] has changed. The review stamp is
    /// updated anyway.
    ///
    /// [`User`]: crate::domain::User
    pub fn review(
        &mut self,
        verdict: Verdict,
        reviewer_id: user::Id,
        at: ReviewDateTime,
    ) -> bool {
        let status = match verdict {
            Verdict::Approve => Status::Approved,
            Verdict::Reject => Status::Rejected,
        };
        let changed = self.status != status;
        self.status = status;
        self.approved_by = Some(reviewer_id);
        self.approved_at = Some(at);
        changed
    }
}

/// Decision of a manager reviewing a [`Payment`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Verdict {
    /// [`Payment`] is confirmed as received.
    #[display("approved")]
    Approve,

    /// [`Payment`] is not received.
    #[display("rejected")]
    Reject,
}

/// ID of a [`Payment`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Kind of a [`Payment`]."]
    enum Kind {
        #[doc = "Upfront part of the total amount."]
        Deposit = 1,

        #[doc = "Rest of the total amount."]
        Full = 2,
    }
}

define_kind! {
    #[doc = "Status of a [`Payment`]."]
    enum Status {
        #[doc = "Waiting for review."]
        Pending = 1,

        #[doc = "Confirmed by a manager."]
        Approved = 2,

        #[doc = "Declined by a manager."]
        Rejected = 3,
    }
}

/// [`DateTime`] when a [`Payment`] was reported as paid.
pub type PaidDateTime = DateTimeOf<(Payment, unit::Payment)>;

/// [`DateTime`] when a [`Payment`] was reviewed.
pub type ReviewDateTime = DateTimeOf<(Payment, unit::Review)>;

/// [`DateTime`] when a [`Payment`] was created.
pub type CreationDateTime = DateTimeOf<(Payment, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{booking, user};

    use super::{Id, Kind, Payment, Status, Verdict};

    fn payment() -> Payment {
        Payment {
            id: Id::new(),
            booking_id: booking::Id::new(),
            amount: Money {
                amount: Decimal::from(6_000),
                currency: Currency::Rwf,
            },
            kind: Kind::Deposit,
            payment_code: booking::PaymentCode::generate(),
            status: Status::Pending,
            paid_at: DateTime::UNIX_EPOCH.coerce(),
            approved_by: None,
            approved_at: None,
            created_at: DateTime::UNIX_EPOCH.coerce(),
        }
    }

    #[test]
    fn review_stamps_reviewer() {
        let mut payment = payment();
        let manager = user::Id::new();
        let now = DateTime::from_rfc3339("2024-05-02T08:30:00Z").unwrap();

        assert!(payment.review(Verdict::Approve, manager, now.coerce()));
        assert_eq!(payment.status, Status::Approved);
        assert_eq!(payment.approved_by, Some(manager));
        assert_eq!(payment.approved_at, Some(now.coerce()));

        let another = user::Id::new();
        assert!(!payment.review(Verdict::Approve, another, now.coerce()));
        assert_eq!(payment.approved_by, Some(another));

        assert!(payment.review(Verdict::Reject, manager, now.coerce()));
        assert_eq!(payment.status, Status::Rejected);
    }
}
