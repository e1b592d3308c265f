//! [`Activity`] definitions.

use std::net::IpAddr;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;

/// Entry of the append-only audit trail.
#[derive(Clone, Debug)]
pub struct Activity {
    /// ID of this [`Activity`].
    pub id: Id,

    /// ID of the [`User`] who performed this [`Activity`].
    ///
    /// [`None`] if it was performed by the system itself.
    ///
    /// [`User`]: crate::domain::User
    pub user_id: Option<user::Id>,

    /// [`Action`] performed.
    pub action: Action,

    /// Human-readable [`Details`] of this [`Activity`].
    pub details: Details,

    /// [`IpAddress`] this [`Activity`] originated from, if known.
    pub ip_address: Option<IpAddress>,

    /// [`DateTime`] when this [`Activity`] happened.
    pub created_at: CreationDateTime,
}

impl Activity {
    /// Creates a new [`Activity`] happened at the provided moment.
    #[must_use]
    pub fn new(
        user_id: Option<user::Id>,
        action: Action,
        details: impl Into<Details>,
        ip_address: Option<IpAddress>,
        created_at: CreationDateTime,
    ) -> Self {
        Self {
            id: Id::new(),
            user_id,
            action,
            details: details.into(),
            ip_address,
            created_at,
        }
    }

    /// Returns the [`Actor`] of this [`Activity`].
    #[must_use]
    pub fn actor(&self) -> Actor {
        self.user_id.map_or(Actor::System, Actor::User)
    }
}

/// Performer of an [`Activity`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Actor {
    /// The system itself.
    #[display("SYSTEM")]
    System,

    /// A [`User`].
    ///
    /// [`User`]: crate::domain::User
    #[display("{_0}")]
    User(user::Id),
}

/// ID of an [`Activity`].
///
/// Ordered by the creation time.
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
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new time-ordered [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

define_kind! {
    #[doc = "Action recorded as an [`Activity`]."]
    enum Action {
        #[doc = "A car was added to the fleet."]
        CarCreated = 1,

        #[doc = "A car was removed from the fleet."]
        CarDeleted = 2,

        #[doc = "A car was reserved."]
        CarReserved = 3,

        #[doc = "A car was released."]
        CarReleased = 4,

        #[doc = "A booking was created."]
        BookingCreated = 5,

        #[doc = "A booking was cancelled."]
        BookingCancelled = 6,

        #[doc = "A booking was completed."]
        BookingCompleted = 7,

        #[doc = "A payment was submitted by a client."]
        PaymentSubmitted = 8,

        #[doc = "A payment was approved by a manager."]
        PaymentApproved = 9,

        #[doc = "A payment was rejected by a manager."]
        PaymentRejected = 10,

        #[doc = "A user was created."]
        UserCreated = 11,

        #[doc = "A user was updated."]
        UserUpdated = 12,

        #[doc = "A user was deleted."]
        UserDeleted = 13,

        #[doc = "A user signed in."]
        UserSignedIn = 14,
    }
}

/// Human-readable details of an [`Activity`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
#[from(&str, String)]
pub struct Details(String);

/// IP address an [`Activity`] originated from.
#[derive(Clone, Copy, Debug, Display, Eq, From, FromStr, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct IpAddress(IpAddr);

/// [`DateTime`] when an [`Activity`] happened.
pub type CreationDateTime = DateTimeOf<(Activity, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::user;

    use super::{Action, Activity, Actor};

    #[test]
    fn reports_system_actor() {
        let activity = Activity::new(
            None,
            Action::CarReleased,
            "Car released",
            None,
            DateTime::UNIX_EPOCH.coerce(),
        );

        assert_eq!(activity.actor(), Actor::System);
        assert_eq!(activity.actor().to_string(), "SYSTEM");

        let user_id = user::Id::new();
        let activity = Activity {
            user_id: Some(user_id),
            ..activity
        };
        assert_eq!(activity.actor().to_string(), user_id.to_string());
    }

    #[test]
    fn ids_are_time_ordered() {
        let first = Activity::new(
            None,
            Action::UserSignedIn,
            "",
            None,
            DateTime::UNIX_EPOCH.coerce(),
        );
        let second = Activity::new(
            None,
            Action::UserSignedIn,
            "",
            None,
            DateTime::UNIX_EPOCH.coerce(),
        );

        assert!(first.id < second.id);
    }
}
