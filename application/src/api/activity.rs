//! [`Activity`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// An entry of the audit log.
#[derive(Clone, Debug, From, Into)]
pub struct Activity(domain::Activity);

/// An entry of the audit log.
#[graphql_object(context = Context)]
impl Activity {
    /// Unique identifier of this `Activity`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `User` who performed this `Activity`.
    ///
    /// `null` if it was performed by the system, or the `User` was deleted.
    #[must_use]
    pub fn user(&self) -> Option<api::User> {
        self.0.user_id.map(|id| {
            #[expect(
                unsafe_code,
                reason = "errors on deleted `User`s are exposed to the client"
            )]
            unsafe {
                api::User::new_unchecked(id)
            }
        })
    }

    /// Performer of this `Activity`: either `SYSTEM` or a `User` ID.
    #[must_use]
    pub fn actor(&self) -> String {
        self.0.actor().to_string()
    }

    /// Action performed.
    #[must_use]
    pub fn action(&self) -> Action {
        self.0.action.into()
    }

    /// Human-readable details of this `Activity`.
    #[must_use]
    pub fn details(&self) -> String {
        self.0.details.to_string()
    }

    /// IP address this `Activity` originated from, if known.
    #[must_use]
    pub fn ip_address(&self) -> Option<String> {
        self.0.ip_address.map(|ip| ip.to_string())
    }

    /// `DateTime` when this `Activity` happened.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of an `Activity`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::activity::Id)]
#[into(domain::activity::Id)]
#[graphql(name = "ActivityId", transparent)]
pub struct Id(Uuid);

/// Action recorded as an `Activity`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ActivityAction")]
pub enum Action {
    /// A `Car` was added to the fleet.
    CarCreated,

    /// A `Car` was removed from the fleet.
    CarDeleted,

    /// A `Car` was reserved.
    CarReserved,

    /// A `Car` was released.
    CarReleased,

    /// A `Booking` was created.
    BookingCreated,

    /// A `Booking` was cancelled.
    BookingCancelled,

    /// A `Booking` was completed.
    BookingCompleted,

    /// A `Payment` was submitted.
    PaymentSubmitted,

    /// A `Payment` was approved.
    PaymentApproved,

    /// A `Payment` was rejected.
    PaymentRejected,

    /// A `User` was created.
    UserCreated,

    /// A `User` was updated.
    UserUpdated,

    /// A `User` was deleted.
    UserDeleted,

    /// A `User` signed in.
    UserSignedIn,
}

impl From<domain::activity::Action> for Action {
    fn from(action: domain::activity::Action) -> Self {
        use domain::activity::Action as A;
        match action {
            A::CarCreated => Self::CarCreated,
            A::CarDeleted => Self::CarDeleted,
            A::CarReserved => Self::CarReserved,
            A::CarReleased => Self::CarReleased,
            A::BookingCreated => Self::BookingCreated,
            A::BookingCancelled => Self::BookingCancelled,
            A::BookingCompleted => Self::BookingCompleted,
            A::PaymentSubmitted => Self::PaymentSubmitted,
            A::PaymentApproved => Self::PaymentApproved,
            A::PaymentRejected => Self::PaymentRejected,
            A::UserCreated => Self::UserCreated,
            A::UserUpdated => Self::UserUpdated,
            A::UserDeleted => Self::UserDeleted,
            A::UserSignedIn => Self::UserSignedIn,
        }
    }
}

impl From<Action> for domain::activity::Action {
    fn from(action: Action) -> Self {
        use Action as A;
        match action {
            A::CarCreated => Self::CarCreated,
            A::CarDeleted => Self::CarDeleted,
            A::CarReserved => Self::CarReserved,
            A::CarReleased => Self::CarReleased,
            A::BookingCreated => Self::BookingCreated,
            A::BookingCancelled => Self::BookingCancelled,
            A::BookingCompleted => Self::BookingCompleted,
            A::PaymentSubmitted => Self::PaymentSubmitted,
            A::PaymentApproved => Self::PaymentApproved,
            A::PaymentRejected => Self::PaymentRejected,
            A::UserCreated => Self::UserCreated,
            A::UserUpdated => Self::UserUpdated,
            A::UserDeleted => Self::UserDeleted,
            A::UserSignedIn => Self::UserSignedIn,
        }
    }
}

pub mod list {
    //! Definitions related to [`Activity`] log.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::read;

    use crate::{api::scalar, Context};

    use super::{Activity, Id};

    /// Cursor for the `Activity` log.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::activity::list::Cursor)]
    #[graphql(
        name = "ActivityListCursor",
        with = scalar::Via::<read::activity::list::Cursor>,
    )]
    pub struct Cursor(pub read::activity::list::Cursor);

    /// Edge in the [`Activity`] log.
    #[derive(Clone, Debug, From, Into)]
    pub struct Edge(read::activity::list::Edge);

    /// Edge in the `Activity` log.
    #[graphql_object(name = "ActivityListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `ActivityListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `ActivityListEdge`.
        #[must_use]
        pub fn node(&self) -> Activity {
            self.0.node.clone().into()
        }
    }

    /// Connection of the [`Activity`] log.
    #[derive(Clone, Debug, From, Into)]
    pub struct Connection(read::activity::list::Connection);

    /// Connection of the `Activity` log.
    #[graphql_object(name = "ActivityListConnection", context = Context)]
    impl Connection {
        /// Edges in this `ActivityListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.0.edges.iter().cloned().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.0.page_info(),
                start_cursor: self.0.edges.first().map(|e| e.cursor.into()),
                end_cursor: self.0.edges.last().map(|e| e.cursor.into()),
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::activity::list::PageInfo`].
        info: read::activity::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,

        /// End cursor of the page.
        end_cursor: Option<Cursor>,
    }

    /// Information about an `ActivityListConnection` page.
    #[graphql_object(name = "ActivityListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> &Option<Cursor> {
            &self.start_cursor
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> &Option<Cursor> {
            &self.end_cursor
        }
    }
}
