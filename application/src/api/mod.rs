//! GraphQL API definitions.

pub mod activity;
pub mod booking;
pub mod car;
pub mod dashboard;
mod mutation;
pub mod payment;
mod query;
pub mod scalar;
pub mod user;

use crate::{define_error, Context};

pub use self::{
    activity::Activity, booking::Booking, car::Car, mutation::Mutation,
    payment::Payment, query::Query, user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<
    'static,
    Query,
    Mutation,
    juniper::EmptySubscription<Context>,
>;

define_error! {
    enum PrivilegeError {
        #[code = "NOT_PERMITTED"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` is not permitted to do that"]
        NotPermitted,
    }
}

define_error! {
    enum PaginationError {
        #[code = "AMBIGUOUS_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "Ambiguous pagination arguments"]
        Ambiguous,
    }
}
