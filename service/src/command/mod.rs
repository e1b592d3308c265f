//! [`Command`] definition.

pub mod authorize_user_session;
pub mod cancel_booking;
pub mod complete_booking;
pub mod create_booking;
pub mod create_car;
pub mod create_user;
pub mod create_user_session;
pub mod delete_car;
pub mod delete_user;
pub mod release_car;
pub mod reserve_car;
pub mod review_payment;
pub mod submit_payment;
pub mod update_user;

use common::operations::Insert;
use tracerr::Traced;

use crate::{
    domain::{activity, user, Activity},
    infra::{database, Database},
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    cancel_booking::CancelBooking, complete_booking::CompleteBooking,
    create_booking::CreateBooking, create_car::CreateCar,
    create_user::CreateUser, create_user_session::CreateUserSession,
    delete_car::DeleteCar, delete_user::DeleteUser, release_car::ReleaseCar,
    reserve_car::ReserveCar,
    review_payment::{ApprovePayment, RejectPayment, ReviewPayment},
    submit_payment::SubmitPayment, update_user::UpdateUser,
};

/// Authenticated [`User`] executing a [`Command`].
///
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug)]
pub struct Initiator {
    /// ID of the [`User`] executing the [`Command`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// [`activity::IpAddress`] the [`Command`] originates from, if known.
    pub ip_address: Option<activity::IpAddress>,
}

/// Appends the provided [`Activity`] to the log.
///
/// Failures are only logged.
async fn record<Db>(db: &Db, activity: Activity)
where
    Db: Database<Insert<Activity>, Err = Traced<database::Error>>,
{
    let action = activity.action;
    if let Err(e) = db.execute(Insert(activity)).await {
        tracing::error!(%action, "failed to record `Activity`: {e}");
    }
}
