//! [`Command`] for submitting a [`Payment`] of a [`Booking`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        activity, booking, payment, user, Activity, Booking, Payment, User,
    },
    infra::{database, Database},
    Service,
};

use super::{record, Command, Initiator};

/// [`Command`] for a client reporting a [`Payment`] of their [`Booking`].
///
/// The [`Payment`] stays [`payment::Status::Pending`] until reviewed.
#[derive(Clone, Copy, Debug)]
pub struct SubmitPayment {
    /// ID of the [`Booking`] being paid.
    pub booking_id: booking::Id,

    /// [`payment::Kind`] of the [`Payment`].
    pub kind: payment::Kind,

    /// [`Initiator`] of this [`Command`], being the client.
    pub initiator: Initiator,
}

impl<Db> Command<SubmitPayment> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<Activity>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Payment>, booking::Id>>,
            Ok = Vec<Payment>,
            Err = Traced<database::Error>,
        > + Database<Insert<Payment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Payment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitPayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitPayment {
            booking_id,
            kind,
            initiator,
        } = cmd;

        let client = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(initiator.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|u| u.can(user::Capability::Book))
            .ok_or(E::NotPermitted(initiator.user_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid submitting into a `Booking` being cancelled concurrently.
        tx.execute(Lock(By::<Booking, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;
        if booking.client_id != client.id {
            return Err(tracerr::new!(E::NotPermitted(client.id)));
        }
        if booking.is_closed() {
            return Err(tracerr::new!(E::BookingClosed(booking.status)));
        }
        if let Err(e) = booking.check_pricing() {
            tracing::error!(
                booking.id = %booking.id,
                total = %booking.total_amount,
                deposit = %booking.deposit_amount,
                "refusing payment: {e}",
            );
            return Err(tracerr::new!(E::Inconsistent(e)));
        }

        // One `Payment` of a kind at a time, until it's rejected.
        let is_paid = match kind {
            payment::Kind::Deposit => booking.deposit_paid(),
            payment::Kind::Full => booking.full_payment_paid(),
        };
        let is_submitted = is_paid
            || tx
                .execute(Select(By::<Vec<Payment>, _>::new(booking_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .iter()
                .any(|p| {
                    p.kind == kind && p.status != payment::Status::Rejected
                });
        if is_submitted {
            return Err(tracerr::new!(E::AlreadySubmitted(kind)));
        }

        let now = self.clock().now();
        let payment = Payment {
            id: payment::Id::new(),
            booking_id,
            amount: booking.amount_due(kind),
            kind,
            payment_code: booking.payment_code.clone(),
            status: payment::Status::Pending,
            paid_at: now.coerce(),
            approved_by: None,
            approved_at: None,
            created_at: now.coerce(),
        };

        tx.execute(Insert(payment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        record(
            self.database(),
            Activity::new(
                Some(client.id),
                activity::Action::PaymentSubmitted,
                format!(
                    "{} submitted {} payment of {} for booking {}",
                    client.login, payment.kind, payment.amount,
                    payment.payment_code,
                ),
                initiator.ip_address,
                now.coerce(),
            ),
        )
        .await;

        Ok(payment)
    }
}

/// Error of [`SubmitPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Payment`] of the same [`payment::Kind`] is pending or approved.
    #[display("`{_0}` payment is submitted already")]
    #[from(ignore)]
    AlreadySubmitted(#[error(not(source))] payment::Kind),

    /// [`Booking`] doesn't accept payments anymore.
    #[display("`Booking` is closed as `{_0}`")]
    #[from(ignore)]
    BookingClosed(#[error(not(source))] booking::Status),

    /// [`Booking`] doesn't exist.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Booking`] pricing is broken.
    #[display("{_0}")]
    Inconsistent(booking::Inconsistent),

    /// [`Initiator`] is not the client of the [`Booking`].
    #[display("`User(id: {_0})` is not permitted to pay for the `Booking`")]
    #[from(ignore)]
    NotPermitted(#[error(not(source))] user::Id),
}
