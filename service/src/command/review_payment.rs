//! [`Command`]s for reviewing a [`Payment`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
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

/// [`Command`] for a manager reviewing a submitted [`Payment`].
///
/// Requests the corresponding [`booking::Transition`] of the paid
/// [`Booking`] in the same transaction. Repeating a review reconciles the
/// [`Booking`] with the [`Payment`].
#[derive(Clone, Copy, Debug)]
pub struct ReviewPayment {
    /// ID of the [`Payment`] to review.
    pub payment_id: payment::Id,

    /// [`payment::Verdict`] of the review.
    pub verdict: payment::Verdict,

    /// [`Initiator`] of this [`Command`], being the reviewer.
    pub initiator: Initiator,
}

/// [`Command`] for approving a [`Payment`].
///
/// Shortcut for [`ReviewPayment`] with [`payment::Verdict::Approve`].
#[derive(Clone, Copy, Debug)]
pub struct ApprovePayment {
    /// ID of the [`Payment`] to approve.
    pub payment_id: payment::Id,

    /// [`Initiator`] of this [`Command`].
    pub initiator: Initiator,
}

/// [`Command`] for rejecting a [`Payment`].
///
/// Shortcut for [`ReviewPayment`] with [`payment::Verdict::Reject`].
#[derive(Clone, Copy, Debug)]
pub struct RejectPayment {
    /// ID of the [`Payment`] to reject.
    pub payment_id: payment::Id,

    /// [`Initiator`] of this [`Command`].
    pub initiator: Initiator,
}

/// Output of reviewing a [`Payment`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Reviewed [`Payment`].
    pub payment: Payment,

    /// [`Booking`] the reviewed [`Payment`] belongs to.
    pub booking: Booking,
}

impl<Db> Command<ReviewPayment> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<Activity>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Payment, payment::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Payment>, payment::Id>>,
            Ok = Option<Payment>,
            Err = Traced<database::Error>,
        > + Database<
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
        > + Database<Update<Payment>, Err = Traced<database::Error>>
        + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ReviewPayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReviewPayment {
            payment_id,
            verdict,
            initiator,
        } = cmd;

        let reviewer = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(initiator.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|u| u.can(user::Capability::ReviewPayments))
            .ok_or(E::NotPermitted(initiator.user_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent reviews of the same `Payment`.
        tx.execute(Lock(By::<Payment, _>::new(payment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut payment = tx
            .execute(Select(By::<Option<Payment>, _>::new(payment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PaymentNotExists(payment_id))
            .map_err(tracerr::wrap!())?;

        // Avoid concurrent transitions of the same `Booking`.
        tx.execute(Lock(By::<Booking, _>::new(payment.booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(payment.booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(payment.booking_id))
            .map_err(tracerr::wrap!())?;

        let now = self.clock().now();
        let transition = match verdict {
            payment::Verdict::Approve => Some(booking::Transition::approval(
                payment.kind,
                &self.config().pickup,
            )),
            payment::Verdict::Reject => {
                // Another approved `Payment` still covers the flag.
                let is_covered = tx
                    .execute(Select(By::<Vec<Payment>, _>::new(booking.id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .iter()
                    .any(|p| {
                        p.id != payment.id
                            && p.kind == payment.kind
                            && p.status == payment::Status::Approved
                    });
                (!is_covered)
                    .then(|| booking::Transition::revocation(payment.kind))
            }
        };
        let booking_changed = match transition {
            Some(t) => booking
                .apply(t, now.coerce())
                .map_err(tracerr::from_and_wrap!(=> E))?,
            None => false,
        };
        _ = payment.review(verdict, reviewer.id, now.coerce());

        tx.execute(Update(payment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        if booking_changed {
            tx.execute(Update(booking.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let action = match verdict {
            payment::Verdict::Approve => activity::Action::PaymentApproved,
            payment::Verdict::Reject => activity::Action::PaymentRejected,
        };
        record(
            self.database(),
            Activity::new(
                Some(reviewer.id),
                action,
                format!(
                    "{} {} {} payment of {} by client {} for booking {}",
                    reviewer.login,
                    verdict,
                    payment.kind,
                    payment.amount,
                    booking.client_id,
                    booking.payment_code,
                ),
                initiator.ip_address,
                now.coerce(),
            ),
        )
        .await;

        Ok(Output { payment, booking })
    }
}

impl<Db> Command<ApprovePayment> for Service<Db>
where
    Self: Command<ReviewPayment, Ok = Output, Err = Traced<ExecutionError>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ApprovePayment,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(ReviewPayment {
            payment_id: cmd.payment_id,
            verdict: payment::Verdict::Approve,
            initiator: cmd.initiator,
        })
        .await
    }
}

impl<Db> Command<RejectPayment> for Service<Db>
where
    Self: Command<ReviewPayment, Ok = Output, Err = Traced<ExecutionError>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RejectPayment,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(ReviewPayment {
            payment_id: cmd.payment_id,
            verdict: payment::Verdict::Reject,
            initiator: cmd.initiator,
        })
        .await
    }
}

/// Error of [`ReviewPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] of the [`Payment`] doesn't exist.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Initiator`] is not permitted to review payments.
    #[display("`User(id: {_0})` is not permitted to review payments")]
    #[from(ignore)]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`Payment`] doesn't exist.
    #[display("`Payment(id: {_0})` does not exist")]
    #[from(ignore)]
    PaymentNotExists(#[error(not(source))] payment::Id),

    /// [`Booking`] cannot follow the review.
    #[display("Cannot update `Booking`: {_0}")]
    Transition(booking::TransitionError),
}
