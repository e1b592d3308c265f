//! [`Booking`] definitions.
//!
//! [`Booking`] owns the whole payment state machine: the [`Status`], both
//! payment flags and the assigned [`Pickup`] change only through
//! [`Booking::apply()`]ing a [`Transition`].

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateOf, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{car, payment, user};

/// Reservation of one or more [`Car`]s for a [`Period`] by a client.
///
/// [`Car`]: crate::domain::Car
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the booked [`Car`].
    ///
    /// [`Car`]: crate::domain::Car
    pub car_id: car::Id,

    /// ID of the client [`User`] who made this [`Booking`].
    ///
    /// [`User`]: crate::domain::User
    pub client_id: user::Id,

    /// [`Period`] this [`Booking`] covers.
    pub period: Period,

    /// Number of cars booked.
    pub total_cars: NumCars,

    /// Total price of this [`Booking`], with the discount applied.
    pub total_amount: Money,

    /// Part of the [`Booking::total_amount`] to be paid upfront.
    pub deposit_amount: Money,

    /// Indicator whether the bulk discount was applied.
    pub discount_applied: bool,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`PaymentCode`] correlating this [`Booking`] with its [`Payment`]s.
    ///
    /// [`Payment`]: crate::domain::Payment
    pub payment_code: PaymentCode,

    /// [`DateTime`] when the deposit was approved, if it was.
    pub deposit_paid_at: Option<DepositDateTime>,

    /// [`DateTime`] when the full payment was approved, if it was.
    pub full_payment_paid_at: Option<FullPaymentDateTime>,

    /// [`Pickup`] assigned once the full payment is approved.
    pub pickup: Option<Pickup>,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Booking`] was updated last time.
    pub updated_at: UpdateDateTime,
}

impl Booking {
    /// Indicates whether the deposit of this [`Booking`] is paid.
    #[must_use]
    pub fn deposit_paid(&self) -> bool {
        self.deposit_paid_at.is_some()
    }

    /// Indicates whether this [`Booking`] is paid in full.
    #[must_use]
    pub fn full_payment_paid(&self) -> bool {
        self.full_payment_paid_at.is_some()
    }

    /// Indicates whether this [`Booking`] doesn't accept payments anymore.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.status, Status::Rejected | Status::Completed)
    }

    /// Returns the amount a [`payment::Kind`] of payment must carry.
    ///
    /// Full payment covers everything left after the deposit.
    #[must_use]
    pub fn amount_due(&self, kind: payment::Kind) -> Money {
        match kind {
            payment::Kind::Deposit => self.deposit_amount,
            payment::Kind::Full => Money {
                amount: self.total_amount.amount - self.deposit_amount.amount,
                currency: self.total_amount.currency,
            },
        }
    }

    /// Verifies the pricing invariants of this [`Booking`].
    ///
    /// # Errors
    ///
    /// With [`Inconsistent`] if the stored amounts disagree with the pricing
    /// policy.
    pub fn check_pricing(&self) -> Result<(), Inconsistent> {
        let expected_deposit = Money {
            amount: Quote::DEPOSIT_RATE.of(self.total_amount.amount),
            currency: self.total_amount.currency,
        }
        .round();
        let expected_discount =
            i16::from(self.total_cars) >= Quote::BULK_THRESHOLD;

        if self.deposit_amount != expected_deposit
            || self.discount_applied != expected_discount
        {
            return Err(Inconsistent(self.id));
        }
        Ok(())
    }

    /// Applies the provided [`Transition`] to this [`Booking`] at the given
    /// moment.
    ///
    /// Returns whether anything has changed: replaying an already applied
    /// [`Transition`] is a no-op.
    ///
    /// # Errors
    ///
    /// With [`TransitionError`] if the [`Transition`] is not allowed in the
    /// current [`Status`]. Nothing is changed in such case.
    pub fn apply(
        &mut self,
        transition: Transition,
        at: UpdateDateTime,
    ) -> Result<bool, TransitionError> {
        use Status as S;
        use Transition as T;
        use TransitionError as E;

        let changed = match transition {
            T::DepositApproved => {
                if self.deposit_paid() {
                    false
                } else if self.is_closed() {
                    return Err(E::Closed(self.status));
                } else {
                    self.deposit_paid_at = Some(at.coerce());
                    true
                }
            }
            T::FullPaymentApproved(pickup) => {
                if self.is_closed() {
                    if self.full_payment_paid() {
                        false
                    } else {
                        return Err(E::Closed(self.status));
                    }
                } else {
                    let was_paid = self.full_payment_paid();
                    let was_approved = self.status == S::Approved;
                    let had_pickup = self.pickup.as_ref() == Some(&pickup);
                    if !was_paid {
                        self.full_payment_paid_at = Some(at.coerce());
                    }
                    self.status = S::Approved;
                    self.pickup = Some(pickup);
                    !(was_paid && was_approved && had_pickup)
                }
            }
            T::DepositRevoked => self.deposit_paid_at.take().is_some(),
            T::FullPaymentRevoked => {
                let revoked = self.full_payment_paid_at.take().is_some();
                if revoked {
                    self.pickup = None;
                    if self.status == S::Approved {
                        self.status = S::Pending;
                    }
                }
                revoked
            }
            T::Cancelled => match self.status {
                S::Pending | S::Approved => {
                    self.status = S::Rejected;
                    true
                }
                S::Rejected => false,
                S::Completed => return Err(E::Closed(self.status)),
            },
            T::Completed => match self.status {
                S::Approved => {
                    self.status = S::Completed;
                    true
                }
                S::Completed => false,
                S::Pending | S::Rejected => {
                    return Err(E::NotApproved(self.status))
                }
            },
        };

        if changed {
            self.updated_at = at;
        }
        Ok(changed)
    }
}

/// Change of a [`Booking`] state requested by another component.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Transition {
    /// Deposit payment has been approved.
    DepositApproved,

    /// Full payment has been approved, so the [`Booking`] is confirmed at the
    /// provided [`Pickup`].
    FullPaymentApproved(Pickup),

    /// Deposit payment has been rejected.
    DepositRevoked,

    /// Full payment has been rejected.
    FullPaymentRevoked,

    /// [`Booking`] has been cancelled by the staff.
    Cancelled,

    /// [`Booking`] has been fulfilled.
    Completed,
}

impl Transition {
    /// Returns the [`Transition`] caused by approving a payment of the
    /// provided [`payment::Kind`].
    #[must_use]
    pub fn approval(kind: payment::Kind, pickup: &Pickup) -> Self {
        match kind {
            payment::Kind::Deposit => Self::DepositApproved,
            payment::Kind::Full => Self::FullPaymentApproved(pickup.clone()),
        }
    }

    /// Returns the [`Transition`] caused by rejecting a payment of the
    /// provided [`payment::Kind`].
    #[must_use]
    pub fn revocation(kind: payment::Kind) -> Self {
        match kind {
            payment::Kind::Deposit => Self::DepositRevoked,
            payment::Kind::Full => Self::FullPaymentRevoked,
        }
    }
}

/// Error of applying a [`Transition`] to a [`Booking`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum TransitionError {
    /// [`Booking`] is closed already.
    #[display("`Booking` is closed as `{_0}`")]
    Closed(#[error(not(source))] Status),

    /// [`Booking`] is not approved, so cannot be completed.
    #[display("`Booking` in `{_0}` status cannot be completed")]
    NotApproved(#[error(not(source))] Status),
}

/// Error of a [`Booking`] violating its pricing invariants.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("`Booking(id: {_0})` has inconsistent pricing")]
pub struct Inconsistent(#[error(not(source))] pub Id);

/// Price of a [`Booking`] calculated before creating it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Quote {
    /// Number of days charged, both ends of a [`Period`] included.
    pub days: i64,

    /// Price before the discount.
    pub subtotal: Money,

    /// Discount subtracted from the [`Quote::subtotal`].
    pub discount: Money,

    /// Price to be paid.
    pub total_amount: Money,

    /// Part of the [`Quote::total_amount`] to be paid upfront.
    pub deposit_amount: Money,

    /// Indicator whether the bulk discount was applied.
    pub discount_applied: bool,
}

impl Quote {
    /// Share of the total amount paid as a deposit.
    pub const DEPOSIT_RATE: Percent = Percent::whole(20);

    /// Discount applied to bookings of [`Quote::BULK_THRESHOLD`] or more
    /// cars.
    pub const BULK_DISCOUNT: Percent = Percent::whole(20);

    /// Number of cars starting from which [`Quote::BULK_DISCOUNT`] applies.
    pub const BULK_THRESHOLD: i16 = 3;

    /// Calculates a [`Quote`] of booking `total_cars` with the provided
    /// `daily_rate` for the given [`Period`].
    #[must_use]
    pub fn calculate(
        daily_rate: Money,
        period: &Period,
        total_cars: NumCars,
    ) -> Self {
        let currency = daily_rate.currency;
        let days = period.days();
        let cars = i16::from(total_cars);

        let subtotal = Money {
            amount: daily_rate.amount
                * Decimal::from(days)
                * Decimal::from(cars),
            currency,
        };
        let discount_applied = cars >= Self::BULK_THRESHOLD;
        let discount = if discount_applied {
            Money {
                amount: Self::BULK_DISCOUNT.of(subtotal.amount),
                currency,
            }
            .round()
        } else {
            Money::zero(currency)
        };
        let total_amount = Money {
            amount: subtotal.amount - discount.amount,
            currency,
        };
        let deposit_amount = Money {
            amount: Self::DEPOSIT_RATE.of(total_amount.amount),
            currency,
        }
        .round();

        Self {
            days,
            subtotal,
            discount,
            total_amount,
            deposit_amount,
            discount_applied,
        }
    }
}

/// ID of a [`Booking`].
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

/// Range of days a [`Booking`] covers, both ends included.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Period {
    /// First day of this [`Period`].
    start: StartDate,

    /// Last day of this [`Period`].
    end: EndDate,
}

impl Period {
    /// Creates a new [`Period`] starting not earlier than `today`.
    ///
    /// # Errors
    ///
    /// With [`PeriodError`] if the dates are out of order or in the past.
    pub fn new(
        start: StartDate,
        end: EndDate,
        today: Date,
    ) -> Result<Self, PeriodError> {
        if start.coerce::<()>() < today {
            return Err(PeriodError::StartInPast(start));
        }
        if end.days_since(&start) <= 0 {
            return Err(PeriodError::EndNotAfterStart(end));
        }
        Ok(Self { start, end })
    }

    /// Creates a new [`Period`] without checking its dates.
    ///
    /// # Safety
    ///
    /// The `end` must be later than the `start`.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(start: StartDate, end: EndDate) -> Self {
        Self { start, end }
    }

    /// Returns the first day of this [`Period`].
    #[must_use]
    pub const fn start(&self) -> StartDate {
        self.start
    }

    /// Returns the last day of this [`Period`].
    #[must_use]
    pub const fn end(&self) -> EndDate {
        self.end
    }

    /// Returns the number of days in this [`Period`], both ends included.
    #[must_use]
    pub fn days(&self) -> i64 {
        self.end.days_since(&self.start) + 1
    }
}

/// Error of creating a [`Period`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum PeriodError {
    /// Start date is in the past.
    #[display("start date `{_0}` is in the past")]
    StartInPast(#[error(not(source))] StartDate),

    /// End date is not later than the start date.
    #[display("end date `{_0}` must be later than the start date")]
    EndNotAfterStart(#[error(not(source))] EndDate),
}

/// Number of cars in a [`Booking`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct NumCars(i16);

impl NumCars {
    /// Creates a new [`NumCars`] if the given `num` is at least `1`.
    #[must_use]
    pub fn new(num: impl TryInto<i16>) -> Option<Self> {
        let num = num.try_into().ok()?;
        (num >= 1).then_some(Self(num))
    }
}

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "Waiting for the full payment."]
        Pending = 1,

        #[doc = "Paid in full and confirmed."]
        Approved = 2,

        #[doc = "Cancelled by the staff."]
        Rejected = 3,

        #[doc = "Fulfilled."]
        Completed = 4,
    }
}

/// Token correlating a [`Booking`] with its [`Payment`]s.
///
/// [`Payment`]: crate::domain::Payment
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct PaymentCode(String);

impl PaymentCode {
    /// Prefix of every [`PaymentCode`].
    const PREFIX: &'static str = "PAY-";

    /// Generates a new random [`PaymentCode`].
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{}{:X}", Self::PREFIX, Uuid::new_v4().simple()))
    }

    /// Creates a new [`PaymentCode`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given `code` is a valid [`PaymentCode`].
    fn check(code: impl AsRef<str>) -> bool {
        code.as_ref().strip_prefix(Self::PREFIX).is_some_and(|token| {
            token.len() == 32
                && token
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        })
    }
}

impl FromStr for PaymentCode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `PaymentCode`")
    }
}

/// Place where booked cars are handed over to a client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pickup {
    /// Short name of the location.
    pub location: PickupLocation,

    /// Full address of the location.
    pub address: PickupAddress,
}

/// Short name of a [`Pickup`] location.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct PickupLocation(String);

impl PickupLocation {
    /// Creates a new [`PickupLocation`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (name.trim() == name && !name.is_empty() && name.len() <= 256)
            .then_some(Self(name))
    }
}

/// Full address of a [`Pickup`] location.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct PickupAddress(String);

impl PickupAddress {
    /// Creates a new [`PickupAddress`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        let valid = address.trim() == address
            && !address.is_empty()
            && address.len() <= 512;
        valid.then_some(Self(address))
    }
}

/// First day of a [`Period`].
pub type StartDate = DateOf<(Booking, unit::Start)>;

/// Last day of a [`Period`].
pub type EndDate = DateOf<(Booking, unit::End)>;

/// [`DateTime`] when a [`Booking`] deposit was approved.
pub type DepositDateTime = DateTimeOf<(Booking, unit::Deposit)>;

/// [`DateTime`] when a [`Booking`] full payment was approved.
pub type FullPaymentDateTime = DateTimeOf<(Booking, unit::FullPayment)>;

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a [`Booking`] was updated.
pub type UpdateDateTime = DateTimeOf<(Booking, unit::Update)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{car, payment, user};

    use super::{
        Booking, Id, NumCars, PaymentCode, Period, PeriodError, Pickup,
        PickupAddress, PickupLocation, Quote, Status, Transition,
        TransitionError,
    };

    fn rwf(amount: i64) -> Money {
        Money {
            amount: Decimal::from(amount),
            currency: Currency::Rwf,
        }
    }

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn period(start: &str, end: &str) -> Period {
        Period::new(
            date(start).coerce(),
            date(end).coerce(),
            date("2024-05-01"),
        )
        .unwrap()
    }

    fn pickup() -> Pickup {
        Pickup {
            location: PickupLocation::new("Kimihurura").unwrap(),
            address: PickupAddress::new("Kigali Cars, 14 KG 690 St, Kigali")
                .unwrap(),
        }
    }

    fn booking(cars: i16) -> Booking {
        let period = period("2024-05-10", "2024-05-12");
        let total_cars = NumCars::new(cars).unwrap();
        let quote = Quote::calculate(rwf(10_000), &period, total_cars);
        Booking {
            id: Id::new(),
            car_id: car::Id::new(),
            client_id: user::Id::new(),
            period,
            total_cars,
            total_amount: quote.total_amount,
            deposit_amount: quote.deposit_amount,
            discount_applied: quote.discount_applied,
            status: Status::Pending,
            payment_code: PaymentCode::generate(),
            deposit_paid_at: None,
            full_payment_paid_at: None,
            pickup: None,
            created_at: DateTime::UNIX_EPOCH.coerce(),
            updated_at: DateTime::UNIX_EPOCH.coerce(),
        }
    }

    fn now() -> DateTime {
        DateTime::from_rfc3339("2024-05-02T12:00:00Z").unwrap()
    }

    #[test]
    fn quotes_single_car() {
        let quote = Quote::calculate(
            rwf(10_000),
            &period("2024-05-10", "2024-05-12"),
            NumCars::new(1).unwrap(),
        );

        assert_eq!(quote.days, 3);
        assert_eq!(quote.subtotal, rwf(30_000));
        assert!(!quote.discount_applied);
        assert_eq!(quote.discount, rwf(0));
        assert_eq!(quote.total_amount, rwf(30_000));
        assert_eq!(quote.deposit_amount, rwf(6_000));
    }

    #[test]
    fn quotes_bulk_discount() {
        let quote = Quote::calculate(
            rwf(10_000),
            &period("2024-05-10", "2024-05-12"),
            NumCars::new(3).unwrap(),
        );

        assert_eq!(quote.subtotal, rwf(90_000));
        assert!(quote.discount_applied);
        assert_eq!(quote.discount, rwf(18_000));
        assert_eq!(quote.total_amount, rwf(72_000));
        assert_eq!(quote.deposit_amount, rwf(14_400));
    }

    #[test]
    fn quote_keeps_pricing_invariants() {
        for cars in 1..=6 {
            for rate in ["0.01", "999.99", "12345.67", "10000"] {
                let daily_rate = Money {
                    amount: rate.parse().unwrap(),
                    currency: Currency::Usd,
                };
                let quote = Quote::calculate(
                    daily_rate,
                    &period("2024-05-01", "2024-05-08"),
                    NumCars::new(cars).unwrap(),
                );

                assert_eq!(quote.discount_applied, cars >= 3);
                let expected_total = if cars >= 3 {
                    (quote.subtotal.amount * Decimal::new(8, 1)).round_dp(2)
                } else {
                    quote.subtotal.amount
                };
                assert_eq!(quote.total_amount.amount, expected_total);
                assert_eq!(
                    quote.deposit_amount.amount,
                    (quote.total_amount.amount * Decimal::new(2, 1))
                        .round_dp(2),
                );
            }
        }
    }

    #[test]
    fn validates_period() {
        let today = date("2024-05-01");

        assert!(matches!(
            Period::new(
                date("2024-04-30").coerce(),
                date("2024-05-03").coerce(),
                today,
            ),
            Err(PeriodError::StartInPast(_)),
        ));
        assert!(matches!(
            Period::new(
                date("2024-05-03").coerce(),
                date("2024-05-03").coerce(),
                today,
            ),
            Err(PeriodError::EndNotAfterStart(_)),
        ));
        assert!(matches!(
            Period::new(
                date("2024-05-03").coerce(),
                date("2024-05-02").coerce(),
                today,
            ),
            Err(PeriodError::EndNotAfterStart(_)),
        ));

        let starting_today = Period::new(
            date("2024-05-01").coerce(),
            date("2024-05-02").coerce(),
            today,
        )
        .unwrap();
        assert_eq!(starting_today.days(), 2);
    }

    #[test]
    fn rejects_zero_cars() {
        assert!(NumCars::new(0).is_none());
        assert!(NumCars::new(-1).is_none());
        assert!(NumCars::new(100_000).is_none());
    }

    #[test]
    fn generates_unique_payment_codes() {
        let a = PaymentCode::generate();
        let b = PaymentCode::generate();

        assert_ne!(a, b);
        assert!(AsRef::<str>::as_ref(&a).starts_with("PAY-"));
        assert_eq!(PaymentCode::new(a.to_string()), Some(a.clone()));
        assert!(PaymentCode::new("PAY202405011200001234").is_none());
        assert!(PaymentCode::new(a.to_string().to_lowercase()).is_none());
    }

    #[test]
    fn checks_pricing() {
        let mut bulk = booking(3);
        assert!(bulk.check_pricing().is_ok());

        bulk.deposit_amount = rwf(14_000);
        assert!(bulk.check_pricing().is_err());

        let mut single = booking(1);
        single.discount_applied = true;
        assert!(single.check_pricing().is_err());
    }

    #[test]
    fn amounts_due() {
        let booking = booking(1);

        assert_eq!(booking.amount_due(payment::Kind::Deposit), rwf(6_000));
        assert_eq!(booking.amount_due(payment::Kind::Full), rwf(24_000));
    }

    #[test]
    fn full_payment_approval_confirms_booking() {
        let mut booking = booking(1);

        let changed = booking
            .apply(Transition::FullPaymentApproved(pickup()), now().coerce())
            .unwrap();

        assert!(changed);
        assert_eq!(booking.status, Status::Approved);
        assert!(booking.full_payment_paid());
        assert_eq!(booking.full_payment_paid_at, Some(now().coerce()));
        assert_eq!(booking.pickup, Some(pickup()));
        assert_eq!(booking.updated_at, now().coerce());

        let replayed = booking
            .apply(Transition::FullPaymentApproved(pickup()), now().coerce())
            .unwrap();
        assert!(!replayed);
    }

    #[test]
    fn deposit_revocation_clears_flag() {
        let mut booking = booking(1);
        _ = booking
            .apply(Transition::DepositApproved, now().coerce())
            .unwrap();
        assert!(booking.deposit_paid());

        assert!(booking
            .apply(Transition::DepositRevoked, now().coerce())
            .unwrap());
        assert!(!booking.deposit_paid());
        assert_eq!(booking.deposit_paid_at, None);
    }

    #[test]
    fn revoking_unset_flag_is_noop() {
        let mut booking = booking(1);
        let before = booking.updated_at;

        assert!(!booking
            .apply(Transition::DepositRevoked, now().coerce())
            .unwrap());
        assert!(!booking
            .apply(Transition::FullPaymentRevoked, now().coerce())
            .unwrap());
        assert_eq!(booking.status, Status::Pending);
        assert_eq!(booking.updated_at, before);
    }

    #[test]
    fn full_payment_revocation_falls_back_to_pending() {
        let mut booking = booking(1);
        _ = booking
            .apply(Transition::FullPaymentApproved(pickup()), now().coerce())
            .unwrap();

        assert!(booking
            .apply(Transition::FullPaymentRevoked, now().coerce())
            .unwrap());
        assert_eq!(booking.status, Status::Pending);
        assert!(!booking.full_payment_paid());
        assert_eq!(booking.pickup, None);
    }

    #[test]
    fn closed_booking_refuses_new_approvals() {
        let mut booking = booking(1);
        _ = booking.apply(Transition::Cancelled, now().coerce()).unwrap();
        assert_eq!(booking.status, Status::Rejected);

        assert!(matches!(
            booking.apply(Transition::DepositApproved, now().coerce()),
            Err(TransitionError::Closed(Status::Rejected)),
        ));
        assert!(matches!(
            booking.apply(
                Transition::FullPaymentApproved(pickup()),
                now().coerce(),
            ),
            Err(TransitionError::Closed(Status::Rejected)),
        ));
        assert!(!booking.deposit_paid());
    }

    #[test]
    fn completes_only_approved_booking() {
        let mut booking = booking(1);
        assert!(matches!(
            booking.apply(Transition::Completed, now().coerce()),
            Err(TransitionError::NotApproved(Status::Pending)),
        ));

        _ = booking
            .apply(Transition::FullPaymentApproved(pickup()), now().coerce())
            .unwrap();
        assert!(booking.apply(Transition::Completed, now().coerce()).unwrap());
        assert_eq!(booking.status, Status::Completed);

        assert!(!booking.apply(Transition::Completed, now().coerce()).unwrap());
        assert!(matches!(
            booking.apply(Transition::Cancelled, now().coerce()),
            Err(TransitionError::Closed(Status::Completed)),
        ));
    }
}
