//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Marker type describing an entity update.
#[derive(Clone, Copy, Debug)]
pub struct Update;

/// Marker type describing a beginning of a period.
#[derive(Clone, Copy, Debug)]
pub struct Start;

/// Marker type describing an end of a period.
#[derive(Clone, Copy, Debug)]
pub struct End;

/// Marker type describing a payment.
#[derive(Clone, Copy, Debug)]
pub struct Payment;

/// Marker type describing a review.
#[derive(Clone, Copy, Debug)]
pub struct Review;

/// Marker type describing an expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Marker type describing an upfront deposit.
#[derive(Clone, Copy, Debug)]
pub struct Deposit;

/// Marker type describing a payment settling the whole amount.
#[derive(Clone, Copy, Debug)]
pub struct FullPayment;
