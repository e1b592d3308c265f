//! Domain definitions.

pub mod activity;
pub mod booking;
pub mod car;
pub mod payment;
pub mod user;

pub use self::{
    activity::Activity, booking::Booking, car::Car, payment::Payment,
    user::User,
};
