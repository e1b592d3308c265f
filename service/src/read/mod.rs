//! Read entities definitions.

pub mod activity;
pub mod booking;
pub mod car;
pub mod dashboard;
pub mod user;
