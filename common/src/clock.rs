//! [`Clock`] abstractions.

use std::fmt;

use crate::{Date, DateTime};

/// Source of the current [`DateTime`].
pub trait Clock: fmt::Debug + Send + Sync {
    /// Returns the current [`DateTime`].
    fn now(&self) -> DateTime;

    /// Returns the current UTC [`Date`].
    fn today(&self) -> Date {
        self.now().date()
    }
}

/// [`Clock`] reading the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct System;

impl Clock for System {
    fn now(&self) -> DateTime {
        DateTime::now()
    }
}

/// [`Clock`] always returning the same [`DateTime`].
#[derive(Clone, Copy, Debug)]
pub struct Fixed(pub DateTime);

impl Clock for Fixed {
    fn now(&self) -> DateTime {
        self.0
    }
}

#[cfg(test)]
mod spec {
    use crate::{Date, DateTime};

    use super::{Clock as _, Fixed};

    #[test]
    fn fixed_clock_reports_its_date() {
        let now = DateTime::from_rfc3339("2024-05-01T23:59:59Z").unwrap();
        let clock = Fixed(now);

        assert_eq!(clock.now(), now);
        assert_eq!(
            clock.today(),
            Date::from_calendar_date(2024, 5, 1).unwrap(),
        );
    }
}
