//! Fixtures shared by [`Service`] tests.

#![allow(dead_code, reason = "not every test uses every fixture")]

use std::{sync::LazyLock, time::Duration};

use common::{
    clock, money::Currency, operations::Insert, Date, DateTime, Money,
};
use rust_decimal::Decimal;
use service::{
    command::{self, Initiator},
    domain::{booking, car, payment, user, Booking, Car, Payment, User},
    infra::Memory,
    Command as _, Config, Service,
};

/// Moment the [`clock::Fixed`] of the [`World`] is frozen at.
pub const NOW: &str = "2024-05-01T10:00:00Z";

/// Password of every seeded [`User`].
pub const PASSWORD: &str = "s3cr3t-pass";

/// Hash of the [`PASSWORD`], computed once.
static PASSWORD_HASH: LazyLock<user::PasswordHash> = LazyLock::new(|| {
    user::PasswordHash::new(&user::Password::new(PASSWORD).unwrap()).unwrap()
});

/// [`Service`] over an in-memory store seeded with one [`User`] per role.
pub struct World {
    pub service: Service<Memory>,
    pub db: Memory,
    pub admin: User,
    pub manager: User,
    pub client: User,
}

impl World {
    /// Creates a new [`World`].
    pub async fn new() -> Self {
        let db = Memory::new();
        let service = Service::with_clock(
            config(),
            db.clone(),
            clock::Fixed(DateTime::from_rfc3339(NOW).unwrap()),
        );

        let admin = seed_user(&db, "admin", user::Role::Admin).await;
        let manager = seed_user(&db, "manager", user::Role::Manager).await;
        let client = seed_user(&db, "client", user::Role::Client).await;

        Self {
            service,
            db,
            admin,
            manager,
            client,
        }
    }

    /// Seeds another client [`User`].
    pub async fn another_client(&self, login: &str) -> User {
        seed_user(&self.db, login, user::Role::Client).await
    }

    /// Creates a [`Car`] with the provided daily rate in RWF.
    pub async fn car(&self, plate: &str, daily_rate: i64) -> Car {
        self.service
            .execute(command::CreateCar {
                brand: car::Brand::new("Toyota").unwrap(),
                model: car::Model::new("RAV4").unwrap(),
                year: car::Year::new(2021).unwrap(),
                color: car::Color::new("White"),
                plate: car::Plate::new(plate).unwrap(),
                specifications: None,
                image_url: None,
                daily_rate: rwf(daily_rate),
                initiator: initiator(&self.manager),
            })
            .await
            .unwrap()
    }

    /// Books the provided [`Car`] by the seeded client from the day after
    /// [`NOW`] for the given number of days.
    pub async fn book(&self, car: &Car, days: u8, cars: i16) -> Booking {
        self.service
            .execute(command::CreateBooking {
                car_id: car.id,
                start_date: date(2024, 5, 2).coerce(),
                end_date: date(2024, 5, 1 + days).coerce(),
                total_cars: booking::NumCars::new(cars).unwrap(),
                initiator: initiator(&self.client),
            })
            .await
            .unwrap()
    }

    /// Submits a [`Payment`] of the provided [`Booking`] by its client.
    pub async fn pay(
        &self,
        booking: &Booking,
        kind: payment::Kind,
    ) -> Payment {
        self.service
            .execute(command::SubmitPayment {
                booking_id: booking.id,
                kind,
                initiator: Initiator {
                    user_id: booking.client_id,
                    ip_address: None,
                },
            })
            .await
            .unwrap()
    }

    /// Returns the currently stored [`Car`].
    pub fn stored_car(&self, id: car::Id) -> Car {
        self.db.snapshot().unwrap().cars[&id].clone()
    }

    /// Returns the currently stored [`Booking`].
    pub fn stored_booking(&self, id: booking::Id) -> Booking {
        self.db.snapshot().unwrap().bookings[&id].clone()
    }

    /// Returns the currently stored [`Payment`].
    pub fn stored_payment(&self, id: payment::Id) -> Payment {
        self.db.snapshot().unwrap().payments[&id].clone()
    }
}

/// [`Config`] of the tested [`Service`].
pub fn config() -> Config {
    Config {
        jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(b"test"),
        jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"test"),
        session_expiration: Duration::from_secs(30 * 60),
        pickup: booking::Pickup {
            location: booking::PickupLocation::new("Kimihurura").unwrap(),
            address: booking::PickupAddress::new(
                "Kigali Cars, 14 KG 690 St, Kigali",
            )
            .unwrap(),
        },
    }
}

/// Stores a new [`User`] with the [`PASSWORD`] directly.
pub async fn seed_user(db: &Memory, login: &str, role: user::Role) -> User {
    let user = User {
        id: user::Id::new(),
        name: user::Name::new(login).unwrap(),
        login: user::Login::new(login).unwrap(),
        password_hash: PASSWORD_HASH.clone(),
        email: user::Email::new(format!("{login}@example.com")).unwrap(),
        phone: None,
        role,
        created_at: DateTime::UNIX_EPOCH.coerce(),
        deleted_at: None,
    };
    db.execute(Insert(user.clone())).await.unwrap();
    user
}

/// Returns an [`Initiator`] acting on behalf of the provided [`User`].
pub fn initiator(user: &User) -> Initiator {
    Initiator {
        user_id: user.id,
        ip_address: Some("10.0.0.7".parse().unwrap()),
    }
}

/// Returns the provided amount of RWF.
pub fn rwf(amount: i64) -> Money {
    Money {
        amount: Decimal::from(amount),
        currency: Currency::Rwf,
    }
}

/// Returns the provided calendar [`Date`].
pub fn date(year: i32, month: u8, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).unwrap()
}
