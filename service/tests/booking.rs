mod support;

use common::money::Currency;
use service::{
    command::{self, cancel_booking, complete_booking, create_booking},
    domain::{activity, booking, payment},
    infra::memory::Table,
    Command as _,
};

use self::support::{date, initiator, rwf, World};

#[tokio::test]
async fn prices_single_car_booking() {
    let world = World::new().await;
    let car = world.car("RAC 001 A", 10_000).await;

    let booking = world.book(&car, 3, 1).await;

    assert_eq!(booking.period.days(), 3);
    assert_eq!(booking.total_amount, rwf(30_000));
    assert_eq!(booking.deposit_amount, rwf(6_000));
    assert!(!booking.discount_applied);
    assert_eq!(booking.total_amount.currency, Currency::Rwf);
    assert_eq!(booking.status, booking::Status::Pending);
    assert!(booking.payment_code.to_string().starts_with("PAY-"));
    assert!(!booking.deposit_paid());
    assert!(!booking.full_payment_paid());
    assert!(booking.pickup.is_none());

    assert!(!world.stored_car(car.id).is_available);
    assert_eq!(world.stored_booking(booking.id).client_id, world.client.id);
}

#[tokio::test]
async fn discounts_bulk_booking() {
    let world = World::new().await;
    let car = world.car("RAC 002 A", 10_000).await;

    let booking = world.book(&car, 3, 3).await;

    assert!(booking.discount_applied);
    assert_eq!(booking.total_amount, rwf(72_000));
    assert_eq!(booking.deposit_amount, rwf(14_400));
    assert!(booking.check_pricing().is_ok());
}

#[tokio::test]
async fn records_booking_creation() {
    let world = World::new().await;
    let car = world.car("RAC 003 A", 10_000).await;

    let booking = world.book(&car, 3, 1).await;

    let state = world.db.snapshot().unwrap();
    let logged = state
        .activities
        .values()
        .filter(|a| a.action == activity::Action::BookingCreated)
        .collect::<Vec<_>>();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].user_id, Some(world.client.id));
    assert!(logged[0].ip_address.is_some());
    assert!(logged[0].details.to_string().contains("30000RWF"));
    assert!(state.bookings.contains_key(&booking.id));
}

#[tokio::test]
async fn refuses_unavailable_car() {
    let world = World::new().await;
    let car = world.car("RAC 004 A", 10_000).await;
    _ = world.book(&car, 3, 1).await;
    let before = world.db.snapshot().unwrap();

    let err = world
        .service
        .execute(command::CreateBooking {
            car_id: car.id,
            start_date: date(2024, 5, 10).coerce(),
            end_date: date(2024, 5, 12).coerce(),
            total_cars: booking::NumCars::new(1).unwrap(),
            initiator: initiator(&world.client),
        })
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(err, create_booking::ExecutionError::CarUnavailable(_)),
        "unexpected error: {err}",
    );
    let after = world.db.snapshot().unwrap();
    assert_eq!(after.bookings.len(), before.bookings.len());
    assert_eq!(after.activities.len(), before.activities.len());
}

#[tokio::test]
async fn refuses_invalid_period() {
    let world = World::new().await;
    let car = world.car("RAC 005 A", 10_000).await;

    for (start, end) in [
        (date(2024, 4, 30), date(2024, 5, 3)),
        (date(2024, 5, 3), date(2024, 5, 3)),
        (date(2024, 5, 4), date(2024, 5, 3)),
    ] {
        let err = world
            .service
            .execute(command::CreateBooking {
                car_id: car.id,
                start_date: start.coerce(),
                end_date: end.coerce(),
                total_cars: booking::NumCars::new(1).unwrap(),
                initiator: initiator(&world.client),
            })
            .await
            .unwrap_err()
            .into_inner();

        assert!(
            matches!(err, create_booking::ExecutionError::InvalidPeriod(_)),
            "unexpected error: {err}",
        );
    }
    assert!(world.stored_car(car.id).is_available);
}

#[tokio::test]
async fn books_starting_today() {
    let world = World::new().await;
    let car = world.car("RAC 006 A", 10_000).await;

    let booking = world
        .service
        .execute(command::CreateBooking {
            car_id: car.id,
            start_date: date(2024, 5, 1).coerce(),
            end_date: date(2024, 5, 2).coerce(),
            total_cars: booking::NumCars::new(1).unwrap(),
            initiator: initiator(&world.client),
        })
        .await
        .unwrap();

    assert_eq!(booking.total_amount, rwf(20_000));
}

#[tokio::test]
async fn only_clients_book() {
    let world = World::new().await;
    let car = world.car("RAC 007 A", 10_000).await;

    for staff in [&world.manager, &world.admin] {
        let err = world
            .service
            .execute(command::CreateBooking {
                car_id: car.id,
                start_date: date(2024, 5, 2).coerce(),
                end_date: date(2024, 5, 3).coerce(),
                total_cars: booking::NumCars::new(1).unwrap(),
                initiator: initiator(staff),
            })
            .await
            .unwrap_err()
            .into_inner();

        assert!(
            matches!(err, create_booking::ExecutionError::NotPermitted(_)),
            "unexpected error: {err}",
        );
    }
}

#[tokio::test]
async fn rolls_back_reservation_on_failed_insert() {
    let world = World::new().await;
    let car = world.car("RAC 008 A", 10_000).await;
    world.db.break_writes(Table::Bookings);

    let err = world
        .service
        .execute(command::CreateBooking {
            car_id: car.id,
            start_date: date(2024, 5, 2).coerce(),
            end_date: date(2024, 5, 4).coerce(),
            total_cars: booking::NumCars::new(1).unwrap(),
            initiator: initiator(&world.client),
        })
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(err, create_booking::ExecutionError::Db(_)),
        "unexpected error: {err}",
    );
    assert!(world.stored_car(car.id).is_available);
    assert!(world.db.snapshot().unwrap().bookings.is_empty());

    world.db.repair_writes(Table::Bookings);
    let booking = world.book(&car, 3, 1).await;
    assert_eq!(booking.total_amount, rwf(30_000));
}

#[tokio::test]
async fn survives_failed_activity_log() {
    let world = World::new().await;
    let car = world.car("RAC 009 A", 10_000).await;
    world.db.break_writes(Table::Activities);

    let booking = world.book(&car, 3, 1).await;

    let state = world.db.snapshot().unwrap();
    assert!(state.bookings.contains_key(&booking.id));
    assert!(!state
        .activities
        .values()
        .any(|a| a.action == activity::Action::BookingCreated));
}

#[tokio::test]
async fn cancels_booking_and_releases_car() {
    let world = World::new().await;
    let car = world.car("RAC 010 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;

    let cancelled = world
        .service
        .execute(command::CancelBooking {
            booking_id: booking.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();

    assert_eq!(cancelled.status, booking::Status::Rejected);
    assert_eq!(
        world.stored_booking(booking.id).status,
        booking::Status::Rejected,
    );
    assert!(world.stored_car(car.id).is_available);

    let again = world
        .service
        .execute(command::CancelBooking {
            booking_id: booking.id,
            initiator: initiator(&world.admin),
        })
        .await
        .unwrap();
    assert_eq!(again.status, booking::Status::Rejected);

    let err = world
        .service
        .execute(command::CancelBooking {
            booking_id: booking.id,
            initiator: initiator(&world.client),
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(
        matches!(err, cancel_booking::ExecutionError::NotPermitted(_)),
        "unexpected error: {err}",
    );
}

#[tokio::test]
async fn completes_only_approved_booking() {
    let world = World::new().await;
    let car = world.car("RAC 011 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;

    let err = world
        .service
        .execute(command::CompleteBooking {
            booking_id: booking.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(
        matches!(
            err,
            complete_booking::ExecutionError::Transition(
                booking::TransitionError::NotApproved(
                    booking::Status::Pending,
                ),
            ),
        ),
        "unexpected error: {err}",
    );
    assert!(!world.stored_car(car.id).is_available);

    let full = world.pay(&booking, payment::Kind::Full).await;
    _ = world
        .service
        .execute(command::ApprovePayment {
            payment_id: full.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();

    let completed = world
        .service
        .execute(command::CompleteBooking {
            booking_id: booking.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();

    assert_eq!(completed.status, booking::Status::Completed);
    assert!(world.stored_car(car.id).is_available);
}
