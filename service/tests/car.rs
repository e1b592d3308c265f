mod support;

use service::{
    command::{self, create_car, delete_car, reserve_car},
    domain::car,
    query, read, Command as _,
};

use self::support::{initiator, rwf, World};

fn new_car(world: &World, plate: &str, rate: i64) -> command::CreateCar {
    command::CreateCar {
        brand: car::Brand::new("Suzuki").unwrap(),
        model: car::Model::new("Swift").unwrap(),
        year: car::Year::new(2019).unwrap(),
        color: None,
        plate: car::Plate::new(plate).unwrap(),
        specifications: car::Specifications::new("Manual, 5 seats"),
        image_url: None,
        daily_rate: rwf(rate),
        initiator: initiator(&world.manager),
    }
}

#[tokio::test]
async fn refuses_occupied_plate() {
    let world = World::new().await;
    let car = world.car("RAD 200 B", 10_000).await;
    assert_eq!(car.plate.to_string(), "RAD 200 B");

    let err = world
        .service
        .execute(new_car(&world, " rad 200 b", 8_000))
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(err, create_car::ExecutionError::PlateOccupied(_)),
        "unexpected error: {err}",
    );
    assert_eq!(world.db.snapshot().unwrap().cars.len(), 1);
}

#[tokio::test]
async fn refuses_negative_rate() {
    let world = World::new().await;

    let err = world
        .service
        .execute(new_car(&world, "RAD 201 B", -1))
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(err, create_car::ExecutionError::NegativeDailyRate(_)),
        "unexpected error: {err}",
    );
}

#[tokio::test]
async fn accepts_negatively_signed_zero_rate() {
    let world = World::new().await;
    let mut cmd = new_car(&world, "RAD 219 B", 0);
    cmd.daily_rate.amount.set_sign_negative(true);

    let car = world.service.execute(cmd).await.unwrap();

    assert!(car.daily_rate.amount.is_zero());
    assert!(!car.is_listable());
}

#[tokio::test]
async fn only_staff_manages_fleet() {
    let world = World::new().await;

    let err = world
        .service
        .execute(command::CreateCar {
            initiator: initiator(&world.client),
            ..new_car(&world, "RAD 202 B", 10_000)
        })
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(err, create_car::ExecutionError::NotPermitted(_)),
        "unexpected error: {err}",
    );
    assert!(world.db.snapshot().unwrap().cars.is_empty());
}

#[tokio::test]
async fn reserving_reserved_car_writes_nothing() {
    let world = World::new().await;
    let car = world.car("RAD 203 B", 10_000).await;

    let reserved = world
        .service
        .execute(command::ReserveCar {
            car_id: car.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();
    assert!(!reserved.is_available);
    let before = world.db.snapshot().unwrap();

    let err = world
        .service
        .execute(command::ReserveCar {
            car_id: car.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(
            err,
            reserve_car::ExecutionError::CarUnavailable(car::Unavailable(id))
                if id == car.id,
        ),
        "unexpected error: {err}",
    );
    let after = world.db.snapshot().unwrap();
    assert_eq!(after.cars[&car.id].updated_at, before.cars[&car.id].updated_at);
    assert_eq!(after.activities.len(), before.activities.len());
}

#[tokio::test]
async fn releases_idempotently() {
    let world = World::new().await;
    let car = world.car("RAD 204 B", 10_000).await;
    _ = world.book(&car, 2, 1).await;

    for _ in 0..2 {
        let released = world
            .service
            .execute(command::ReleaseCar {
                car_id: car.id,
                initiator: initiator(&world.manager),
            })
            .await
            .unwrap();
        assert!(released.is_available);
    }
    assert!(world.stored_car(car.id).is_available);
}

#[tokio::test]
async fn refuses_deleting_booked_car() {
    let world = World::new().await;
    let booked = world.car("RAD 205 B", 10_000).await;
    let spare = world.car("RAD 206 B", 10_000).await;
    _ = world.book(&booked, 2, 1).await;

    let err = world
        .service
        .execute(command::DeleteCar {
            car_id: booked.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(
        matches!(err, delete_car::ExecutionError::CarInUse(_)),
        "unexpected error: {err}",
    );

    _ = world
        .service
        .execute(command::DeleteCar {
            car_id: spare.id,
            initiator: initiator(&world.admin),
        })
        .await
        .unwrap();
    let cars = world.db.snapshot().unwrap().cars;
    assert!(cars.contains_key(&booked.id));
    assert!(!cars.contains_key(&spare.id));
}

#[tokio::test]
async fn lists_only_bookable_cars() {
    let world = World::new().await;
    let older = world.car("RAD 207 B", 10_000).await;
    let booked = world.car("RAD 208 B", 10_000).await;
    let free = world
        .service
        .execute(new_car(&world, "RAD 209 B", 0))
        .await
        .unwrap();
    _ = world.book(&booked, 2, 1).await;

    let available = world
        .service
        .execute(query::cars::List::by(read::car::Filter::Available))
        .await
        .unwrap();
    assert_eq!(
        available.iter().map(|c| c.id).collect::<Vec<_>>(),
        [older.id],
    );

    let all = world
        .service
        .execute(query::cars::List::by(read::car::Filter::All))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|c| c.id == free.id));
}
