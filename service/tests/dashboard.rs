mod support;

use service::{
    command,
    domain::{activity, payment},
    query, read, Command as _,
};

use self::support::{initiator, rwf, World};

#[tokio::test]
async fn rolls_up_fleet_and_revenue() {
    let world = World::new().await;
    let paid = world.car("RAF 400 D", 10_000).await;
    let pending = world.car("RAF 401 D", 20_000).await;
    _ = world.car("RAF 402 D", 30_000).await;

    let paid_booking = world.book(&paid, 3, 1).await;
    let full = world.pay(&paid_booking, payment::Kind::Full).await;
    _ = world
        .service
        .execute(command::ApprovePayment {
            payment_id: full.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();
    let pending_booking = world.book(&pending, 2, 1).await;
    _ = world.pay(&pending_booking, payment::Kind::Deposit).await;

    let fleet = world
        .service
        .execute(query::dashboard::Fleet::by(()))
        .await
        .unwrap();
    assert_eq!(
        fleet,
        read::dashboard::Fleet {
            total_cars: 3,
            available_cars: 1,
            pending_bookings: 1,
            pending_payments: 1,
        },
    );

    let overview = world
        .service
        .execute(query::dashboard::Overview::by(()))
        .await
        .unwrap();
    assert_eq!(overview.total_users, 3);
    assert_eq!(overview.total_managers, 1);
    assert_eq!(overview.total_clients, 1);
    assert_eq!(overview.total_bookings, 2);
    assert_eq!(overview.revenue, [rwf(30_000)]);

    let client = world
        .service
        .execute(query::dashboard::Client::by(world.client.id))
        .await
        .unwrap();
    assert_eq!(client.total_bookings, 2);
    assert_eq!(client.active_bookings, 2);
    assert_eq!(client.completed_bookings, 0);
    assert_eq!(client.total_spent, [rwf(30_000)]);
}

#[tokio::test]
async fn pages_activity_log() {
    let world = World::new().await;
    for plate in ["RAF 403 D", "RAF 404 D", "RAF 405 D"] {
        _ = world.car(plate, 10_000).await;
    }

    let first = world
        .service
        .execute(query::activities::List::by(
            read::activity::list::Selector {
                arguments: read::activity::list::Arguments::Forward {
                    first: 2,
                    after: None,
                    including: false,
                },
                filter: read::activity::list::Filter {
                    user_id: Some(world.manager.id),
                    action: Some(activity::Action::CarCreated),
                },
            },
        ))
        .await
        .unwrap();
    assert_eq!(first.edges.len(), 2);
    assert!(first.has_more);

    let rest = world
        .service
        .execute(query::activities::List::by(
            read::activity::list::Selector {
                arguments: read::activity::list::Arguments::Forward {
                    first: 2,
                    after: Some(first.edges[1].cursor),
                    including: false,
                },
                filter: read::activity::list::Filter::default(),
            },
        ))
        .await
        .unwrap();
    assert_eq!(rest.edges.len(), 1);
    assert!(!rest.has_more);
    assert!(rest.edges[0].node.details.to_string().contains("RAF 405 D"));
}
