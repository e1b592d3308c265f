mod support;

use service::{
    command::{self, review_payment, submit_payment},
    domain::{activity, booking, payment},
    Command as _,
};

use self::support::{initiator, rwf, World};

#[tokio::test]
async fn submits_amounts_due() {
    let world = World::new().await;
    let car = world.car("RAB 100 A", 10_000).await;
    let booking = world.book(&car, 3, 3).await;

    let deposit = world.pay(&booking, payment::Kind::Deposit).await;
    let full = world.pay(&booking, payment::Kind::Full).await;

    assert_eq!(deposit.amount, rwf(14_400));
    assert_eq!(full.amount, rwf(57_600));
    for p in [&deposit, &full] {
        assert_eq!(p.status, payment::Status::Pending);
        assert_eq!(p.payment_code, booking.payment_code);
        assert_eq!(p.booking_id, booking.id);
        assert!(p.approved_by.is_none());
        assert!(p.approved_at.is_none());
    }
}

#[tokio::test]
async fn approves_full_payment() {
    let world = World::new().await;
    let car = world.car("RAB 101 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;
    let full = world.pay(&booking, payment::Kind::Full).await;

    let out = world
        .service
        .execute(command::ApprovePayment {
            payment_id: full.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();

    assert_eq!(out.payment.status, payment::Status::Approved);
    assert_eq!(out.payment.approved_by, Some(world.manager.id));
    assert!(out.payment.approved_at.is_some());

    let stored = world.stored_booking(booking.id);
    assert!(stored.full_payment_paid());
    assert_eq!(stored.status, booking::Status::Approved);
    let pickup = stored.pickup.expect("pickup is assigned");
    assert_eq!(pickup.location.to_string(), "Kimihurura");
    assert!(!pickup.address.to_string().is_empty());
    assert_eq!(
        world.stored_payment(full.id).status,
        payment::Status::Approved,
    );
}

#[tokio::test]
async fn rejects_deposit_payment() {
    let world = World::new().await;
    let car = world.car("RAB 102 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;
    let deposit = world.pay(&booking, payment::Kind::Deposit).await;

    let out = world
        .service
        .execute(command::RejectPayment {
            payment_id: deposit.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();

    assert_eq!(out.payment.status, payment::Status::Rejected);
    assert!(!out.booking.deposit_paid());
    assert!(!world.stored_booking(booking.id).deposit_paid());
    assert_eq!(
        world.stored_payment(deposit.id).status,
        payment::Status::Rejected,
    );
}

#[tokio::test]
async fn rejecting_approved_deposit_clears_flag() {
    let world = World::new().await;
    let car = world.car("RAB 103 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;
    let deposit = world.pay(&booking, payment::Kind::Deposit).await;

    _ = world
        .service
        .execute(command::ApprovePayment {
            payment_id: deposit.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();
    let approved = world.stored_booking(booking.id);
    assert!(approved.deposit_paid());
    assert_eq!(approved.status, booking::Status::Pending);

    _ = world
        .service
        .execute(command::RejectPayment {
            payment_id: deposit.id,
            initiator: initiator(&world.admin),
        })
        .await
        .unwrap();

    let rejected = world.stored_booking(booking.id);
    assert!(!rejected.deposit_paid());
    assert!(rejected.deposit_paid_at.is_none());
    assert_eq!(
        world.stored_payment(deposit.id).approved_by,
        Some(world.admin.id),
    );
}

#[tokio::test]
async fn rejecting_full_payment_reverts_approval() {
    let world = World::new().await;
    let car = world.car("RAB 104 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;
    let full = world.pay(&booking, payment::Kind::Full).await;

    _ = world
        .service
        .execute(command::ApprovePayment {
            payment_id: full.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();
    _ = world
        .service
        .execute(command::RejectPayment {
            payment_id: full.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();

    let stored = world.stored_booking(booking.id);
    assert!(!stored.full_payment_paid());
    assert!(stored.pickup.is_none());
    assert_eq!(stored.status, booking::Status::Pending);
}

#[tokio::test]
async fn refuses_duplicate_payment() {
    let world = World::new().await;
    let car = world.car("RAB 110 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;
    let first = world.pay(&booking, payment::Kind::Deposit).await;

    for approve in [false, true] {
        if approve {
            _ = world
                .service
                .execute(command::ApprovePayment {
                    payment_id: first.id,
                    initiator: initiator(&world.manager),
                })
                .await
                .unwrap();
        }

        let err = world
            .service
            .execute(command::SubmitPayment {
                booking_id: booking.id,
                kind: payment::Kind::Deposit,
                initiator: initiator(&world.client),
            })
            .await
            .unwrap_err()
            .into_inner();

        assert!(
            matches!(
                err,
                submit_payment::ExecutionError::AlreadySubmitted(
                    payment::Kind::Deposit,
                ),
            ),
            "unexpected error: {err}",
        );
    }
    assert_eq!(world.db.snapshot().unwrap().payments.len(), 1);

    _ = world
        .service
        .execute(command::RejectPayment {
            payment_id: first.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();
    let second = world.pay(&booking, payment::Kind::Deposit).await;

    assert_ne!(second.id, first.id);
    assert_eq!(second.status, payment::Status::Pending);
}

#[tokio::test]
async fn rejecting_one_of_approved_deposits_keeps_flag() {
    let world = World::new().await;
    let car = world.car("RAB 111 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;
    let first = world.pay(&booking, payment::Kind::Deposit).await;
    _ = world
        .service
        .execute(command::RejectPayment {
            payment_id: first.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();
    let second = world.pay(&booking, payment::Kind::Deposit).await;

    for id in [second.id, first.id] {
        _ = world
            .service
            .execute(command::ApprovePayment {
                payment_id: id,
                initiator: initiator(&world.manager),
            })
            .await
            .unwrap();
    }
    let out = world
        .service
        .execute(command::RejectPayment {
            payment_id: first.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();

    assert_eq!(out.payment.status, payment::Status::Rejected);
    assert!(out.booking.deposit_paid());
    assert!(world.stored_booking(booking.id).deposit_paid());
    assert_eq!(
        world.stored_payment(second.id).status,
        payment::Status::Approved,
    );

    _ = world
        .service
        .execute(command::RejectPayment {
            payment_id: second.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();

    assert!(!world.stored_booking(booking.id).deposit_paid());
}

#[tokio::test]
async fn logs_every_review() {
    let world = World::new().await;
    let car = world.car("RAB 105 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;
    let deposit = world.pay(&booking, payment::Kind::Deposit).await;

    for _ in 0..2 {
        _ = world
            .service
            .execute(command::ApprovePayment {
                payment_id: deposit.id,
                initiator: initiator(&world.manager),
            })
            .await
            .unwrap();
    }

    let state = world.db.snapshot().unwrap();
    let approvals = state
        .activities
        .values()
        .filter(|a| a.action == activity::Action::PaymentApproved)
        .collect::<Vec<_>>();
    assert_eq!(approvals.len(), 2);
    assert!(approvals.iter().all(|a| {
        let details = a.details.to_string();
        a.user_id == Some(world.manager.id)
            && details.contains("DEPOSIT")
            && details.contains("6000RWF")
            && details.contains(&world.client.id.to_string())
    }));
}

#[tokio::test]
async fn only_owner_pays() {
    let world = World::new().await;
    let stranger = world.another_client("stranger").await;
    let car = world.car("RAB 106 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;

    let err = world
        .service
        .execute(command::SubmitPayment {
            booking_id: booking.id,
            kind: payment::Kind::Deposit,
            initiator: initiator(&stranger),
        })
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(err, submit_payment::ExecutionError::NotPermitted(_)),
        "unexpected error: {err}",
    );
    assert!(world.db.snapshot().unwrap().payments.is_empty());
}

#[tokio::test]
async fn refuses_payment_of_closed_booking() {
    let world = World::new().await;
    let car = world.car("RAB 107 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;
    _ = world
        .service
        .execute(command::CancelBooking {
            booking_id: booking.id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap();

    let err = world
        .service
        .execute(command::SubmitPayment {
            booking_id: booking.id,
            kind: payment::Kind::Full,
            initiator: initiator(&world.client),
        })
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(
            err,
            submit_payment::ExecutionError::BookingClosed(
                booking::Status::Rejected,
            ),
        ),
        "unexpected error: {err}",
    );
}

#[tokio::test]
async fn refuses_payment_of_inconsistent_booking() {
    let world = World::new().await;
    let car = world.car("RAB 108 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;
    world
        .db
        .execute(common::operations::Update(booking::Booking {
            deposit_amount: rwf(1),
            ..booking.clone()
        }))
        .await
        .unwrap();

    let err = world
        .service
        .execute(command::SubmitPayment {
            booking_id: booking.id,
            kind: payment::Kind::Deposit,
            initiator: initiator(&world.client),
        })
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(err, submit_payment::ExecutionError::Inconsistent(_)),
        "unexpected error: {err}",
    );
    assert_eq!(world.stored_booking(booking.id).deposit_amount, rwf(1));
}

#[tokio::test]
async fn only_staff_reviews() {
    let world = World::new().await;
    let car = world.car("RAB 109 A", 10_000).await;
    let booking = world.book(&car, 3, 1).await;
    let deposit = world.pay(&booking, payment::Kind::Deposit).await;

    let err = world
        .service
        .execute(command::ApprovePayment {
            payment_id: deposit.id,
            initiator: initiator(&world.client),
        })
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(err, review_payment::ExecutionError::NotPermitted(_)),
        "unexpected error: {err}",
    );
    assert_eq!(
        world.stored_payment(deposit.id).status,
        payment::Status::Pending,
    );
}

#[tokio::test]
async fn reports_missing_payment() {
    let world = World::new().await;
    let id = payment::Id::new();

    let err = world
        .service
        .execute(command::RejectPayment {
            payment_id: id,
            initiator: initiator(&world.manager),
        })
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(
            err,
            review_payment::ExecutionError::PaymentNotExists(missing)
                if missing == id,
        ),
        "unexpected error: {err}",
    );
}
