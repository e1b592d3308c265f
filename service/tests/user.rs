mod support;

use secrecy::SecretBox;
use service::{
    command::{
        self, create_user, create_user_session, delete_user, update_user,
    },
    domain::{activity, booking, payment, user},
    query, read, Command as _,
};

use self::support::{initiator, World, PASSWORD};

fn password(raw: &str) -> SecretBox<user::Password> {
    SecretBox::new(Box::new(user::Password::new(raw).unwrap()))
}

fn sign_up(login: &str) -> command::CreateUser {
    command::CreateUser {
        name: user::Name::new("Aline Uwase").unwrap(),
        login: user::Login::new(login).unwrap(),
        password: password("another-pass"),
        email: user::Email::new("aline@example.com").unwrap(),
        phone: user::Phone::new("078 812 3456"),
        origin: create_user::Origin::SignUp {
            ip_address: Some("192.168.1.5".parse().unwrap()),
        },
    }
}

#[tokio::test]
async fn signs_up_clients() {
    let world = World::new().await;

    let user = world.service.execute(sign_up("aline")).await.unwrap();

    assert_eq!(user.role, user::Role::Client);
    assert!(user.password_hash.verify(
        &user::Password::new("another-pass").unwrap()
    ));
    let state = world.db.snapshot().unwrap();
    assert!(state.users.contains_key(&user.id));
    assert!(state.activities.values().any(|a| {
        a.action == activity::Action::UserCreated
            && a.user_id == Some(user.id)
            && a.ip_address.is_some()
    }));
}

#[tokio::test]
async fn refuses_occupied_login() {
    let world = World::new().await;

    let err = world
        .service
        .execute(sign_up("client"))
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(err, create_user::ExecutionError::LoginOccupied(_)),
        "unexpected error: {err}",
    );
}

#[tokio::test]
async fn only_admins_create_staff() {
    let world = World::new().await;

    let err = world
        .service
        .execute(command::CreateUser {
            origin: create_user::Origin::Admin {
                role: user::Role::Manager,
                initiator: initiator(&world.manager),
            },
            ..sign_up("newmanager")
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(
        matches!(err, create_user::ExecutionError::NotPermitted(_)),
        "unexpected error: {err}",
    );

    let manager = world
        .service
        .execute(command::CreateUser {
            origin: create_user::Origin::Admin {
                role: user::Role::Manager,
                initiator: initiator(&world.admin),
            },
            ..sign_up("newmanager")
        })
        .await
        .unwrap();
    assert_eq!(manager.role, user::Role::Manager);
}

#[tokio::test]
async fn seeds_as_system() {
    let world = World::new().await;

    let admin = world
        .service
        .execute(command::CreateUser {
            origin: create_user::Origin::Seed {
                role: user::Role::Admin,
            },
            ..sign_up("root")
        })
        .await
        .unwrap();

    assert_eq!(admin.role, user::Role::Admin);
    let state = world.db.snapshot().unwrap();
    let created = state
        .activities
        .values()
        .find(|a| a.action == activity::Action::UserCreated)
        .unwrap();
    assert_eq!(created.actor(), activity::Actor::System);
}

#[tokio::test]
async fn signs_in_and_authorizes() {
    let world = World::new().await;

    let signed_in = world
        .service
        .execute(create_user_session::CreateUserSession::ByCredentials {
            login: world.client.login.clone(),
            password: password(PASSWORD),
            ip_address: None,
        })
        .await
        .unwrap();
    assert_eq!(signed_in.user.id, world.client.id);

    let authorized = world
        .service
        .execute(command::AuthorizeUserSession {
            token: signed_in.token,
        })
        .await
        .unwrap();
    assert_eq!(authorized.session.user_id, world.client.id);
    assert_eq!(authorized.user.role, user::Role::Client);
    assert!(world
        .db
        .snapshot()
        .unwrap()
        .activities
        .values()
        .any(|a| a.action == activity::Action::UserSignedIn));
}

#[tokio::test]
async fn refuses_wrong_password() {
    let world = World::new().await;

    let err = world
        .service
        .execute(create_user_session::CreateUserSession::ByCredentials {
            login: world.client.login.clone(),
            password: password("wrong-pass"),
            ip_address: None,
        })
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(err, create_user_session::ExecutionError::WrongCredentials),
        "unexpected error: {err}",
    );
}

#[tokio::test]
async fn updates_own_profile_but_not_role() {
    let world = World::new().await;

    let updated = world
        .service
        .execute(command::UpdateUser {
            user_id: world.client.id,
            name: user::Name::new("Jean Claude"),
            email: None,
            phone: Some(user::Phone::new("0788123456")),
            password: None,
            role: None,
            initiator: initiator(&world.client),
        })
        .await
        .unwrap();
    assert_eq!(updated.name.to_string(), "Jean Claude");
    assert!(updated.phone.is_some());

    let err = world
        .service
        .execute(command::UpdateUser {
            user_id: world.client.id,
            name: None,
            email: None,
            phone: None,
            password: None,
            role: Some(user::Role::Admin),
            initiator: initiator(&world.client),
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(
        matches!(err, update_user::ExecutionError::NotPermitted(_)),
        "unexpected error: {err}",
    );

    let promoted = world
        .service
        .execute(command::UpdateUser {
            user_id: world.client.id,
            name: None,
            email: None,
            phone: None,
            password: None,
            role: Some(user::Role::Manager),
            initiator: initiator(&world.admin),
        })
        .await
        .unwrap();
    assert_eq!(promoted.role, user::Role::Manager);
}

#[tokio::test]
async fn deletes_client_with_bookings() {
    let world = World::new().await;
    let car = world.car("RAE 300 C", 10_000).await;
    let booking = world.book(&car, 3, 1).await;
    _ = world.pay(&booking, payment::Kind::Deposit).await;

    let deleted = world
        .service
        .execute(command::DeleteUser {
            user_id: world.client.id,
            initiator: initiator(&world.admin),
        })
        .await
        .unwrap();

    assert!(deleted.deleted_at.is_some());
    let state = world.db.snapshot().unwrap();
    assert!(state.bookings.is_empty());
    assert!(state.payments.is_empty());
    assert!(state.cars[&car.id].is_available);
    assert!(state.users[&world.client.id].deleted_at.is_some());

    let found = world
        .service
        .execute(query::user::ById::by(world.client.id))
        .await
        .unwrap();
    assert!(found.is_none());

    let clients = world
        .service
        .execute(query::users::List::by(read::user::list::Selector {
            arguments: read::user::list::Arguments::Forward {
                first: 10,
                after: None,
                including: false,
            },
            filter: read::user::list::Filter {
                role: Some(user::Role::Client),
            },
        }))
        .await
        .unwrap();
    assert!(clients.edges.is_empty());
}

#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let world = World::new().await;

    let err = world
        .service
        .execute(command::DeleteUser {
            user_id: world.admin.id,
            initiator: initiator(&world.admin),
        })
        .await
        .unwrap_err()
        .into_inner();

    assert!(
        matches!(err, delete_user::ExecutionError::SelfDeletion(_)),
        "unexpected error: {err}",
    );
}

#[tokio::test]
async fn clients_see_own_bookings() {
    let world = World::new().await;
    let other = world.another_client("other").await;
    let car = world.car("RAE 301 C", 10_000).await;
    let mine = world.book(&car, 3, 1).await;

    let own = world
        .service
        .execute(query::bookings::List::by(read::booking::Filter::Client(
            world.client.id,
        )))
        .await
        .unwrap();
    assert_eq!(own.iter().map(|b| b.id).collect::<Vec<_>>(), [mine.id]);

    let theirs = world
        .service
        .execute(query::bookings::List::by(read::booking::Filter::Client(
            other.id,
        )))
        .await
        .unwrap();
    assert!(theirs.is_empty());
    assert_eq!(mine.status, booking::Status::Pending);
}
