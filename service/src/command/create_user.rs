//! [`Command`] for creating a new [`User`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Login, Name, Password, Phone, Role};
use crate::{
    domain::{activity, user, Activity, User},
    infra::{database, Database},
    Service,
};

use super::{record, Command, Initiator};

/// [`Command`] for creating a new [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Login`] of a new [`User`].
    pub login: user::Login,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Phone`] of a new [`User`].
    pub phone: Option<user::Phone>,

    /// [`Origin`] of a new [`User`].
    pub origin: Origin,
}

/// Way a [`User`] comes to the platform.
#[derive(Clone, Copy, Debug)]
pub enum Origin {
    /// [`User`] signs up as a client.
    SignUp {
        /// [`activity::IpAddress`] the sign up originates from, if known.
        ip_address: Option<activity::IpAddress>,
    },

    /// [`User`] is seeded by the system itself.
    Seed {
        /// [`Role`] of a new [`User`].
        role: user::Role,
    },

    /// [`User`] is created by an administrator.
    Admin {
        /// [`Role`] of a new [`User`].
        role: user::Role,

        /// Administrator creating the [`User`].
        initiator: Initiator,
    },
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Login>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<Activity>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            login,
            password,
            email,
            phone,
            origin,
        } = cmd;

        let id = user::Id::new();
        let (role, actor, ip_address) = match origin {
            Origin::SignUp { ip_address } => {
                (user::Role::Client, Some(id), ip_address)
            }
            Origin::Seed { role } => (role, None, None),
            Origin::Admin { role, initiator } => {
                let admin = self
                    .database()
                    .execute(Select(By::<Option<User>, _>::new(
                        initiator.user_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .filter(|u| u.can(user::Capability::ManageUsers))
                    .ok_or(E::NotPermitted(initiator.user_id))
                    .map_err(tracerr::wrap!())?;
                (role, Some(admin.id), initiator.ip_address)
            }
        };

        let u = self
            .database()
            .execute(Select(By::new(&login)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::LoginOccupied(login)));
        }

        let now = self.clock().now();
        let user = User {
            id,
            name,
            login,
            password_hash: user::PasswordHash::new(password.expose_secret())
                .map_err(tracerr::from_and_wrap!(=> E))?,
            email,
            phone,
            role,
            created_at: now.coerce(),
            deleted_at: None,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        record(
            self.database(),
            Activity::new(
                actor,
                activity::Action::UserCreated,
                format!("Created {} `{}` ({})", user.role, user.login, user.id),
                ip_address,
                now.coerce(),
            ),
        )
        .await;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Login`] is already occupied.
    #[display("`{_0}` login is occupied")]
    #[from(ignore)]
    LoginOccupied(#[error(not(source))] user::Login),

    /// [`Initiator`] is not permitted to manage users.
    #[display("`User(id: {_0})` is not permitted to manage users")]
    #[from(ignore)]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`Password`] hashing failed.
    #[display("Failed to hash `Password`: {_0}")]
    PasswordHash(argon2::password_hash::Error),
}
