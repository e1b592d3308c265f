//! [`Command`] for updating a [`User`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password, Phone, Role};
use crate::{
    domain::{activity, user, Activity, User},
    infra::{database, Database},
    Service,
};

use super::{record, Command, Initiator};

/// [`Command`] for updating a [`User`].
///
/// [`User`]s may update themselves, except their [`Role`]. Administrators
/// may update anyone.
#[derive(Debug)]
pub struct UpdateUser {
    /// ID of the [`User`] to update.
    pub user_id: user::Id,

    /// New [`Name`] of the [`User`], if any.
    pub name: Option<user::Name>,

    /// New [`Email`] of the [`User`], if any.
    pub email: Option<user::Email>,

    /// New [`Phone`] of the [`User`], if any.
    ///
    /// `Some(None)` removes the [`Phone`].
    pub phone: Option<Option<user::Phone>>,

    /// New [`Password`] of the [`User`], if any.
    pub password: Option<SecretBox<user::Password>>,

    /// New [`Role`] of the [`User`], if any.
    pub role: Option<user::Role>,

    /// [`Initiator`] of this [`Command`].
    pub initiator: Initiator,
}

impl<Db> Command<UpdateUser> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<Activity>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<User, user::Id>>, Err = Traced<database::Error>>
        + Database<Update<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUser {
            user_id,
            name,
            email,
            phone,
            password,
            role,
            initiator,
        } = cmd;

        let permitted = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(initiator.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .is_some_and(|u| {
                u.can(user::Capability::ManageUsers)
                    || (u.id == user_id && role.is_none())
            });
        if !permitted {
            return Err(tracerr::new!(E::NotPermitted(initiator.user_id)));
        }

        let password_hash = password
            .map(|p| user::PasswordHash::new(p.expose_secret()))
            .transpose()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::<User, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let mut changed = Vec::new();
        if let Some(name) = name.filter(|n| *n != user.name) {
            user.name = name;
            changed.push("name");
        }
        if let Some(email) = email.filter(|e| *e != user.email) {
            user.email = email;
            changed.push("email");
        }
        if let Some(phone) = phone.filter(|p| *p != user.phone) {
            user.phone = phone;
            changed.push("phone");
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
            changed.push("password");
        }
        if let Some(role) = role.filter(|r| *r != user.role) {
            user.role = role;
            changed.push("role");
        }
        if changed.is_empty() {
            return Ok(user);
        }

        tx.execute(Update(user.clone()))
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
                Some(initiator.user_id),
                activity::Action::UserUpdated,
                format!(
                    "Updated {} of {} `{}`",
                    changed.join(", "),
                    user.role,
                    user.login,
                ),
                initiator.ip_address,
                self.clock().now().coerce(),
            ),
        )
        .await;

        Ok(user)
    }
}

/// Error of [`UpdateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Initiator`] is not permitted to update the [`User`].
    #[display("`User(id: {_0})` is not permitted to update the `User`")]
    #[from(ignore)]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`Password`] hashing failed.
    #[display("Failed to hash `Password`: {_0}")]
    PasswordHash(argon2::password_hash::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
