//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{
            self,
            memory::{Error, Storage, Table},
            Memory,
        },
        Database,
    },
    read,
};

use super::paginate;

impl<S: Storage> Database<Select<By<Option<User>, user::Id>>> for Memory<S> {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| {
            s.users.get(&id).filter(|u| u.deleted_at.is_none()).cloned()
        })
    }
}

impl<'l, S: Storage> Database<Select<By<Option<User>, &'l user::Login>>>
    for Memory<S>
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();
        self.read(|s| {
            s.users
                .values()
                .find(|u| u.deleted_at.is_none() && &u.login == login)
                .cloned()
        })
    }
}

impl<S: Storage>
    Database<Select<By<read::user::list::Page, read::user::list::Selector>>>
    for Memory<S>
{
    type Ok = read::user::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::user::list::Page, read::user::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::user::list::Selector {
            arguments,
            filter: read::user::list::Filter { role },
        } = by.into_inner();

        let ids = self.read(|s| {
            s.users
                .values()
                .filter(|u| {
                    u.deleted_at.is_none()
                        && role.map_or(true, |r| u.role == r)
                })
                .map(|u| (u.id, u.id))
                .collect::<Vec<_>>()
        })?;
        Ok(paginate(&arguments, ids))
    }
}

impl<S: Storage> Database<Insert<User>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(user)).await.map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Update<User>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(Table::Users, move |s| {
            // Deleted `User`s free their login.
            if user.deleted_at.is_none()
                && s.users.values().any(|u| {
                    u.deleted_at.is_none()
                        && u.login == user.login
                        && u.id != user.id
                })
            {
                return Err(Error::UniqueViolation("users_login"));
            }
            _ = s.users.insert(user.id, user.clone());
            Ok(())
        })
    }
}

impl<S: Storage> Database<Lock<By<User, user::Id>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}
