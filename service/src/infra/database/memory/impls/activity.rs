//! [`Activity`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::Activity,
    infra::{
        database::{
            self,
            memory::{Storage, Table},
            Memory,
        },
        Database,
    },
    read,
};

use super::paginate;

impl<S: Storage> Database<Insert<Activity>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(activity): Insert<Activity>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(Table::Activities, move |s| {
            _ = s.activities.insert(activity.id, activity.clone());
            Ok(())
        })
    }
}

impl<S: Storage>
    Database<
        Select<By<read::activity::list::Page, read::activity::list::Selector>>,
    > for Memory<S>
{
    type Ok = read::activity::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::activity::list::Page, read::activity::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::activity::list::Selector { arguments, filter } =
            by.into_inner();

        let activities = self.read(|s| {
            s.activities
                .values()
                .filter(|a| filter.matches(a))
                .map(|a| (a.id, a.clone()))
                .collect::<Vec<_>>()
        })?;
        Ok(paginate(&arguments, activities))
    }
}
