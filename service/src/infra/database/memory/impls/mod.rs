//! [`Database`] implementations.

mod activity;
mod booking;
mod car;
mod dashboard;
mod payment;
mod user;

use common::{
    operations::{Commit, Transact},
    pagination::{Arguments, Connection, Edge, Kind},
};
use tracerr::Traced;

use crate::infra::{database, Database};

use super::{Memory, NonTx, Tx};

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Memory(Tx::begin(&self.0).await))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.0.commit().map_err(tracerr::wrap!())
    }
}

/// Selects a page of `nodes` according to the provided [`Arguments`].
///
/// `nodes` are expected to be filtered already.
fn paginate<C, N>(
    arguments: &Arguments<C>,
    nodes: impl IntoIterator<Item = (C, N)>,
) -> Connection<C, N>
where
    C: Ord,
{
    let kind = arguments.kind();
    let cursor = arguments.cursor();

    let mut nodes = nodes
        .into_iter()
        .filter(|(c, _)| {
            cursor.map_or(true, |cursor| match kind {
                Kind::Forward => c > cursor,
                Kind::ForwardIncluding => c >= cursor,
                Kind::Backward => c < cursor,
                Kind::BackwardIncluding => c <= cursor,
            })
        })
        .collect::<Vec<_>>();
    nodes.sort_by(|(a, _), (b, _)| a.cmp(b));
    if kind.is_backward() {
        nodes.reverse();
    }

    let has_more = nodes.len() > arguments.limit();
    let edges = nodes
        .into_iter()
        .take(arguments.limit())
        .map(|(cursor, node)| Edge { cursor, node });

    Connection::new(arguments, edges, has_more)
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Commit, Insert, Select, Transact},
        pagination::Arguments,
        DateTime,
    };

    use crate::{
        domain::{activity, user, Activity, User},
        infra::{database::Memory, Database as _},
    };

    use super::paginate;

    fn activity(details: &str) -> Activity {
        Activity::new(
            None,
            activity::Action::UserSignedIn,
            details.to_owned(),
            None,
            DateTime::now().coerce(),
        )
    }

    #[tokio::test]
    async fn keeps_writes_made_beside_transaction() {
        let db = Memory::new();
        let tx = db.execute(Transact).await.unwrap();
        _ = tx
            .execute(Select(By::<Option<User>, _>::new(user::Id::new())))
            .await
            .unwrap();
        tx.execute(Insert(activity("inside"))).await.unwrap();

        db.execute(Insert(activity("beside"))).await.unwrap();
        assert_eq!(db.snapshot().unwrap().activities.len(), 1);
        tx.execute(Commit).await.unwrap();

        let mut details = db
            .snapshot()
            .unwrap()
            .activities
            .values()
            .map(|a| a.details.to_string())
            .collect::<Vec<_>>();
        details.sort();
        assert_eq!(details, ["beside", "inside"]);
    }

    #[tokio::test]
    async fn drops_uncommitted_writes() {
        let db = Memory::new();
        {
            let tx = db.execute(Transact).await.unwrap();
            tx.execute(Insert(activity("lost"))).await.unwrap();
        }
        db.execute(Insert(activity("kept"))).await.unwrap();

        let state = db.snapshot().unwrap();
        assert_eq!(state.activities.len(), 1);
        assert!(state
            .activities
            .values()
            .all(|a| a.details.to_string() == "kept"));
    }

    #[test]
    fn paginates_forward_and_backward() {
        let nodes = || (1..=5).map(|n| (n, n * 10));

        let page = paginate(
            &Arguments::new(Some(2), None, None, None, 10).unwrap(),
            nodes(),
        );
        assert_eq!(
            page.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            [10, 20],
        );
        assert!(page.page_info().has_next_page);

        let page = paginate(
            &Arguments::new(Some(5), Some(3), None, None, 10).unwrap(),
            nodes(),
        );
        assert_eq!(
            page.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            [40, 50],
        );
        assert!(!page.page_info().has_next_page);

        let page = paginate(
            &Arguments::new(None, None, Some(2), Some(4), 10).unwrap(),
            nodes(),
        );
        assert_eq!(
            page.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            [30, 20],
        );
        assert!(page.page_info().has_previous_page);
    }
}
