//! [`Activity`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::Activity,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Insert<Activity>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(activity): Insert<Activity>,
    ) -> Result<Self::Ok, Self::Err> {
        let Activity {
            id,
            user_id,
            action,
            details,
            ip_address,
            created_at,
        } = activity;

        const SQL: &str = "\
            INSERT INTO activities (\
                id, user_id, action, details, ip_address, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::INT2, $4::TEXT, $5::INET, \
                $6::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[&id, &user_id, &action, &details, &ip_address, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C>
    Database<
        Select<By<read::activity::list::Page, read::activity::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::activity::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::activity::list::Page, read::activity::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::activity::list::Selector {
            arguments,
            filter: read::activity::list::Filter { user_id, action },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit())
            .unwrap_or(i32::MAX - 1)
            + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let user_idx = user_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });
        let action_idx = action.as_ref().map(|a| {
            ps.push(a);
            ps.len()
        });

        let sql = format!(
            "SELECT id, user_id, action, details, ip_address, created_at \
             FROM activities \
             WHERE TRUE \
                   {cursor} \
                   {user_filtering} \
                   {action_filtering} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            user_filtering = user_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND user_id = ${idx}::UUID"))
            }),
            action_filtering =
                action_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND action = ${idx}::INT2"))
                }),
            order = arguments.kind().order().sql(),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let activity = Activity {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    action: row.get("action"),
                    details: row.get("details"),
                    ip_address: row.get("ip_address"),
                    created_at: row.get("created_at"),
                };
                (activity.id, activity)
            })
            .collect::<Vec<_>>();

        Ok(read::activity::list::Page::new(&arguments, edges, has_more))
    }
}
