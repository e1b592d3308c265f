//! [`Query`] collection related to the [`Activity`] log.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::Activity, Query};

use super::DatabaseQuery;

/// Queries a page of the [`Activity`] log.
pub type List = DatabaseQuery<
    By<read::activity::list::Page, read::activity::list::Selector>,
>;
