//! [`Activity`] read model definitions.
//!
//! [`Activity`]: crate::domain::Activity

pub mod list {
    //! [`Activity`] log definitions.

    use common::define_pagination;

    use crate::domain::{activity, user, Activity};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = Activity;

    /// Cursor pointing to a specific [`Activity`] in a list.
    pub type Cursor = activity::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// ID of the [`User`] to list the [`Activity`] entries of.
        ///
        /// [`User`]: crate::domain::User
        pub user_id: Option<user::Id>,

        /// [`activity::Action`] to list the [`Activity`] entries of.
        pub action: Option<activity::Action>,
    }

    impl Filter {
        /// Checks whether the provided [`Activity`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, activity: &Activity) -> bool {
            self.user_id.map_or(true, |id| activity.user_id == Some(id))
                && self.action.map_or(true, |a| activity.action == a)
        }
    }
}
