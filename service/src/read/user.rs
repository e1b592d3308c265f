//! [`User`] read model definition.
//!
//! [`User`]: crate::domain::User

pub mod list {
    //! [`User`]s list definitions.

    use common::define_pagination;

    use crate::domain::user;
    #[cfg(doc)]
    use crate::domain::User;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = user::Id;

    /// Cursor pointing to a specific [`User`] in a list.
    pub type Cursor = user::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// [`user::Role`] of the listed [`User`]s.
        pub role: Option<user::Role>,
    }
}
