//! In-memory [`Database`] implementation.
//!
//! Transactions read a snapshot of the whole state and log their writes,
//! which are replayed over the committed state on [`Commit`]. Dropping an
//! uncommitted transaction rolls it back, and using a committed one starts a
//! new snapshot. Transactions are serialized, so a [`Lock`] is a no-op here.
//!
//! [`Commit`]: common::operations::Commit
//! [`Lock`]: common::operations::Lock

mod impls;

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt, mem,
    sync::{Arc, Mutex, MutexGuard},
};

use derive_more::{Display, Error as StdError};
use tokio::sync::OwnedMutexGuard;
use tracerr::Traced;

use crate::{
    domain::{
        activity, booking, car, payment, user, Activity, Booking, Car,
        Payment, User,
    },
    infra::database,
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following write into the provided [`Table`] fail.
    pub fn break_writes(&self, table: Table) {
        if let Ok(mut broken) = self.0.shared.broken.lock() {
            _ = broken.insert(table);
        }
    }

    /// Makes writes into the provided [`Table`] succeed again.
    pub fn repair_writes(&self, table: Table) {
        if let Ok(mut broken) = self.0.shared.broken.lock() {
            _ = broken.remove(&table);
        }
    }

    /// Returns a copy of the currently committed [`State`].
    ///
    /// # Errors
    ///
    /// If the [`State`] lock is poisoned.
    pub fn snapshot(&self) -> Result<State, Traced<database::Error>> {
        self.0.read(State::clone)
    }
}

/// Data stored in a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Stored [`Car`]s.
    pub cars: HashMap<car::Id, Car>,

    /// Stored [`Booking`]s.
    pub bookings: HashMap<booking::Id, Booking>,

    /// Stored [`Payment`]s.
    pub payments: HashMap<payment::Id, Payment>,

    /// Stored [`Activity`] log, ordered by creation.
    pub activities: BTreeMap<activity::Id, Activity>,

    /// Stored [`User`]s.
    pub users: HashMap<user::Id, User>,
}

/// Table of a [`State`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Table {
    /// [`State::cars`].
    #[display("cars")]
    Cars,

    /// [`State::bookings`].
    #[display("bookings")]
    Bookings,

    /// [`State::payments`].
    #[display("payments")]
    Payments,

    /// [`State::activities`].
    #[display("activities")]
    Activities,

    /// [`State::users`].
    #[display("users")]
    Users,
}

/// State shared by all the clients of the same [`Memory`] database.
#[derive(Debug, Default)]
struct Shared {
    /// Committed [`State`].
    state: Mutex<State>,

    /// [`Table`]s writes into which fail.
    broken: Mutex<HashSet<Table>>,

    /// Lock serializing transactions.
    tx_lock: Arc<tokio::sync::Mutex<()>>,
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// [`Shared`] state of the database.
    shared: Arc<Shared>,
}

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Inner representation of this client.
    inner: Arc<TxInner>,
}

/// Write into a [`State`] to be replayed on commit.
struct Write(Box<dyn Fn(&mut State) -> Result<(), Error> + Send>);

impl fmt::Debug for Write {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Write")
    }
}

/// Inner representation of the [`Tx`] client.
#[derive(Debug)]
struct TxInner {
    /// [`Shared`] state of the database.
    shared: Arc<Shared>,

    /// Lazily taken working copy of the [`State`].
    snapshot: Mutex<Option<State>>,

    /// Writes performed since the last [`Commit`].
    ///
    /// [`Commit`]: common::operations::Commit
    log: Mutex<Vec<Write>>,

    /// Guard holding the transaction lock until this [`Tx`] is dropped.
    _guard: OwnedMutexGuard<()>,
}

impl Tx {
    /// Starts a new [`Tx`] over the provided [`NonTx`] client's state.
    ///
    /// Waits for all the other [`Tx`]s to be dropped.
    async fn begin(client: &NonTx) -> Self {
        let guard = Arc::clone(&client.shared.tx_lock).lock_owned().await;
        Self {
            inner: Arc::new(TxInner {
                shared: Arc::clone(&client.shared),
                snapshot: Mutex::new(None),
                log: Mutex::new(Vec::new()),
                _guard: guard,
            }),
        }
    }

    /// Runs the provided function over the working copy of the [`State`],
    /// taking it if there is none yet.
    fn with_snapshot<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut snapshot = lock(&self.inner.snapshot)?;
        if snapshot.is_none() {
            *snapshot = Some(lock(&self.inner.shared.state)?.clone());
        }
        let state = snapshot.as_mut().ok_or_else(|| {
            tracerr::new!(database::Error::from(Error::Poisoned))
        })?;
        Ok(f(state))
    }

    /// Replays the logged writes over the committed [`State`].
    ///
    /// Writes made outside of this [`Tx`] since its snapshot are preserved.
    /// Nothing is applied if any write fails.
    fn commit(&self) -> Result<(), Traced<database::Error>> {
        let log = mem::take(&mut *lock(&self.inner.log)?);
        drop(lock(&self.inner.snapshot)?.take());
        if log.is_empty() {
            return Ok(());
        }

        let mut state = lock(&self.inner.shared.state)?;
        let mut copy = state.clone();
        for Write(write) in &log {
            write(&mut copy)
                .map_err(|e| tracerr::new!(database::Error::from(e)))?;
        }
        *state = copy;
        Ok(())
    }
}

/// Access to a [`State`] of a [`Memory`] database.
pub trait Storage {
    /// Reads the [`State`] with the provided function.
    ///
    /// # Errors
    ///
    /// If the [`State`] is not accessible.
    fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> Result<R, Traced<database::Error>>;

    /// Modifies the [`State`] with the provided function, which is expected
    /// to write into the given [`Table`].
    ///
    /// The function may be run again over the committed [`State`].
    ///
    /// # Errors
    ///
    /// If the [`State`] is not accessible, or writes into the [`Table`] are
    /// broken.
    fn write<R: 'static>(
        &self,
        table: Table,
        f: impl Fn(&mut State) -> Result<R, Error> + Send + 'static,
    ) -> Result<R, Traced<database::Error>>;
}

impl Storage for NonTx {
    fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&*lock(&self.shared.state)?))
    }

    fn write<R: 'static>(
        &self,
        table: Table,
        f: impl Fn(&mut State) -> Result<R, Error> + Send + 'static,
    ) -> Result<R, Traced<database::Error>> {
        check_writable(&self.shared, table)?;
        let mut state = lock(&self.shared.state)?;
        let mut copy = state.clone();
        let out = f(&mut copy)
            .map_err(|e| tracerr::new!(database::Error::from(e)))?;
        *state = copy;
        Ok(out)
    }
}

impl Storage for Tx {
    fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        self.with_snapshot(|state| f(state))
    }

    fn write<R: 'static>(
        &self,
        table: Table,
        f: impl Fn(&mut State) -> Result<R, Error> + Send + 'static,
    ) -> Result<R, Traced<database::Error>> {
        check_writable(&self.inner.shared, table)?;
        let out = self
            .with_snapshot(|state| f(state))?
            .map_err(|e| tracerr::new!(database::Error::from(e)))?;
        lock(&self.inner.log)?
            .push(Write(Box::new(move |state| f(state).map(drop))));
        Ok(out)
    }
}

impl<T: Storage> Storage for Memory<T> {
    fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        self.0.read(f)
    }

    fn write<R: 'static>(
        &self,
        table: Table,
        f: impl Fn(&mut State) -> Result<R, Error> + Send + 'static,
    ) -> Result<R, Traced<database::Error>> {
        self.0.write(table, f)
    }
}

/// Locks the provided [`Mutex`], failing if it's poisoned.
fn lock<T>(
    mutex: &Mutex<T>,
) -> Result<MutexGuard<'_, T>, Traced<database::Error>> {
    mutex
        .lock()
        .map_err(|_| tracerr::new!(database::Error::from(Error::Poisoned)))
}

/// Checks whether writes into the provided [`Table`] are not broken.
fn check_writable(
    shared: &Shared,
    table: Table,
) -> Result<(), Traced<database::Error>> {
    if lock(&shared.broken)?.contains(&table) {
        return Err(tracerr::new!(database::Error::from(Error::Broken(
            table
        ))));
    }
    Ok(())
}

/// [`Memory`] database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Writes into the [`Table`] are broken on purpose.
    #[display("Writes into `{_0}` table are broken")]
    Broken(#[error(not(source))] Table),

    /// [`State`] lock is poisoned.
    #[display("`State` lock is poisoned")]
    Poisoned,

    /// Unique constraint is violated.
    #[display("`{_0}` unique constraint is violated")]
    UniqueViolation(#[error(not(source))] &'static str),

    /// Referenced row doesn't exist or is still referenced.
    #[display("`{_0}` foreign key constraint is violated")]
    ForeignKeyViolation(#[error(not(source))] &'static str),
}
