//! The synchronizer: polls the entry store and publishes snapshots.
//!
//! There is no push channel. While active, the synchronizer fetches the
//! whole collection once per interval and replaces its snapshot wholesale.
//! Writers call [`Synchronizer::refresh`] after a successful write so their
//! own change shows up without waiting for the next tick.

use std::{
  sync::{
    Arc, Mutex, PoisonError, Weak,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use chrono::{DateTime, Utc};
use parlor_core::{entry::Entry, store::EntryStore};
use thiserror::Error;
use tokio::{
  sync::watch,
  task::JoinHandle,
  time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SyncConfig {
  /// Time between the starts of consecutive polls. A poll that overruns
  /// pushes the next one back instead of triggering a burst.
  pub interval: Duration,
}

impl Default for SyncConfig {
  fn default() -> Self { Self { interval: Duration::from_secs(5) } }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The last fetch that failed. Cleared by the next successful one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sync failed at {at}: {message}")]
pub struct SyncFailure {
  pub message: String,
  pub at:      DateTime<Utc>,
}

/// The most recent complete copy of the entry collection.
///
/// A snapshot is replaced, never patched. After a failed fetch the previous
/// entries stay in place and only `last_error` changes.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  pub entries:    Arc<[Entry]>,
  /// Successful fetches published so far; `0` until the first one lands.
  pub version:    u64,
  pub fetched_at: Option<DateTime<Utc>>,
  pub last_error: Option<SyncFailure>,
}

impl Snapshot {
  pub fn is_loaded(&self) -> bool { self.version > 0 }
}

// ─── Synchronizer ────────────────────────────────────────────────────────────

struct Inner<S> {
  store:   Arc<S>,
  config:  SyncConfig,
  state:   watch::Sender<Snapshot>,
  /// Bumped on every activation and deactivation. A fetch that started under
  /// an older epoch is dropped on return.
  epoch:   AtomicU64,
  /// Issued once per fetch, in start order.
  tickets: AtomicU64,
  /// Ticket of the fetch behind the published entries. Only read and written
  /// while the watch channel's lock is held.
  applied: AtomicU64,
  task:    Mutex<Option<JoinHandle<()>>>,
}

/// Shared handle to the polling state. Clones see the same snapshot.
pub struct Synchronizer<S> {
  inner: Arc<Inner<S>>,
}

impl<S> Clone for Synchronizer<S> {
  fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

impl<S: EntryStore + 'static> Synchronizer<S> {
  pub fn new(store: Arc<S>, config: SyncConfig) -> Self {
    let (state, _) = watch::channel(Snapshot::default());
    Self {
      inner: Arc::new(Inner {
        store,
        config,
        state,
        epoch: AtomicU64::new(0),
        tickets: AtomicU64::new(0),
        applied: AtomicU64::new(0),
        task: Mutex::new(None),
      }),
    }
  }

  pub fn store(&self) -> &Arc<S> { &self.inner.store }

  /// The current snapshot.
  pub fn snapshot(&self) -> Snapshot { self.inner.state.borrow().clone() }

  /// A receiver that wakes whenever a fetch is published or fails.
  pub fn subscribe(&self) -> watch::Receiver<Snapshot> { self.inner.state.subscribe() }

  pub fn is_active(&self) -> bool {
    self
      .inner
      .task
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .is_some()
  }

  /// Start polling. The first fetch happens immediately. Calling this while
  /// already active does nothing.
  ///
  /// Must be called from within a tokio runtime.
  pub fn activate(&self) {
    let mut task = self.inner.task.lock().unwrap_or_else(PoisonError::into_inner);
    if task.is_some() {
      return;
    }
    let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
    let weak = Arc::downgrade(&self.inner);
    let period = self.inner.config.interval;
    debug!(epoch, ?period, "sync activated");
    *task = Some(tokio::spawn(poll_loop(weak, period, epoch)));
  }

  /// Stop polling. Any fetch still in flight is discarded when it returns.
  pub fn deactivate(&self) {
    let handle = self
      .inner
      .task
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .take();
    if let Some(handle) = handle {
      let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
      handle.abort();
      debug!(epoch, "sync deactivated");
    }
  }

  /// Fetch now, outside the regular schedule, and return the snapshot as it
  /// stands afterwards.
  ///
  /// On failure the stale snapshot is kept and the failure is returned. The
  /// fetch result is dropped if a later-started fetch has already been
  /// published, or if the synchronizer is deactivated while it runs.
  pub async fn refresh(&self) -> Result<Snapshot, SyncFailure> {
    let epoch = self.inner.epoch.load(Ordering::SeqCst);
    self.inner.fetch(epoch).await?;
    Ok(self.snapshot())
  }
}

async fn poll_loop<S: EntryStore + 'static>(inner: Weak<Inner<S>>, period: Duration, epoch: u64) {
  let mut interval = time::interval(period);
  interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

  loop {
    interval.tick().await;
    // Every handle has been dropped.
    let Some(inner) = inner.upgrade() else { break };
    if inner.epoch.load(Ordering::SeqCst) != epoch {
      break;
    }
    // Failures are recorded on the snapshot; the next tick is the retry.
    inner.fetch(epoch).await.ok();
  }
}

impl<S: EntryStore> Inner<S> {
  async fn fetch(&self, epoch: u64) -> Result<(), SyncFailure> {
    let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
    let result = self.store.list_entries().await;

    if self.epoch.load(Ordering::SeqCst) != epoch {
      debug!(ticket, "discarding fetch that outlived its activation");
      return Ok(());
    }

    match result {
      Ok(entries) => {
        let count = entries.len();
        let entries: Arc<[Entry]> = entries.into();
        let published = self.state.send_if_modified(|snap| {
          if ticket < self.applied.load(Ordering::SeqCst) {
            return false;
          }
          self.applied.store(ticket, Ordering::SeqCst);
          snap.entries = entries;
          snap.version += 1;
          snap.fetched_at = Some(Utc::now());
          snap.last_error = None;
          true
        });
        if published {
          debug!(ticket, count, "snapshot published");
        } else {
          debug!(ticket, "discarding fetch overtaken by a newer one");
        }
        Ok(())
      }
      Err(e) => {
        warn!(error = %e, "failed to fetch entries; keeping stale data");
        let failure = SyncFailure { message: e.to_string(), at: Utc::now() };
        self.state.send_if_modified(|snap| {
          if ticket < self.applied.load(Ordering::SeqCst) {
            return false;
          }
          snap.last_error = Some(failure.clone());
          true
        });
        Err(failure)
      }
    }
  }
}
