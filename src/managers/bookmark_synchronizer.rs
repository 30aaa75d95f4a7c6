//! Bookmark synchronizer for SmartMark.
//!
//! Owns the in-memory bookmark collection for one owner and keeps it in step
//! with the backend: every change notice triggers a full refetch, user
//! mutations go through the [`BookmarkRepository`] and the favorite overlay,
//! and readers get a consistent [`SyncSnapshot`] or projected view.
//!
//! Two counters guard the collection against late responses:
//! - every fetch takes a ticket, and only a ticket newer than the last applied
//!   one may replace the collection;
//! - a generation is captured before every await, and `dispose` bumps it, so
//!   nothing that completes after disposal is applied.
//!
//! State locks are plain `std::sync::Mutex`es and are never held across an
//! `.await`. Lock order is state before overlay.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::bookmark_repository::BookmarkRepository;
use super::favorite_overlay::{FavoriteOverlayStore, FavoriteOverlayTrait};
use crate::database::{Subscription, SubscriptionGuard};
use crate::services::view_projector::{self, CategoryFacet, ViewSummary};
use crate::types::bookmark::{Bookmark, BookmarkDraft};
use crate::types::errors::{RepositoryError, SyncError};
use crate::types::filter::ViewFilter;
use crate::types::sync::{ChangeNotice, SyncSnapshot, SyncStatus};

struct SyncState {
    status: SyncStatus,
    bookmarks: Vec<Bookmark>,
    error: Option<String>,
    filter: ViewFilter,
    generation: u64,
    next_ticket: u64,
    applied_ticket: u64,
    /// Ids with an edit or remove in flight.
    pending: HashSet<String>,
}

impl SyncState {
    fn new() -> Self {
        Self {
            status: SyncStatus::Loading,
            bookmarks: Vec::new(),
            error: None,
            filter: ViewFilter::default(),
            generation: 0,
            next_ticket: 0,
            applied_ticket: 0,
            pending: HashSet::new(),
        }
    }

    fn is_live(&self, generation: u64) -> bool {
        self.status != SyncStatus::Disposed && self.generation == generation
    }
}

/// Change subscription plus the task draining it.
struct Listener {
    guard: SubscriptionGuard,
    task: JoinHandle<()>,
}

impl Listener {
    fn stop(mut self) {
        self.guard.unsubscribe();
        self.task.abort();
    }
}

struct SyncInner {
    repository: BookmarkRepository,
    overlay: Mutex<FavoriteOverlayStore>,
    state: Mutex<SyncState>,
    listener: Mutex<Option<Listener>>,
    revision: watch::Sender<u64>,
}

impl SyncInner {
    fn lock_state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_overlay(&self) -> MutexGuard<'_, FavoriteOverlayStore> {
        self.overlay.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listener(&self) -> MutexGuard<'_, Option<Listener>> {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    /// Current generation, or `Disposed`.
    fn live_generation(&self) -> Result<u64, SyncError> {
        let st = self.lock_state();
        if st.status == SyncStatus::Disposed {
            return Err(SyncError::Disposed);
        }
        Ok(st.generation)
    }

    /// Takes a fetch ticket. Returns `(generation, ticket)`.
    fn begin_fetch(&self) -> Result<(u64, u64), SyncError> {
        let mut st = self.lock_state();
        if st.status == SyncStatus::Disposed {
            return Err(SyncError::Disposed);
        }
        st.next_ticket += 1;
        Ok((st.generation, st.next_ticket))
    }

    /// Applies a fetch result unless it is stale. Returns whether state changed.
    fn finish_fetch(
        &self,
        generation: u64,
        ticket: u64,
        result: &Result<Vec<Bookmark>, RepositoryError>,
    ) -> bool {
        let mut st = self.lock_state();
        if !st.is_live(generation) {
            debug!(ticket, "discarding fetch result after dispose");
            return false;
        }
        if ticket <= st.applied_ticket {
            debug!(ticket, applied = st.applied_ticket, "discarding stale fetch result");
            return false;
        }
        st.applied_ticket = ticket;
        if st.status == SyncStatus::Loading {
            st.status = SyncStatus::Ready;
        }
        match result {
            Ok(bookmarks) => st.bookmarks = bookmarks.clone(),
            Err(e) => st.error = Some(e.to_string()),
        }
        true
    }

    /// Surfaces a repository failure unless the synchronizer moved on.
    fn record_failure(&self, generation: u64, error: &SyncError) {
        if !matches!(error, SyncError::Repository(_) | SyncError::Overlay(_)) {
            return;
        }
        let changed = {
            let mut st = self.lock_state();
            if st.is_live(generation) {
                st.error = Some(error.to_string());
                true
            } else {
                false
            }
        };
        if changed {
            self.bump_revision();
        }
    }
}

impl Drop for SyncInner {
    fn drop(&mut self) {
        let slot = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(listener) = slot.take() {
            listener.stop();
        }
    }
}

/// Marks an id as having an operation in flight until dropped.
struct PendingOp {
    inner: Arc<SyncInner>,
    id: String,
}

impl Drop for PendingOp {
    fn drop(&mut self) {
        self.inner.lock_state().pending.remove(&self.id);
    }
}

/// Client-side state machine reconciling the backend collection, change
/// notices and the local favorite overlay.
///
/// Cloning yields another handle to the same synchronizer.
#[derive(Clone)]
pub struct BookmarkSynchronizer {
    inner: Arc<SyncInner>,
}

impl BookmarkSynchronizer {
    /// Creates a synchronizer in `Loading` with an empty collection. Call
    /// [`initialize`](Self::initialize) to load data and start listening.
    pub fn new(repository: BookmarkRepository, overlay: FavoriteOverlayStore) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(SyncInner {
                repository,
                overlay: Mutex::new(overlay),
                state: Mutex::new(SyncState::new()),
                listener: Mutex::new(None),
                revision,
            }),
        }
    }

    pub fn owner_id(&self) -> &str {
        self.inner.repository.owner_id()
    }

    /// Loads the overlay, subscribes to change notices and fetches the
    /// collection.
    ///
    /// A subscribe or fetch failure is surfaced through the snapshot's
    /// `error`; the synchronizer still ends up `Ready`. Only a disposed
    /// synchronizer returns an error.
    pub async fn initialize(&self) -> Result<(), SyncError> {
        let generation = {
            let mut st = self.inner.lock_state();
            if st.status == SyncStatus::Disposed {
                return Err(SyncError::Disposed);
            }
            st.status = SyncStatus::Loading;
            st.generation
        };
        self.inner.bump_revision();

        let favorites = self.inner.lock_overlay().load();
        debug!(owner_id = %self.owner_id(), favorites = favorites.len(), "initializing synchronizer");

        match self.inner.repository.subscribe().await {
            Ok(subscription) => self.attach(subscription, generation),
            Err(e) => {
                warn!(owner_id = %self.owner_id(), error = %e, "change subscription failed");
                self.inner.record_failure(generation, &SyncError::Repository(e));
            }
        }

        match self.refresh().await {
            Ok(()) => info!(owner_id = %self.owner_id(), "synchronizer ready"),
            Err(SyncError::Disposed) => return Err(SyncError::Disposed),
            Err(e) => warn!(owner_id = %self.owner_id(), error = %e, "initial fetch failed"),
        }
        Ok(())
    }

    /// Installs the listener for `subscription`, or drops it when the
    /// synchronizer was disposed while subscribing.
    fn attach(&self, subscription: Subscription, generation: u64) {
        let (guard, receiver) = subscription.into_parts();
        let mut slot = self.inner.lock_listener();
        if !self.inner.lock_state().is_live(generation) {
            debug!("disposed while subscribing, releasing subscription");
            drop(guard);
            return;
        }
        let task = spawn_listener(Arc::downgrade(&self.inner), generation, receiver);
        if let Some(previous) = slot.replace(Listener { guard, task }) {
            previous.stop();
        }
    }

    /// Refetches the whole collection and replaces it if the response is
    /// still current.
    ///
    /// A failed fetch keeps the previous collection and records the error.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let (generation, ticket) = self.inner.begin_fetch()?;
        let result = self.inner.repository.fetch_all().await;
        if self.inner.finish_fetch(generation, ticket, &result) {
            self.inner.bump_revision();
        }
        result.map(|_| ()).map_err(SyncError::from)
    }

    /// Handles a change notice by refetching. Ignored once disposed.
    pub async fn on_change_notification(&self) -> Result<(), SyncError> {
        match self.refresh().await {
            Err(SyncError::Disposed) => Ok(()),
            other => other,
        }
    }

    /// Validates `draft`, creates it in the backend and refetches.
    ///
    /// Validation failures are returned without touching the backend or
    /// the surfaced error. A failed refetch after a successful create is
    /// only recorded in the snapshot.
    pub async fn add(&self, draft: &BookmarkDraft) -> Result<Bookmark, SyncError> {
        let generation = self.inner.live_generation()?;
        let fields = draft.validate()?;

        let created = match self.inner.repository.create(&fields).await {
            Ok(bookmark) => bookmark,
            Err(e) => {
                self.inner.record_failure(generation, &e);
                return Err(e);
            }
        };
        info!(owner_id = %self.owner_id(), id = %created.id, "bookmark added");

        if let Err(e) = self.refresh().await {
            debug!(error = %e, "refetch after add failed");
        }
        Ok(created)
    }

    /// Validates `draft` and updates bookmark `id`, then refetches.
    ///
    /// Empty tags or an empty category in `draft` leave the stored values
    /// unchanged.
    pub async fn edit(&self, id: &str, draft: &BookmarkDraft) -> Result<(), SyncError> {
        let generation = self.inner.live_generation()?;
        let fields = draft.validate()?;
        let _pending = self.begin_pending(id)?;

        if let Err(e) = self.inner.repository.update(id, &fields).await {
            self.inner.record_failure(generation, &e);
            return Err(e);
        }
        info!(owner_id = %self.owner_id(), id, "bookmark edited");

        if let Err(e) = self.refresh().await {
            debug!(error = %e, "refetch after edit failed");
        }
        Ok(())
    }

    /// Deletes bookmark `id`.
    ///
    /// On success the bookmark leaves the collection at once, fetches issued
    /// earlier can no longer restore it, and its id is pruned from the
    /// favorite overlay. On failure the collection is untouched.
    pub async fn remove(&self, id: &str) -> Result<(), SyncError> {
        let generation = self.inner.live_generation()?;
        let _pending = self.begin_pending(id)?;

        if let Err(e) = self.inner.repository.delete(id).await {
            let e = SyncError::from(e);
            self.inner.record_failure(generation, &e);
            return Err(e);
        }

        let still_loading = {
            let mut st = self.inner.lock_state();
            if st.is_live(generation) {
                st.bookmarks.retain(|b| b.id != id);
                st.applied_ticket = st.next_ticket;
            }
            st.status == SyncStatus::Loading
        };
        info!(owner_id = %self.owner_id(), id, "bookmark removed");

        // The initial fetch was just invalidated; a fresh one leaves Loading.
        if still_loading {
            if let Err(e) = self.refresh().await {
                warn!(owner_id = %self.owner_id(), error = %e, "refetch after remove failed");
            }
        }

        let pruned = self.inner.lock_overlay().prune(id);
        if let Err(e) = pruned {
            warn!(id, error = %e, "failed to prune favorite");
            self.inner.record_failure(generation, &SyncError::Overlay(e));
        }
        self.inner.bump_revision();
        Ok(())
    }

    fn begin_pending(&self, id: &str) -> Result<PendingOp, SyncError> {
        let mut st = self.inner.lock_state();
        if !st.pending.insert(id.to_string()) {
            return Err(SyncError::InFlight(id.to_string()));
        }
        Ok(PendingOp {
            inner: Arc::clone(&self.inner),
            id: id.to_string(),
        })
    }

    /// Flips favorite membership of `id` and returns the new membership.
    pub fn toggle_favorite(&self, id: &str) -> Result<bool, SyncError> {
        self.inner.live_generation()?;
        let favorites = self.inner.lock_overlay().toggle(id)?;
        self.inner.bump_revision();
        Ok(favorites.contains(id))
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.inner.lock_overlay().contains(id)
    }

    pub fn favorites(&self) -> BTreeSet<String> {
        self.inner.lock_overlay().ids().clone()
    }

    pub fn filter(&self) -> ViewFilter {
        self.inner.lock_state().filter.clone()
    }

    pub fn set_filter(&self, filter: ViewFilter) {
        self.update_filter(|current| *current = filter);
    }

    /// Edits the view filter in place.
    pub fn update_filter(&self, f: impl FnOnce(&mut ViewFilter)) {
        f(&mut self.inner.lock_state().filter);
        self.inner.bump_revision();
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.lock_state().status
    }

    pub fn is_disposed(&self) -> bool {
        self.status() == SyncStatus::Disposed
    }

    pub fn state(&self) -> SyncSnapshot {
        let st = self.inner.lock_state();
        SyncSnapshot {
            status: st.status,
            bookmarks: st.bookmarks.clone(),
            error: st.error.clone(),
        }
    }

    /// The collection projected through the current filter and overlay.
    pub fn view(&self) -> Vec<Bookmark> {
        let st = self.inner.lock_state();
        let overlay = self.inner.lock_overlay();
        view_projector::project(&st.bookmarks, overlay.ids(), &st.filter)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn categories(&self) -> Vec<CategoryFacet> {
        view_projector::category_facets(&self.inner.lock_state().bookmarks)
    }

    pub fn summary(&self) -> ViewSummary {
        let st = self.inner.lock_state();
        let overlay = self.inner.lock_overlay();
        view_projector::view_summary(&st.bookmarks, overlay.ids(), &st.filter)
    }

    pub fn dismiss_error(&self) {
        let cleared = self.inner.lock_state().error.take().is_some();
        if cleared {
            self.inner.bump_revision();
        }
    }

    /// Receiver whose value increases on every observable state change.
    pub fn watch_revision(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    pub fn has_listener(&self) -> bool {
        self.inner.lock_listener().is_some()
    }

    /// Unsubscribes synchronously, stops the listener and discards the
    /// collection. Idempotent.
    ///
    /// Operations still in flight complete, but their results are dropped.
    pub fn dispose(&self) {
        let first = {
            let mut st = self.inner.lock_state();
            let first = st.status != SyncStatus::Disposed;
            if first {
                st.status = SyncStatus::Disposed;
                st.generation += 1;
            }
            st.bookmarks.clear();
            st.error = None;
            first
        };
        if let Some(listener) = self.inner.lock_listener().take() {
            listener.stop();
        }
        if first {
            self.inner.bump_revision();
            info!(owner_id = %self.owner_id(), "synchronizer disposed");
        }
    }
}

fn spawn_listener(
    inner: Weak<SyncInner>,
    generation: u64,
    mut receiver: UnboundedReceiver<ChangeNotice>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notice) = receiver.recv().await {
            // Collapse a burst of notices into one refetch
            while receiver.try_recv().is_ok() {}

            let Some(inner) = inner.upgrade() else {
                break;
            };
            debug!(owner_id = %notice.owner_id, kind = ?notice.kind, "change notice received");
            let sync = BookmarkSynchronizer { inner };
            if let Err(e) = sync.on_change_notification().await {
                debug!(error = %e, "refetch after change notice failed");
            }
        }

        // Stream ended without an unsubscribe from this side
        if let Some(inner) = inner.upgrade() {
            warn!("change stream closed by backend");
            let closed = RepositoryError::Subscription("change stream closed".to_string());
            inner.record_failure(generation, &SyncError::Repository(closed));
        }
    })
}
