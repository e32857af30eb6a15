use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    fetch::{Roster, RosterSource},
    view::{DepartmentFilter, DirectoryView, Filters},
};

#[derive(Clone, Debug)]
enum LoadState {
    Loading,
    Ready(Roster),
}

/// What the client should currently show.
#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    Loading,
    /// Loaded, but nothing passes the filters.
    NoMatches(DirectoryView),
    Listing(DirectoryView),
}

/// Client-side state for one mounted directory page.
///
/// The roster is fetched exactly once, on a background task started by
/// [`Dashboard::mount`]. Dropping the dashboard aborts that task, and a result
/// that still races in is discarded because the receiving end is gone.
pub struct Dashboard {
    load: watch::Receiver<LoadState>,
    fetch: JoinHandle<()>,
    filters: Filters,
    closed: bool,
}

impl Dashboard {
    pub fn mount<S: RosterSource>(source: S) -> Self {
        let (tx, rx) = watch::channel(LoadState::Loading);
        let fetch = tokio::spawn(async move {
            let roster = match source.fetch().await {
                Ok(roster) => roster,
                Err(err) => {
                    warn!(error = %err, "failed to fetch employees");
                    Roster::default()
                }
            };
            deliver(&tx, roster);
        });
        Self {
            load: rx,
            fetch,
            filters: Filters::default(),
            closed: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.closed && matches!(*self.load.borrow(), LoadState::Loading)
    }

    /// Waits until the fetch has settled, successfully or not.
    pub async fn settled(&mut self) {
        if self
            .load
            .wait_for(|state| matches!(state, LoadState::Ready(_)))
            .await
            .is_err()
        {
            warn!("employee fetch ended without a result");
            self.closed = true;
        }
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filters.search = search.into();
    }

    pub fn select_department(&mut self, department: DepartmentFilter) {
        self.filters.department = department;
    }

    /// Clears both the search term and the department selection.
    pub fn reset(&mut self) {
        self.filters = Filters::default();
    }

    pub fn screen(&self) -> Screen {
        let state = self.load.borrow();
        let roster = match &*state {
            LoadState::Loading if !self.closed => return Screen::Loading,
            LoadState::Loading => Default::default(),
            LoadState::Ready(roster) => roster.employees(),
        };
        let view = DirectoryView::compute(roster, &self.filters);
        if view.employees.is_empty() {
            Screen::NoMatches(view)
        } else {
            Screen::Listing(view)
        }
    }

    /// Tears the page down; any in-flight fetch is abandoned.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.fetch.abort();
    }
}

/// Returns whether a mounted dashboard received the roster.
fn deliver(tx: &watch::Sender<LoadState>, roster: Roster) -> bool {
    let employees = roster.len();
    if tx.send(LoadState::Ready(roster)).is_err() {
        debug!(employees, "dashboard unmounted before the roster arrived; discarding");
        return false;
    }
    true
}
