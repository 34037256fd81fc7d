//! Client-side edit session.
//!
//! Holds a local copy of the collection, tracks whether it diverged from the
//! last loaded or saved state, and which row (if any) the form is editing.
//! Local edits never touch the remote; `load` and `save` do, one at a time.
//!
//! ```text
//! Clean --add/update/delete--> Dirty
//! Dirty --save ok--> Clean      Dirty --save failed--> Dirty
//! Dirty --load (confirmed)--> Clean
//! ```

mod client;
mod form;

pub use client::*;
pub use form::*;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::models::{CommitInfo, Location};
use crate::validation::{self, ValidationError};

/// What the next submit does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// Append a new row
    Append,
    /// Overwrite the row at this index
    Replace(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rows were replaced with this many remote records
    Loaded(usize),
    /// Local edits were kept because discarding them was not confirmed
    Kept,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Another load or save is still in progress")]
    Busy,
    #[error("No location at index {index} ({len} loaded)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

struct SessionState {
    rows: Vec<Location>,
    edit_target: EditTarget,
    dirty: bool,
    form: LocationForm,
    status: String,
    last_commit: Option<String>,
}

impl SessionState {
    fn check_index(&self, index: usize) -> Result<(), SessionError> {
        if index >= self.rows.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(())
    }

    fn reset_edit(&mut self) {
        self.edit_target = EditTarget::Append;
        self.form = LocationForm::default();
    }
}

/// Clears the busy flag when an operation finishes or its future is dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Local edit state reconciled against a [`LocationsApi`].
pub struct EditSession<A> {
    api: A,
    state: Mutex<SessionState>,
    busy: AtomicBool,
}

impl<A: LocationsApi> EditSession<A> {
    /// An empty, clean session. Call [`EditSession::load`] to populate it.
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Mutex::new(SessionState {
                rows: Vec::new(),
                edit_target: EditTarget::Append,
                dirty: false,
                form: LocationForm::default(),
                status: String::new(),
                last_commit: None,
            }),
            busy: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_io(&self) -> Result<BusyGuard<'_>, SessionError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::Busy)?;
        Ok(BusyGuard(&self.busy))
    }

    /// Lock the state for a local edit; refused while a load or save is in flight.
    fn idle_state(&self) -> Result<MutexGuard<'_, SessionState>, SessionError> {
        let state = self.state();
        if self.busy.load(Ordering::Acquire) {
            return Err(SessionError::Busy);
        }
        Ok(state)
    }

    pub fn rows(&self) -> Vec<Location> {
        self.state().rows.clone()
    }

    pub fn edit_target(&self) -> EditTarget {
        self.state().edit_target
    }

    pub fn is_dirty(&self) -> bool {
        self.state().dirty
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Current contents of the edit form.
    pub fn form(&self) -> LocationForm {
        self.state().form.clone()
    }

    /// Operator-facing status line.
    pub fn status(&self) -> String {
        self.state().status.clone()
    }

    /// Short id of the last commit written by [`EditSession::save`].
    pub fn last_commit(&self) -> Option<String> {
        self.state().last_commit.clone()
    }

    /// Replace local rows with the remote collection.
    ///
    /// With unsaved edits, `confirm_discard` decides whether to proceed; if it
    /// returns false nothing changes.
    pub async fn load<F>(&self, confirm_discard: F) -> Result<LoadOutcome, SessionError>
    where
        F: FnOnce() -> bool,
    {
        let _busy = self.begin_io()?;

        let dirty = self.state().dirty;
        if dirty && !confirm_discard() {
            return Ok(LoadOutcome::Kept);
        }
        self.state().status = "Loading…".to_string();

        match self.api.fetch_locations().await {
            Ok(rows) => {
                let mut state = self.state();
                let count = rows.len();
                state.rows = rows;
                state.reset_edit();
                state.dirty = false;
                state.status = format!("Loaded {} location(s)", count);
                tracing::debug!("Loaded {} location(s)", count);
                Ok(LoadOutcome::Loaded(count))
            }
            Err(e) => {
                self.state().status = format!("Failed to load: {}", e);
                tracing::warn!("Load failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Next submit appends a new row.
    pub fn begin_add(&self) -> Result<(), SessionError> {
        let mut state = self.idle_state()?;
        state.reset_edit();
        Ok(())
    }

    /// Next submit overwrites `rows[index]`; the form is filled from it.
    pub fn begin_edit(&self, index: usize) -> Result<(), SessionError> {
        let mut state = self.idle_state()?;
        state.check_index(index)?;
        let form = LocationForm::from_location(&state.rows[index]);
        state.form = form;
        state.edit_target = EditTarget::Replace(index);
        Ok(())
    }

    /// Abandon the current edit without touching rows.
    pub fn cancel_edit(&self) -> Result<(), SessionError> {
        self.begin_add()
    }

    /// Append or overwrite according to the edit target.
    ///
    /// An invalid candidate is rejected and leaves everything unchanged.
    pub fn submit(&self, candidate: Location) -> Result<(), SessionError> {
        let mut state = self.idle_state()?;
        if let Err(e) = validation::check_location(&candidate) {
            state.status = e.to_string();
            return Err(e.into());
        }

        let target = state.edit_target;
        match target {
            EditTarget::Append => {
                state.rows.push(candidate);
                state.status = "Added. Remember to save.".to_string();
            }
            EditTarget::Replace(index) => {
                state.check_index(index)?;
                state.rows[index] = candidate;
                state.status = "Updated. Remember to save.".to_string();
            }
        }
        state.reset_edit();
        state.dirty = true;
        Ok(())
    }

    /// Parse a typed-in form and submit it.
    pub fn submit_form(&self, form: &LocationForm) -> Result<(), SessionError> {
        let candidate = match form.parse() {
            Ok(candidate) => candidate,
            Err(e) => {
                self.idle_state()?.status = e.to_string();
                return Err(e.into());
            }
        };
        self.submit(candidate)
    }

    pub fn delete(&self, index: usize) -> Result<(), SessionError> {
        let mut state = self.idle_state()?;
        state.check_index(index)?;
        state.rows.remove(index);

        // Keep the edit target pointing at the same record.
        let target = state.edit_target;
        match target {
            EditTarget::Replace(i) if i == index => state.reset_edit(),
            EditTarget::Replace(i) if i > index => state.edit_target = EditTarget::Replace(i - 1),
            _ => {}
        }
        state.dirty = true;
        state.status = "Deleted. Remember to save.".to_string();
        Ok(())
    }

    /// Commit the local rows. Failures leave the session dirty; nothing is retried.
    pub async fn save(&self) -> Result<CommitInfo, SessionError> {
        let _busy = self.begin_io()?;

        let rows = {
            let mut state = self.state();
            state.status = "Saving…".to_string();
            state.rows.clone()
        };

        match self.api.save_locations(&rows).await {
            Ok(info) => {
                let mut state = self.state();
                state.dirty = false;
                state.last_commit = Some(info.short_sha().to_string());
                state.status = format!("Saved, commit {}", info.short_sha());
                tracing::info!("Saved {} location(s) as {}", rows.len(), info.sha);
                Ok(info)
            }
            Err(ClientError::Conflict(message)) => {
                self.state().status = format!(
                    "Save rejected: {}. Reload (discarding local edits) and redo your changes.",
                    message
                );
                tracing::warn!("Save conflicted: {}", message);
                Err(ClientError::Conflict(message).into())
            }
            Err(e) => {
                self.state().status = format!("Save failed: {}. Try again.", e);
                tracing::warn!("Save failed: {}", e);
                Err(e.into())
            }
        }
    }
}
