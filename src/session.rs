//! Per-user search sessions.
//!
//! Sessions live for the lifetime of the process. Each user's state sits
//! behind its own async mutex so two events from the same user run one after
//! the other, while different users never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::models::{DetailRecord, ResultItem, SearchQuery};

pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub query: SearchQuery,
    page: u32,
    pub results: Vec<ResultItem>,
    pub selected: Option<DetailRecord>,
}

/// Coarse view of where a session is in the browse/select cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Browsing,
    ItemOpen,
}

impl SessionState {
    /// A fresh session on page 1.
    pub fn new(query: SearchQuery, results: Vec<ResultItem>) -> Self {
        Self {
            query,
            page: 1,
            results,
            selected: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn phase(&self) -> Phase {
        if self.selected.is_some() {
            Phase::ItemOpen
        } else {
            Phase::Browsing
        }
    }

    /// Move to another page with its freshly fetched results. Pages below 1
    /// are clamped, and any open item is closed.
    pub fn show_page(&mut self, page: u32, results: Vec<ResultItem>) {
        self.page = page.max(1);
        self.results = results;
        self.selected = None;
    }
}

type Slot = Arc<Mutex<Option<SessionState>>>;

/// Guard over one user's session slot; `None` inside means no session.
pub type SessionGuard = OwnedMutexGuard<Option<SessionState>>;

#[derive(Debug, Default)]
pub struct SessionStore {
    slots: RwLock<HashMap<UserId, Slot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the user's slot, creating an empty one if needed.
    pub async fn lock(&self, user: UserId) -> SessionGuard {
        let slot = {
            let mut slots = self.slots.write().await;
            slots.entry(user).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Lock the user's slot only if one exists; never creates an entry.
    pub async fn lock_existing(&self, user: UserId) -> Option<SessionGuard> {
        let slot = self.slots.read().await.get(&user).cloned()?;
        Some(slot.lock_owned().await)
    }

    /// Snapshot of the user's session, if any.
    pub async fn get(&self, user: UserId) -> Option<SessionState> {
        let guard = self.lock_existing(user).await?;
        (*guard).clone()
    }

    pub async fn put(&self, user: UserId, state: SessionState) {
        *self.lock(user).await = Some(state);
    }

    pub async fn remove(&self, user: UserId) -> Option<SessionState> {
        let slot = self.slots.write().await.remove(&user)?;
        let mut guard = slot.lock_owned().await;
        guard.take()
    }

    /// Number of users with a live session.
    pub async fn len(&self) -> usize {
        let slots: Vec<Slot> = self.slots.read().await.values().cloned().collect();
        let mut live = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                live += 1;
            }
        }
        live
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
