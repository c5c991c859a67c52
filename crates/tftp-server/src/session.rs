//! Session state for in-progress transfers.
//!
//! The [`SessionTable`] is the only shared state in the server: a map from
//! transaction id to live session, shared between the dispatcher task and
//! the per-packet handler tasks. The outer lock covers map operations
//! only; each session carries its own lock so file access for one TID is
//! serialized without blocking transfers to other clients.

use crate::tid::Tid;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::fs::File;
use tokio::sync::Mutex;
use tracing::debug;

/// One in-progress read transfer.
#[derive(Debug)]
pub struct Session {
    /// The open file being served; exclusively owned by this session and
    /// closed when the session is dropped.
    pub file: File,
    /// Highest block number handed to the peer so far. Starts at 1 and
    /// only ever increases within a session; duplicate ACKs re-send
    /// earlier blocks without rewinding it.
    pub next_block: u16,
}

impl Session {
    /// Creates a session positioned at the first block.
    #[must_use]
    pub fn new(file: File) -> Self {
        Session {
            file,
            next_block: 1,
        }
    }
}

/// Concurrency-safe map from transaction id to session.
#[derive(Debug, Default)]
pub struct SessionTable {
    inner: Mutex<HashMap<Tid, Arc<Mutex<Session>>>>,
}

impl SessionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        SessionTable::default()
    }

    /// Registers a session for `tid`, replacing any existing entry.
    ///
    /// A displaced session is dropped here, which closes its file handle:
    /// a client that re-issues an RRQ mid-transfer gets a fresh transfer
    /// and the abandoned one releases its resources.
    pub async fn insert(&self, tid: Tid, session: Session) -> Arc<Mutex<Session>> {
        let handle = Arc::new(Mutex::new(session));
        let displaced = self.inner.lock().await.insert(tid, Arc::clone(&handle));
        if displaced.is_some() {
            debug!("Replaced in-progress session for {}", tid);
        }
        handle
    }

    /// Looks up the session for `tid`, if one is in progress.
    pub async fn lookup(&self, tid: Tid) -> Option<Arc<Mutex<Session>>> {
        self.inner.lock().await.get(&tid).map(Arc::clone)
    }

    /// Removes the session for `tid`, closing its file once the last
    /// handler holding it finishes.
    pub async fn remove(&self, tid: Tid) {
        self.inner.lock().await.remove(&tid);
    }

    /// Number of in-progress sessions.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether no transfer is in progress.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
