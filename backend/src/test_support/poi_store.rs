//! In-memory POI storage with transactional replace semantics.
//!
//! Statements issued through a [`PoiReplaceTransaction`] are staged and only
//! become visible on commit, mirroring a database transaction. Failures can
//! be injected at each step to exercise rollback paths.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    PoiReplaceTransaction, PoiRepository, PoiRepositoryError, PoiStore, PoiStoreError,
};
use crate::domain::{NewPoi, PoiId, PointOfInterest};

/// A storage call observed by [`InMemoryPoiStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// A replace transaction was opened.
    Begin,
    /// The table was truncated inside a transaction.
    Truncate,
    /// A chunk of the given size was inserted.
    InsertChunk(usize),
    /// The transaction committed.
    Commit,
    /// The transaction rolled back.
    Rollback,
    /// Every row was read.
    ListAll,
}

#[derive(Debug, Default)]
struct Failures {
    begin: bool,
    chunk: Option<usize>,
    commit: bool,
    rollback: bool,
    reads: bool,
}

#[derive(Debug, Default)]
struct StoreState {
    rows: Vec<PointOfInterest>,
    next_id: PoiId,
    journal: Vec<StoreCall>,
    failures: Failures,
    yield_on_insert: bool,
}

impl StoreState {
    fn append(&mut self, candidates: impl IntoIterator<Item = NewPoi>) {
        for candidate in candidates {
            self.next_id += 1;
            self.rows.push(PointOfInterest::new(self.next_id, candidate));
        }
    }
}

/// Shared in-memory implementation of [`PoiRepository`] and [`PoiStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryPoiStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryPoiStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `candidates`, numbered from 1.
    pub fn with_pois(candidates: impl IntoIterator<Item = NewPoi>) -> Self {
        let store = Self::new();
        store.lock().append(candidates);
        store
    }

    /// Store pre-populated from `(name, latitude, longitude)` tuples.
    pub fn with_named(rows: &[(&str, f64, f64)]) -> Self {
        Self::with_pois(rows.iter().map(|(name, latitude, longitude)| {
            match NewPoi::try_new(*name, *latitude, *longitude) {
                Ok(candidate) => candidate,
                Err(error) => panic!("invalid fixture poi {name}: {error}"),
            }
        }))
    }

    /// Fail `begin_replace` with a connection error.
    pub fn fail_on_begin(self) -> Self {
        self.lock().failures.begin = true;
        self
    }

    /// Fail the zero-based `index`th chunk insert of every transaction.
    pub fn fail_on_chunk(self, index: usize) -> Self {
        self.lock().failures.chunk = Some(index);
        self
    }

    /// Fail every commit.
    pub fn fail_on_commit(self) -> Self {
        self.lock().failures.commit = true;
        self
    }

    /// Fail every rollback.
    pub fn fail_on_rollback(self) -> Self {
        self.lock().failures.rollback = true;
        self
    }

    /// Fail every read with a query error.
    pub fn fail_on_reads(self) -> Self {
        self.lock().failures.reads = true;
        self
    }

    /// Yield to the scheduler after every chunk insert so concurrent
    /// transactions get a chance to interleave.
    pub fn yield_on_insert(self) -> Self {
        self.lock().yield_on_insert = true;
        self
    }

    /// Committed rows ordered by identifier.
    pub fn snapshot(&self) -> Vec<PointOfInterest> {
        self.lock().rows.clone()
    }

    /// Every storage call observed so far.
    pub fn journal(&self) -> Vec<StoreCall> {
        self.lock().journal.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PoiRepository for InMemoryPoiStore {
    async fn list_all(&self) -> Result<Vec<PointOfInterest>, PoiRepositoryError> {
        let mut state = self.lock();
        state.journal.push(StoreCall::ListAll);
        if state.failures.reads {
            return Err(PoiRepositoryError::query("injected read failure"));
        }
        Ok(state.rows.clone())
    }
}

#[async_trait]
impl PoiStore for InMemoryPoiStore {
    async fn begin_replace(&self) -> Result<Box<dyn PoiReplaceTransaction>, PoiStoreError> {
        let mut state = self.lock();
        if state.failures.begin {
            return Err(PoiStoreError::connection("injected connection failure"));
        }
        state.journal.push(StoreCall::Begin);
        Ok(Box::new(InMemoryReplaceTransaction {
            store: self.clone(),
            truncated: false,
            staged: Vec::new(),
            chunks: 0,
        }))
    }
}

struct InMemoryReplaceTransaction {
    store: InMemoryPoiStore,
    truncated: bool,
    staged: Vec<NewPoi>,
    chunks: usize,
}

#[async_trait]
impl PoiReplaceTransaction for InMemoryReplaceTransaction {
    async fn truncate(&mut self) -> Result<(), PoiStoreError> {
        self.store.lock().journal.push(StoreCall::Truncate);
        self.truncated = true;
        self.staged.clear();
        Ok(())
    }

    async fn insert_chunk(&mut self, rows: &[NewPoi]) -> Result<u64, PoiStoreError> {
        let index = self.chunks;
        self.chunks += 1;
        let yield_now = {
            let mut state = self.store.lock();
            state.journal.push(StoreCall::InsertChunk(rows.len()));
            if state.failures.chunk == Some(index) {
                return Err(PoiStoreError::query(format!(
                    "injected failure on chunk {index}"
                )));
            }
            state.yield_on_insert
        };
        if yield_now {
            tokio::task::yield_now().await;
        }
        self.staged.extend_from_slice(rows);
        u64::try_from(rows.len()).map_err(|err| PoiStoreError::query(err.to_string()))
    }

    async fn commit(self: Box<Self>) -> Result<(), PoiStoreError> {
        let this = *self;
        let mut state = this.store.lock();
        state.journal.push(StoreCall::Commit);
        if state.failures.commit {
            return Err(PoiStoreError::query("injected commit failure"));
        }
        if this.truncated {
            state.rows.clear();
            state.next_id = 0;
        }
        state.append(this.staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PoiStoreError> {
        let mut state = self.store.lock();
        state.journal.push(StoreCall::Rollback);
        if state.failures.rollback {
            return Err(PoiStoreError::connection("injected rollback failure"));
        }
        Ok(())
    }
}
