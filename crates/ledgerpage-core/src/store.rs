//! Record store abstraction and the in-memory implementation
//!
//! The pager never talks to a database directly. It builds [`Query`] values
//! and hands them to a [`RecordStore`], which is injected by the caller.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::cmp::Reverse;
use std::path::Path;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::filter::{Filter, OwnerScope, Record};
use crate::types::SortOrder;

/// Keyset condition on the row id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdBound {
    /// id < value
    Lt(i64),
    /// id > value
    Gt(i64),
}

impl IdBound {
    pub fn admits(&self, id: i64) -> bool {
        match *self {
            IdBound::Lt(bound) => id < bound,
            IdBound::Gt(bound) => id > bound,
        }
    }
}

/// One read against the store: scope AND filters AND id bound, ordered by id
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub scope: OwnerScope,
    pub filters: Vec<Filter>,
    pub id_bound: Option<IdBound>,
    pub order: SortOrder,
    pub take: Option<usize>,
}

impl Query {
    /// Unbounded query over everything visible in `scope`, newest first
    pub fn new(scope: OwnerScope) -> Self {
        Self {
            scope,
            filters: Vec::new(),
            id_bound: None,
            order: SortOrder::Desc,
            take: None,
        }
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_id_bound(mut self, id_bound: Option<IdBound>) -> Self {
        self.id_bound = id_bound;
        self
    }

    pub fn order_by(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }

    /// Check whether a row satisfies the scope, the id bound and every filter
    pub fn matches<R: Record>(&self, row: &R) -> bool {
        self.scope.matches(row)
            && self.id_bound.map_or(true, |bound| bound.admits(row.id()))
            && self.filters.iter().all(|filter| filter.matches(row))
    }
}

/// Failures reported by a record store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    #[error("query timed out")]
    Timeout,

    #[error("query rejected: {message}")]
    Query { message: String },
}

/// Read-only query primitives the pager needs from a backing store
#[async_trait]
pub trait RecordStore: Send + Sync {
    type Row: Record;

    /// Rows matching the query, in `query.order`, at most `query.take`
    async fn find_many(&self, query: &Query) -> Result<Vec<Self::Row>, StoreError>;

    /// First row in `query.order` that matches, if any
    async fn find_first(&self, query: &Query) -> Result<Option<Self::Row>, StoreError>;

    /// Number of matching rows; `take` and `order` are ignored
    async fn count(&self, query: &Query) -> Result<u64, StoreError>;
}

/// In-memory record store, used by the server binary and by tests
#[derive(Debug)]
pub struct MemoryStore<R> {
    rows: RwLock<Vec<R>>,
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<R: Record> MemoryStore<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Insert a row, replacing any existing row with the same id
    pub async fn insert(&self, row: R) {
        let mut rows = self.rows.write().await;
        rows.retain(|existing| existing.id() != row.id());
        rows.push(row);
    }

    /// Remove a row by id
    pub async fn remove(&self, id: i64) -> Option<R> {
        let mut rows = self.rows.write().await;
        let position = rows.iter().position(|row| row.id() == id)?;
        Some(rows.remove(position))
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl<R: Record + DeserializeOwned> MemoryStore<R> {
    /// Load rows from a JSON array file
    pub async fn load_json(path: &Path) -> CoreResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let rows: Vec<R> = serde_json::from_str(&content).map_err(|e| CoreError::InvalidFormat {
            message: format!("{}: {}", path.display(), e),
        })?;
        Ok(Self::new(rows))
    }
}

#[async_trait]
impl<R: Record> RecordStore for MemoryStore<R> {
    type Row = R;

    async fn find_many(&self, query: &Query) -> Result<Vec<R>, StoreError> {
        let rows = self.rows.read().await;
        let mut matched: Vec<R> = rows.iter().filter(|row| query.matches(*row)).cloned().collect();

        match query.order {
            SortOrder::Asc => matched.sort_by_key(|row| row.id()),
            SortOrder::Desc => matched.sort_by_key(|row| Reverse(row.id())),
        }
        if let Some(take) = query.take {
            matched.truncate(take);
        }

        Ok(matched)
    }

    async fn find_first(&self, query: &Query) -> Result<Option<R>, StoreError> {
        let rows = self.rows.read().await;
        let matched = rows.iter().filter(|row| query.matches(*row));
        let first = match query.order {
            SortOrder::Asc => matched.min_by_key(|row| row.id()),
            SortOrder::Desc => matched.max_by_key(|row| row.id()),
        };
        Ok(first.cloned())
    }

    async fn count(&self, query: &Query) -> Result<u64, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|row| query.matches(*row)).count() as u64)
    }
}
