//! Shared fixtures for unit tests

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::ops::RangeInclusive;
use std::sync::Mutex;

use crate::error::{CoreError, ErrorContext, ErrorLogger};
use crate::filter::OwnerScope;
use crate::models::Transaction;
use crate::store::{MemoryStore, Query, RecordStore, StoreError};
use crate::types::TransactionType;

pub const OWNER: i64 = 123;

pub fn scope() -> OwnerScope {
    OwnerScope::User(OWNER)
}

/// Rows owned by [`OWNER`]; odd ids are expenses, even ids are income
pub fn ledger_rows(ids: RangeInclusive<i64>) -> Vec<Transaction> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    ids.map(|id| Transaction {
        id,
        owner_user_id: OWNER,
        group_id: None,
        transaction_type: if id % 2 == 1 {
            TransactionType::Expense
        } else {
            TransactionType::Income
        },
        amount: Decimal::new(id * 250, 2),
        category_id: Some(id % 3),
        memo: Some(format!("entry {}", id)),
        merchant: if id % 2 == 1 { Some("Corner Grocery".to_string()) } else { None },
        date: start + Duration::days(id),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(id),
    })
    .collect()
}

/// Which store primitive was called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    FindMany,
    FindFirst,
    Count,
}

/// Memory store wrapper that records every query it answers
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore<Transaction>,
    calls: Mutex<Vec<(Call, Query)>>,
}

impl RecordingStore {
    pub fn new(rows: Vec<Transaction>) -> Self {
        Self {
            inner: MemoryStore::new(rows),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self, kind: Call) -> Vec<Query> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(call, _)| *call == kind)
            .map(|(_, query)| query.clone())
            .collect()
    }

    fn record(&self, kind: Call, query: &Query) {
        self.calls.lock().unwrap().push((kind, query.clone()));
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    type Row = Transaction;

    async fn find_many(&self, query: &Query) -> Result<Vec<Transaction>, StoreError> {
        self.record(Call::FindMany, query);
        self.inner.find_many(query).await
    }

    async fn find_first(&self, query: &Query) -> Result<Option<Transaction>, StoreError> {
        self.record(Call::FindFirst, query);
        self.inner.find_first(query).await
    }

    async fn count(&self, query: &Query) -> Result<u64, StoreError> {
        self.record(Call::Count, query);
        self.inner.count(query).await
    }
}

/// Store that answers reads from memory but fails the selected primitive
pub struct FailingStore {
    inner: MemoryStore<Transaction>,
    fails: Call,
}

impl FailingStore {
    pub fn new(rows: Vec<Transaction>, fails: Call) -> Self {
        Self {
            inner: MemoryStore::new(rows),
            fails,
        }
    }

    fn check(&self, kind: Call) -> Result<(), StoreError> {
        if kind == self.fails {
            return Err(StoreError::Unavailable {
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    type Row = Transaction;

    async fn find_many(&self, query: &Query) -> Result<Vec<Transaction>, StoreError> {
        self.check(Call::FindMany)?;
        self.inner.find_many(query).await
    }

    async fn find_first(&self, query: &Query) -> Result<Option<Transaction>, StoreError> {
        self.check(Call::FindFirst)?;
        self.inner.find_first(query).await
    }

    async fn count(&self, query: &Query) -> Result<u64, StoreError> {
        self.check(Call::Count)?;
        self.inner.count(query).await
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: log::Level,
    pub message: String,
    pub context: ErrorContext,
}

/// Logger that keeps every entry for later assertions
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn entries(&self, level: log::Level) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.level == level)
            .cloned()
            .collect()
    }

    fn push(&self, level: log::Level, message: String, context: &ErrorContext) {
        self.entries.lock().unwrap().push(LogEntry {
            level,
            message,
            context: context.clone(),
        });
    }
}

impl ErrorLogger for RecordingLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        self.push(log::Level::Error, error.to_string(), context);
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        self.push(log::Level::Warn, message.to_string(), context);
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        self.push(log::Level::Debug, message.to_string(), context);
    }
}
