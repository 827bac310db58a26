//! Keyset pagination over household ledger records
//!
//! [`KeysetPager`] turns a [`PageParams`] request into at most three reads
//! against an injected [`RecordStore`]: the overfetching page query, a probe
//! for newer rows and an optional count. [`LegacyAdapter`] serves old
//! page-number callers through the same path.

pub mod cursor;
pub mod error;
pub mod filter;
pub mod legacy;
pub mod models;
pub mod pager;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use cursor::Cursor;
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorLogger, ErrorSeverity};
pub use filter::{FieldValue, Filter, OwnerScope, RangeBounds, Record};
pub use legacy::{CursorParams, LegacyAdapter, LegacyPage, LegacyPagination, LegacyParams};
pub use models::Transaction;
pub use pager::{KeysetPager, PageParams, PageResult, PaginationMeta, PerformanceMeta};
pub use store::{IdBound, MemoryStore, Query, RecordStore, StoreError};
pub use types::{Direction, SortOrder, TransactionType};
