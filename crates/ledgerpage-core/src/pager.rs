//! Keyset pagination
//!
//! Pages are always returned newest first (descending id). A forward request
//! continues toward smaller ids than the cursor, a backward request returns
//! toward larger ids. Every fetch asks the store for one row more than the
//! page size so `has_more` never needs a second round trip.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use ledgerpage_utils::elapsed_ms;

use crate::cursor::Cursor;
use crate::error::{CoreError, CoreResult, ErrorContext, ErrorLogger};
use crate::filter::{Filter, OwnerScope, Record};
use crate::store::{IdBound, Query, RecordStore, StoreError};
use crate::types::{Direction, SortOrder};

/// Count threshold above which a warning is logged
pub const DEFAULT_MAX_COUNT_LIMIT: u64 = 10_000;

/// Parameters of one page request
#[derive(Debug, Clone, PartialEq)]
pub struct PageParams {
    pub owner_scope: OwnerScope,
    pub limit: usize,
    /// Opaque cursor from a previous response; `None` starts at the newest row
    pub cursor: Option<String>,
    pub direction: Direction,
    pub filters: Vec<Filter>,
    /// Also compute the total number of matching rows
    pub enable_count: bool,
    pub max_count_limit: u64,
}

impl PageParams {
    pub fn new(owner_scope: OwnerScope, limit: usize) -> Self {
        Self {
            owner_scope,
            limit,
            cursor: None,
            direction: Direction::Forward,
            filters: Vec::new(),
            enable_count: false,
            max_count_limit: DEFAULT_MAX_COUNT_LIMIT,
        }
    }

    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_count(mut self, enable_count: bool) -> Self {
        self.enable_count = enable_count;
        self
    }

    pub fn with_max_count_limit(mut self, max_count_limit: u64) -> Self {
        self.max_count_limit = max_count_limit;
        self
    }
}

/// Cursor metadata of a page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Continue toward older rows; `None` at the end of the set
    pub next_cursor: Option<Cursor>,
    /// Return toward newer rows; `None` when nothing newer exists
    pub prev_cursor: Option<Cursor>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

/// Timing metrics of a page, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMeta {
    pub query_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count_query_time: Option<f64>,
    pub items_returned: usize,
    pub cursor_used: bool,
}

/// One page of rows plus navigation and timing metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<R> {
    pub data: Vec<R>,
    pub pagination: PaginationMeta,
    pub performance: PerformanceMeta,
}

/// Keyset pager over an injected record store
pub struct KeysetPager<S: RecordStore + ?Sized> {
    store: Arc<S>,
    logger: Arc<dyn ErrorLogger>,
}

impl<S: RecordStore + ?Sized> Clone for KeysetPager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            logger: Arc::clone(&self.logger),
        }
    }
}

impl<S: RecordStore + ?Sized> KeysetPager<S> {
    pub fn new(store: Arc<S>, logger: Arc<dyn ErrorLogger>) -> Self {
        Self { store, logger }
    }

    /// Fetch one page.
    ///
    /// The optional count runs concurrently with the main fetch and is
    /// bounded only by scope and filters, never by the cursor.
    pub async fn page(&self, params: &PageParams) -> CoreResult<PageResult<S::Row>> {
        if params.limit == 0 {
            return Err(CoreError::InvalidRequest {
                message: "limit must be at least 1".to_string(),
            });
        }
        let take = params.limit.checked_add(1).ok_or_else(|| CoreError::InvalidRequest {
            message: format!("limit {} is too large", params.limit),
        })?;

        let cursor_id = params.cursor.as_deref().map(Cursor::decode).transpose()?;
        let context = Self::context(params);

        let id_bound = cursor_id.map(|id| match params.direction {
            Direction::Forward => IdBound::Lt(id),
            Direction::Backward => IdBound::Gt(id),
        });
        let base = Query::new(params.owner_scope).with_filters(params.filters.clone());
        let fetch_query = base
            .clone()
            .with_id_bound(id_bound)
            .order_by(params.direction.scan_order())
            .take(take);

        let fetch = async {
            let start = Instant::now();
            let rows = self.store.find_many(&fetch_query).await;
            (rows, elapsed_ms(start))
        };
        let count = async {
            if !params.enable_count {
                return None;
            }
            let start = Instant::now();
            let total = self.store.count(&base).await;
            Some((total, elapsed_ms(start)))
        };
        let ((fetched, query_time), counted) = tokio::join!(fetch, count);

        let mut rows = fetched.map_err(|e| self.store_failure(e, "findMany", &context))?;
        if params.direction == Direction::Backward {
            rows.reverse();
        }
        let has_more = rows.len() > params.limit;
        rows.truncate(params.limit);

        let next_cursor = match rows.last() {
            Some(last) if has_more => Some(Cursor::encode(last.id())),
            _ => None,
        };

        let prev_cursor = match rows.first() {
            Some(first) => {
                let probe = base
                    .clone()
                    .with_id_bound(Some(IdBound::Gt(first.id())))
                    .order_by(SortOrder::Asc)
                    .take(1);
                let newer = self
                    .store
                    .find_first(&probe)
                    .await
                    .map_err(|e| self.store_failure(e, "findFirst", &context))?;
                newer.map(|_| Cursor::encode(first.id()))
            }
            None => None,
        };

        let (total_count, total_count_query_time) = match counted {
            Some((total, elapsed)) => {
                let total = total.map_err(|e| self.store_failure(e, "count", &context))?;
                if total > params.max_count_limit {
                    self.logger.log_warning(
                        &format!(
                            "total count {} exceeds max count limit {}",
                            total, params.max_count_limit
                        ),
                        &context
                            .clone()
                            .with_data("totalCount", serde_json::json!(total))
                            .with_data("maxCountLimit", serde_json::json!(params.max_count_limit)),
                    );
                }
                (Some(total), Some(elapsed))
            }
            None => (None, None),
        };

        let performance = PerformanceMeta {
            query_time,
            total_count_query_time,
            items_returned: rows.len(),
            cursor_used: cursor_id.is_some(),
        };
        self.logger.log_debug(
            "page served",
            &context
                .clone()
                .with_data("itemsReturned", serde_json::json!(performance.items_returned))
                .with_data("queryTime", serde_json::json!(performance.query_time)),
        );

        Ok(PageResult {
            data: rows,
            pagination: PaginationMeta {
                next_cursor,
                prev_cursor,
                has_more,
                total_count,
            },
            performance,
        })
    }

    fn context(params: &PageParams) -> ErrorContext {
        let fields: Vec<&str> = params.filters.iter().flat_map(|f| f.fields()).collect();
        ErrorContext::new("page".to_string())
            .with_scope(params.owner_scope.masked())
            .with_data("cursor", serde_json::json!(params.cursor))
            .with_data("limit", serde_json::json!(params.limit))
            .with_data("direction", serde_json::json!(params.direction.to_string()))
            .with_data("filters", serde_json::json!(fields))
    }

    fn store_failure(&self, source: StoreError, query: &str, context: &ErrorContext) -> CoreError {
        let error = CoreError::from(source);
        self.logger
            .log_error(&error, &context.clone().with_data("query", serde_json::json!(query)));
        error
    }
}
