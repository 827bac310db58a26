//! Page-number compatibility layer
//!
//! Old callers send `page`/`limit`. They are served the first cursor page
//! and told to migrate; deep page numbers are never turned into offsets.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ErrorContext, ErrorLogger};
use crate::filter::{Filter, OwnerScope};
use crate::pager::{PageParams, PageResult, PerformanceMeta};
use crate::types::Direction;

pub const DEFAULT_LEGACY_LIMIT: usize = 20;

/// Page-number request as sent by old clients
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct LegacyParams {
    pub page: Option<i64>,
    pub limit: Option<usize>,
}

impl LegacyParams {
    /// Requested page, never below 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Cursor request derived from a legacy request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorParams {
    pub cursor: Option<String>,
    pub direction: Direction,
    pub limit: usize,
}

impl CursorParams {
    pub fn into_page_params(self, owner_scope: OwnerScope, filters: Vec<Filter>) -> PageParams {
        PageParams::new(owner_scope, self.limit)
            .with_cursor(self.cursor)
            .with_direction(self.direction)
            .with_filters(filters)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPagination {
    pub page: i64,
    /// Rows actually returned on this page
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Page-number shaped response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPage<R> {
    pub data: Vec<R>,
    pub pagination: LegacyPagination,
    pub performance: PerformanceMeta,
}

pub struct LegacyAdapter {
    logger: Arc<dyn ErrorLogger>,
    default_limit: usize,
}

impl LegacyAdapter {
    pub fn new(logger: Arc<dyn ErrorLogger>) -> Self {
        Self {
            logger,
            default_limit: DEFAULT_LEGACY_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, default_limit: usize) -> Self {
        self.default_limit = default_limit.max(1);
        self
    }

    /// Translate a legacy request into a first-page cursor request
    pub fn from_legacy_params(&self, params: &LegacyParams) -> CursorParams {
        let page = params.page();
        let limit = match params.limit {
            Some(limit) if limit > 0 => limit,
            _ => self.default_limit,
        };

        self.logger.log_warning(
            "page-number pagination is deprecated; pass the returned cursors instead",
            &ErrorContext::new("legacyPage".to_string())
                .with_data("page", serde_json::json!(page))
                .with_data("limit", serde_json::json!(limit)),
        );

        CursorParams {
            cursor: None,
            direction: Direction::Forward,
            limit,
        }
    }

    /// Reshape a cursor page into the page-number response
    pub fn to_legacy_format<R>(&self, result: PageResult<R>, page: i64) -> LegacyPage<R> {
        let limit = result.data.len();
        let total = result.pagination.total_count;
        let total_pages = total.and_then(|total| match limit {
            0 if total == 0 => Some(0),
            0 => None,
            limit => Some(total.div_ceil(limit as u64)),
        });

        LegacyPage {
            pagination: LegacyPagination {
                page,
                limit,
                total,
                total_pages,
                has_next: result.pagination.has_more,
                has_prev: page > 1,
            },
            data: result.data,
            performance: result.performance,
        }
    }
}
