//! Transactions API endpoints
//!
//! `GET /api/transactions` serves cursor pages. Requests that carry a `page`
//! number and no `cursor` are answered in the legacy page-number shape.

use crate::{ApiError, AppState};
use axum::extract::Query;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use ledgerpage_core::{Direction, Filter, LegacyParams, OwnerScope, PageParams, RangeBounds, TransactionType};
use std::collections::HashMap;
use std::str::FromStr;

pub const USER_HEADER: &str = "x-user-id";
pub const GROUP_HEADER: &str = "x-group-id";

/// Text fields matched by the `search` parameter
const SEARCH_FIELDS: [&str; 2] = ["memo", "merchant"];

/// List transactions, newest first (JSON API)
pub async fn api_transactions(
    state: axum::extract::State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let scope = owner_scope(&headers)?;
    let filters = transaction_filters(&params)?;
    let pagination = &state.config.pagination;

    let limit: Option<usize> = parse_param(&params, "limit")?;
    let page: Option<i64> = parse_param(&params, "page")?;
    let enable_count = parse_param::<bool>(&params, "count")?.unwrap_or(pagination.enable_count);
    let cursor = params.get("cursor").filter(|c| !c.is_empty()).cloned();

    if cursor.is_some() || page.is_none() {
        let direction: Direction = parse_param(&params, "direction")?.unwrap_or_default();
        let page_params = PageParams::new(scope, pagination.clamp_limit(limit))
            .with_cursor(cursor)
            .with_direction(direction)
            .with_filters(filters)
            .with_count(enable_count)
            .with_max_count_limit(pagination.max_count_limit);

        let result = state.pager.page(&page_params).await?;
        return Ok(Json(result).into_response());
    }

    let legacy = LegacyParams {
        page,
        limit: limit.map(|limit| pagination.clamp_limit(Some(limit))),
    };
    let page_params = state
        .legacy
        .from_legacy_params(&legacy)
        .into_page_params(scope, filters)
        .with_count(enable_count)
        .with_max_count_limit(pagination.max_count_limit);

    let result = state.pager.page(&page_params).await?;
    Ok(Json(state.legacy.to_legacy_format(result, legacy.page())).into_response())
}

/// Owner scope from the caller identity headers
pub fn owner_scope(headers: &HeaderMap) -> Result<OwnerScope, ApiError> {
    let user_id = header_id(headers, USER_HEADER)
        .ok_or_else(|| ApiError::Unauthorized {
            message: format!("missing or invalid {} header", USER_HEADER),
        })?;

    match headers.get(GROUP_HEADER) {
        None => Ok(OwnerScope::User(user_id)),
        Some(_) => {
            let group_id = header_id(headers, GROUP_HEADER).ok_or_else(|| ApiError::BadRequest {
                message: format!("invalid {} header", GROUP_HEADER),
            })?;
            Ok(OwnerScope::UserOrGroup { user_id, group_id })
        }
    }
}

fn header_id(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Build the AND-ed filter list from query parameters
pub fn transaction_filters(params: &HashMap<String, String>) -> Result<Vec<Filter>, ApiError> {
    let mut filters = Vec::new();

    if let Some(tx_type) = parse_param::<TransactionType>(params, "type")? {
        filters.push(Filter::equals("type", tx_type.to_string()));
    }

    let start: Option<NaiveDate> = parse_param(params, "startDate")?;
    let end: Option<NaiveDate> = parse_param(params, "endDate")?;
    if start.is_some() || end.is_some() {
        let mut bounds = RangeBounds::default();
        if let Some(start) = start {
            bounds = bounds.gte(start);
        }
        if let Some(end) = end {
            bounds = bounds.lte(end);
        }
        filters.push(Filter::range("date", bounds));
    }

    if let Some(category_id) = parse_param::<i64>(params, "categoryId")? {
        filters.push(Filter::equals("categoryId", category_id));
    }

    if let Some(term) = params.get("search").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        filters.push(Filter::search(&SEARCH_FIELDS, term));
    }

    Ok(filters)
}

/// Parse an optional query parameter; empty values count as absent
fn parse_param<T>(params: &HashMap<String, String>, key: &str) -> Result<Option<T>, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match params.get(key).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse().map(Some).map_err(|e| ApiError::BadRequest {
            message: format!("invalid {} '{}': {}", key, raw, e),
        }),
        None => Ok(None),
    }
}
