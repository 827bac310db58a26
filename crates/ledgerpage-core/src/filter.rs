//! Typed filters and owner scoping
//!
//! Every query carries exactly one [`OwnerScope`] plus any number of
//! [`Filter`]s; all of them are combined with AND.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;

use ledgerpage_utils::mask_identifier;

/// A row that can be paginated: a unique, ordered id plus named fields
pub trait Record: Clone + Send + Sync + 'static {
    /// Unique, monotonically increasing identifier
    fn id(&self) -> i64;
    /// User that owns the row
    fn owner_user_id(&self) -> i64;
    /// Group (couple/household) the row is shared with, if any
    fn group_id(&self) -> Option<i64>;
    /// Value of a filterable field, `None` when absent
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Value a filter compares a row field against
#[derive(Debug, Clone)]
pub enum FieldValue {
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Compare two values of compatible kinds; `None` for mismatched kinds
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Int(a), FieldValue::Int(b)) => Some(a.cmp(b)),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => Some(a.cmp(b)),
            (FieldValue::Int(a), FieldValue::Decimal(b)) => Some(Decimal::from(*a).cmp(b)),
            (FieldValue::Decimal(a), FieldValue::Int(b)) => Some(a.cmp(&Decimal::from(*b))),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Date(b)) => Some(a.date_naive().cmp(b)),
            (FieldValue::Date(a), FieldValue::Timestamp(b)) => Some(a.cmp(&b.date_naive())),
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

/// Optional range bounds; unset bounds do not constrain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeBounds {
    pub gte: Option<FieldValue>,
    pub lte: Option<FieldValue>,
    pub gt: Option<FieldValue>,
    pub lt: Option<FieldValue>,
}

impl RangeBounds {
    pub fn gte(mut self, value: impl Into<FieldValue>) -> Self {
        self.gte = Some(value.into());
        self
    }

    pub fn lte(mut self, value: impl Into<FieldValue>) -> Self {
        self.lte = Some(value.into());
        self
    }

    pub fn gt(mut self, value: impl Into<FieldValue>) -> Self {
        self.gt = Some(value.into());
        self
    }

    pub fn lt(mut self, value: impl Into<FieldValue>) -> Self {
        self.lt = Some(value.into());
        self
    }

    /// True when no bound is set
    pub fn is_unbounded(&self) -> bool {
        self.gte.is_none() && self.lte.is_none() && self.gt.is_none() && self.lt.is_none()
    }

    fn contains(&self, value: &FieldValue) -> bool {
        let holds = |bound: &Option<FieldValue>, accept: &[Ordering]| match bound {
            Some(bound) => value
                .compare(bound)
                .map_or(false, |ordering| accept.contains(&ordering)),
            None => true,
        };

        holds(&self.gte, &[Ordering::Greater, Ordering::Equal])
            && holds(&self.lte, &[Ordering::Less, Ordering::Equal])
            && holds(&self.gt, &[Ordering::Greater])
            && holds(&self.lt, &[Ordering::Less])
    }
}

/// Field-level condition ANDed into every query
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value
    Equals { field: String, value: FieldValue },
    /// Field lies within bounds
    Range { field: String, bounds: RangeBounds },
    /// Any of the text fields contains the term, ignoring case
    Search { fields: Vec<String>, term: String },
}

impl Filter {
    pub fn equals(field: &str, value: impl Into<FieldValue>) -> Self {
        Filter::Equals {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn range(field: &str, bounds: RangeBounds) -> Self {
        Filter::Range {
            field: field.to_string(),
            bounds,
        }
    }

    pub fn search(fields: &[&str], term: &str) -> Self {
        Filter::Search {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            term: term.to_string(),
        }
    }

    /// Check whether a row satisfies this filter
    pub fn matches<R: Record>(&self, row: &R) -> bool {
        match self {
            Filter::Equals { field, value } => row.field(field).map_or(false, |v| v == *value),
            Filter::Range { field, bounds } => row.field(field).map_or(false, |v| bounds.contains(&v)),
            Filter::Search { fields, term } => {
                let term = term.to_lowercase();
                fields.iter().any(|field| match row.field(field) {
                    Some(FieldValue::Text(text)) => text.to_lowercase().contains(&term),
                    _ => false,
                })
            }
        }
    }

    /// Field names this filter reads, for log context
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Filter::Equals { field, .. } | Filter::Range { field, .. } => vec![field.as_str()],
            Filter::Search { fields, .. } => fields.iter().map(String::as_str).collect(),
        }
    }
}

/// Mandatory access-control condition on every query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// Rows owned by this user
    User(i64),
    /// Rows shared with this group
    Group(i64),
    /// Rows owned by the user or shared with the group
    UserOrGroup { user_id: i64, group_id: i64 },
}

impl OwnerScope {
    /// Check whether a row is visible within this scope
    pub fn matches<R: Record>(&self, row: &R) -> bool {
        match *self {
            OwnerScope::User(user_id) => row.owner_user_id() == user_id,
            OwnerScope::Group(group_id) => row.group_id() == Some(group_id),
            OwnerScope::UserOrGroup { user_id, group_id } => {
                row.owner_user_id() == user_id || row.group_id() == Some(group_id)
            }
        }
    }

    /// Scope description with identifiers masked, for log lines
    pub fn masked(&self) -> String {
        match *self {
            OwnerScope::User(user_id) => format!("user:{}", mask_identifier(&user_id.to_string())),
            OwnerScope::Group(group_id) => format!("group:{}", mask_identifier(&group_id.to_string())),
            OwnerScope::UserOrGroup { user_id, group_id } => format!(
                "user:{}|group:{}",
                mask_identifier(&user_id.to_string()),
                mask_identifier(&group_id.to_string())
            ),
        }
    }
}
