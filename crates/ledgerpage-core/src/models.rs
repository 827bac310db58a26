//! Ledger row models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::filter::{FieldValue, Record};
use crate::types::TransactionType;

/// Household ledger transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique, auto-incrementing identifier
    pub id: i64,
    /// User who recorded the transaction
    pub owner_user_id: i64,
    /// Group the transaction is shared with
    #[serde(default)]
    pub group_id: Option<i64>,
    /// Income, expense or transfer
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Amount, always positive; the type carries the sign
    pub amount: Decimal,
    /// Category reference
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Free-text note
    #[serde(default)]
    pub memo: Option<String>,
    /// Merchant or payee
    #[serde(default)]
    pub merchant: Option<String>,
    /// Date the money moved
    pub date: NaiveDate,
    /// When the row was recorded
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Record for Transaction {
    fn id(&self) -> i64 {
        self.id
    }

    fn owner_user_id(&self) -> i64 {
        self.owner_user_id
    }

    fn group_id(&self) -> Option<i64> {
        self.group_id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Int(self.id)),
            "ownerUserId" => Some(FieldValue::Int(self.owner_user_id)),
            "groupId" => self.group_id.map(FieldValue::Int),
            "type" => Some(FieldValue::Text(self.transaction_type.to_string())),
            "amount" => Some(FieldValue::Decimal(self.amount)),
            "categoryId" => self.category_id.map(FieldValue::Int),
            "memo" => self.memo.clone().map(FieldValue::Text),
            "merchant" => self.merchant.clone().map(FieldValue::Text),
            "date" => Some(FieldValue::Date(self.date)),
            "createdAt" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn coffee() -> Transaction {
        Transaction {
            id: 10,
            owner_user_id: 123,
            group_id: None,
            transaction_type: TransactionType::Expense,
            amount: Decimal::from_str("5.50").unwrap(),
            category_id: Some(5),
            memo: Some("Morning coffee".to_string()),
            merchant: Some("Cafe".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            created_at: DateTime::parse_from_rfc3339("2024-01-10T08:30:00Z").unwrap().with_timezone(&Utc),
        }
    }

    #[test]
    fn test_record_fields() {
        let tx = coffee();
        assert_eq!(tx.field("type"), Some(FieldValue::from("EXPENSE")));
        assert_eq!(tx.field("categoryId"), Some(FieldValue::Int(5)));
        assert_eq!(tx.field("groupId"), None);
        assert_eq!(tx.field("unknown"), None);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(coffee()).unwrap();
        assert_eq!(json["type"], "EXPENSE");
        assert_eq!(json["ownerUserId"], 123);
        assert_eq!(json["categoryId"], 5);
        assert_eq!(json["amount"], "5.50");
        assert_eq!(json["date"], "2024-01-10");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let tx: Transaction = serde_json::from_str(
            r#"{"id": 1, "ownerUserId": 7, "type": "INCOME", "amount": "1200", "date": "2024-02-01"}"#,
        )
        .unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Income);
        assert!(tx.memo.is_none());
        assert!(tx.group_id.is_none());
    }
}
