// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    pub id: i64,
    pub isocode: String,
    pub symbol: String,
    pub name: String,
    /// Units of this currency per one unit of the common reference;
    /// None means not convertible.
    pub rate: Option<Decimal>,
    /// None marks a globally visible currency.
    pub owner: Option<String>,
}

impl Currency {
    pub fn is_global(&self) -> bool {
        self.owner.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub currency: String,
    pub start_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub currency: String,
    pub parent: Option<i64>,
}

/// A category with its immediate children only; deeper levels are
/// deliberately not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSplit {
    pub account_id: i64,
    pub amount: Decimal,
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySplit {
    pub category_id: i64,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub description: String,
    pub original_description: String,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    pub account_splits: Vec<AccountSplit>,
    pub category_splits: Vec<CategorySplit>,
}

/// Aggregate balance in the user's preferred currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Total {
    pub balance: Decimal,
    pub currency: String,
}

/// An update field that was not applied, and why. Replaces the silent
/// suppression the permissive-update paths would otherwise have.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedField {
    pub field: &'static str,
    pub reason: String,
}

/// Result of a partial-tolerant update: the record as persisted plus any
/// requested fields that were skipped.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome<T> {
    pub record: T,
    pub skipped: Vec<SkippedField>,
}
