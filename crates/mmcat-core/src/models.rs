//! Data models for mmcat

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Category that ambiguous and invalid assignments fall back to
pub const FALLBACK_CATEGORY: &str = "Uncategorized";

/// MoneyMoney transaction identifier
///
/// Opaque to mmcat. MoneyMoney assigns integers, AI providers may echo them
/// back either as numbers or as strings, so both are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TransactionId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s.trim().to_string()),
        })
    }
}

/// A transaction as exported by MoneyMoney
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub booking_date: Option<NaiveDate>,
    /// Payee / recipient
    pub name: String,
    /// Free-text purpose (Verwendungszweck)
    pub purpose: String,
    /// Negative = expense, positive = income
    pub amount: f64,
    pub currency: String,
    /// Settled (true) or pending (false)
    pub booked: bool,
    pub category: Option<String>,
}

impl Transaction {
    /// Description sent to the AI provider: "recipient - purpose"
    pub fn description(&self) -> String {
        format!("{} - {}", self.name, self.purpose)
    }
}

/// One entry of the batched classification request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationItem {
    pub id: TransactionId,
    pub detail: String,
}

impl From<&Transaction> for ClassificationItem {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.clone(),
            detail: tx.description(),
        }
    }
}

/// One entry of the provider's reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryAssignment {
    pub id: TransactionId,
    pub category: String,
}

/// Transaction id -> category label, ready to be written back
pub type CategoryMap = BTreeMap<TransactionId, String>;

/// Closed set of category labels the provider may choose from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    labels: Vec<String>,
    fallback: String,
}

impl CategorySet {
    /// Build a category set
    ///
    /// Labels are trimmed and de-duplicated (first occurrence wins). The
    /// fallback is inserted at the front when it is not already listed.
    pub fn new<I, S>(labels: I, fallback: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fallback = fallback.trim().to_string();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() {
                continue;
            }
            if seen.insert(label.to_string()) {
                out.push(label.to_string());
            }
        }

        if !seen.contains(&fallback) {
            out.insert(0, fallback.clone());
        }

        Self {
            labels: out,
            fallback,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Resolve a provider-supplied label to a canonical member of the set
    ///
    /// Exact matches win; otherwise a case-insensitive, whitespace-trimmed
    /// match returns the canonical spelling. Returns `None` for labels that
    /// are not in the set at all.
    pub fn resolve(&self, label: &str) -> Option<&str> {
        if let Some(exact) = self.labels.iter().find(|l| *l == label) {
            return Some(exact);
        }
        let wanted = label.trim().to_lowercase();
        self.labels
            .iter()
            .find(|l| l.to_lowercase() == wanted)
            .map(String::as_str)
    }

    /// Like [`resolve`](Self::resolve), but out-of-set labels become the fallback
    pub fn coerce(&self, label: &str) -> &str {
        self.resolve(label).unwrap_or(&self.fallback)
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORIES, FALLBACK_CATEGORY)
    }
}

/// Categories used when the config file does not list any
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Uncategorized",
    "Auto",
    "Family",
    "Health & Personal Care",
    "Household & Home",
    "Leisure & Entertainment",
    "Miscellaneous",
    "Pets",
    "Shopping",
    "Tax",
    "Travel & Transportation",
    "AVC",
    "Pension",
    "Real Estate",
    "Rental Income",
    "Savings",
    "Online Services",
    "Deposit",
    "Insurance",
    "Business Expenses",
    "Utilities",
    "Investments",
];
