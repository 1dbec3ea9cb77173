//! MoneyMoney property list export parsing
//!
//! `export transactions ... as "plist"` prints a dictionary with a
//! `transactions` array. Each entry carries (among others) `id`,
//! `bookingDate`, `name`, `purpose`, `amount`, `currency`, `booked` and
//! `category`. Missing text fields are read as empty strings and a missing
//! `booked` flag as pending.

use std::io::Cursor;
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDate};
use plist::{Dictionary, Value};

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionId};

/// Parse a MoneyMoney export (XML or binary plist) into transactions
///
/// A document without a `transactions` key yields an empty list.
pub fn parse_export(bytes: &[u8]) -> Result<Vec<Transaction>> {
    let value = Value::from_reader(Cursor::new(bytes))?;

    let root = value
        .as_dictionary()
        .ok_or_else(|| Error::InvalidData("Export is not a dictionary".into()))?;

    let Some(entries) = root.get("transactions") else {
        return Ok(Vec::new());
    };
    let entries = entries
        .as_array()
        .ok_or_else(|| Error::InvalidData("'transactions' is not an array".into()))?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let dict = entry.as_dictionary().ok_or_else(|| {
                Error::InvalidData(format!("Transaction #{} is not a dictionary", index))
            })?;
            parse_transaction(dict)
                .map_err(|e| Error::InvalidData(format!("Transaction #{}: {}", index, e)))
        })
        .collect()
}

fn parse_transaction(dict: &Dictionary) -> Result<Transaction> {
    let id = match dict.get("id") {
        Some(v) => parse_id(v)?,
        None => return Err(Error::InvalidData("missing id".into())),
    };

    let amount = match dict.get("amount") {
        None => 0.0,
        Some(v) => v
            .as_real()
            .or_else(|| v.as_signed_integer().map(|n| n as f64))
            .ok_or_else(|| Error::InvalidData("amount is not a number".into()))?,
    };

    Ok(Transaction {
        id,
        booking_date: dict.get("bookingDate").and_then(date_value),
        name: string_value(dict, "name"),
        purpose: string_value(dict, "purpose"),
        amount,
        currency: string_value(dict, "currency"),
        booked: dict
            .get("booked")
            .and_then(Value::as_boolean)
            .unwrap_or(false),
        category: dict
            .get("category")
            .and_then(Value::as_string)
            .map(str::to_string),
    })
}

fn parse_id(value: &Value) -> Result<TransactionId> {
    if let Some(n) = value.as_signed_integer() {
        return Ok(n.into());
    }
    if let Some(n) = value.as_unsigned_integer() {
        return Ok(TransactionId::new(n.to_string()));
    }
    match value.as_string().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.into()),
        _ => Err(Error::InvalidData("id is neither an integer nor a string".into())),
    }
}

fn string_value(dict: &Dictionary, key: &str) -> String {
    dict.get(key)
        .and_then(Value::as_string)
        .unwrap_or_default()
        .to_string()
}

fn date_value(value: &Value) -> Option<NaiveDate> {
    let date = value.as_date()?;
    let time: SystemTime = date.into();
    Some(DateTime::<Local>::from(time).date_naive())
}
