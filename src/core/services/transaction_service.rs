use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::errors::{Result, WalletError};
use crate::ledger::{Namespace, Transaction, TransactionLedger};

const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";
const DATE_FORMAT: &str = "%d.%m.%Y";

/// Filters applied when listing wallet activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub category: Option<String>,
    pub namespace: Option<Namespace>,
    /// Keep only the most recent `n` matches.
    pub last: Option<usize>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TransactionQuery {
    pub fn matches(&self, txn: &Transaction) -> bool {
        self.category.as_deref().map_or(true, |c| txn.category == c)
            && self.namespace.map_or(true, |ns| txn.namespace() == ns)
            && self.from.map_or(true, |from| txn.timestamp >= from)
            && self.to.map_or(true, |to| txn.timestamp <= to)
    }
}

pub struct TransactionService;

impl TransactionService {
    /// Returns matching transactions in ledger order, trimmed to the last `n`.
    pub fn list(ledger: &TransactionLedger, query: &TransactionQuery) -> Vec<Transaction> {
        let mut filtered: Vec<Transaction> = ledger
            .transactions()
            .iter()
            .filter(|txn| query.matches(txn))
            .cloned()
            .collect();
        if let Some(last) = query.last {
            if last > 0 && last < filtered.len() {
                filtered.drain(..filtered.len() - last);
            }
        }
        filtered
    }

    /// Parses `dd.mm.yyyy hh:mm` or `dd.mm.yyyy`; a bare date means 23:59 that day.
    pub fn parse_datetime_bound(input: &str) -> Result<DateTime<Utc>> {
        let trimmed = input.trim();
        let naive = NaiveDateTime::parse_from_str(trimmed, DATE_TIME_FORMAT)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                    .ok()
                    .and_then(|date| NaiveTime::from_hms_opt(23, 59, 0).map(|t| date.and_time(t)))
            })
            .ok_or_else(|| {
                WalletError::InvalidInput(format!(
                    "`{trimmed}` is not a date; use dd.mm.yyyy [hh:mm]"
                ))
            })?;
        Ok(Utc.from_utc_datetime(&naive))
    }
}
