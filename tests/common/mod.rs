#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use wallet_core::{
    ledger::{FixedClock, TransactionKind, TransactionLedger},
    money::Money,
};

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

pub fn fixed_clock() -> FixedClock {
    FixedClock(at(15, 9))
}

pub fn major(amount: i64) -> Money {
    Money::from_major(amount)
}

/// Salary 10000, Food planned 5000, Food spent 2000.
pub fn household_ledger() -> TransactionLedger {
    let mut ledger = TransactionLedger::new();
    ledger
        .add_at("Salary", major(10_000), TransactionKind::Income, at(1, 10))
        .unwrap();
    ledger
        .add_at("Food", major(5_000), TransactionKind::OutcomePlanned, at(2, 10))
        .unwrap();
    ledger
        .add_at("Food", major(2_000), TransactionKind::OutcomeSpent, at(3, 10))
        .unwrap();
    ledger
}
