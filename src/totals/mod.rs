use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::models::{LedgerRow, LedgerTable, Month};

static PLAIN_AMOUNT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").ok());

/// Coerce a free-form ledger cell to an amount.
///
/// Only a plain non-negative decimal counts. Empty cells, text, negative
/// numbers, exponents and thousands separators all count as zero. Every sum
/// in the crate goes through here.
pub(crate) fn coerce_amount(cell: &str) -> Decimal {
    let trimmed = cell.trim();
    if !is_plain_amount(trimmed) {
        return Decimal::ZERO;
    }
    Decimal::from_str(trimmed).unwrap_or(Decimal::ZERO)
}

/// True when the trimmed cell is a plain non-negative decimal.
pub(crate) fn is_plain_amount(cell: &str) -> bool {
    PLAIN_AMOUNT
        .as_ref()
        .is_some_and(|re| re.is_match(cell.trim()))
}

/// Add amounts, pinning the result at `Decimal::MAX` instead of overflowing.
/// Every total in the crate is summed through here.
pub(crate) fn sum_amounts<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).unwrap_or(Decimal::MAX)
    })
}

pub(crate) fn row_total(row: &LedgerRow) -> Decimal {
    sum_amounts(row.entries.iter().map(|e| coerce_amount(e)))
}

pub(crate) fn month_total(table: &LedgerTable, month: Month) -> Decimal {
    month_total_matching(table, month, |_| true)
}

/// Month total restricted to the rows accepted by `matches`.
pub(crate) fn month_total_matching<F>(table: &LedgerTable, month: Month, matches: F) -> Decimal
where
    F: Fn(&LedgerRow) -> bool,
{
    sum_amounts(
        table
            .rows
            .iter()
            .filter(|row| matches(row))
            .map(|row| coerce_amount(row.entry(month))),
    )
}

/// One total per cycle month, in cycle order.
pub(crate) fn month_totals(table: &LedgerTable) -> Vec<Decimal> {
    Month::all().map(|m| month_total(table, m)).collect()
}

pub(crate) fn grand_total(table: &LedgerTable) -> Decimal {
    sum_amounts(table.rows.iter().map(row_total))
}

/// Sum of every member's due amount for a single month.
pub(crate) fn expected_per_month(table: &LedgerTable) -> Decimal {
    sum_amounts(table.rows.iter().map(|r| r.dues))
}

#[cfg(test)]
mod tests;
