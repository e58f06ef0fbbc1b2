#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

fn table_with(entries: &[(u32, &str, &str)]) -> LedgerTable {
    let mut table = LedgerTable::seeded();
    for (sr, month, value) in entries {
        table
            .set_entry(*sr, Month::parse(month).unwrap(), value)
            .unwrap();
    }
    table
}

// ── coerce_amount ─────────────────────────────────────────────

#[test]
fn test_coerce_plain_numbers() {
    assert_eq!(coerce_amount("1000"), dec!(1000));
    assert_eq!(coerce_amount("2000.50"), dec!(2000.50));
    assert_eq!(coerce_amount("  500 "), dec!(500));
    assert_eq!(coerce_amount("0"), Decimal::ZERO);
}

#[test]
fn test_coerce_non_numeric_is_zero() {
    assert_eq!(coerce_amount(""), Decimal::ZERO);
    assert_eq!(coerce_amount("   "), Decimal::ZERO);
    assert_eq!(coerce_amount("abc"), Decimal::ZERO);
    assert_eq!(coerce_amount("paid"), Decimal::ZERO);
    assert_eq!(coerce_amount("nan"), Decimal::ZERO);
}

#[test]
fn test_coerce_rejects_negative_and_formatted() {
    assert_eq!(coerce_amount("-500"), Decimal::ZERO);
    assert_eq!(coerce_amount("1,000"), Decimal::ZERO);
    assert_eq!(coerce_amount("1e3"), Decimal::ZERO);
    assert_eq!(coerce_amount("₹2000"), Decimal::ZERO);
    assert_eq!(coerce_amount("12."), Decimal::ZERO);
}

#[test]
fn test_coerce_overflow_is_zero() {
    assert_eq!(coerce_amount(&"9".repeat(60)), Decimal::ZERO);
}

#[test]
fn test_totals_saturate_instead_of_overflowing() {
    let huge = Decimal::MAX.to_string();
    let table = table_with(&[
        (1, "Dec-25", huge.as_str()),
        (2, "Dec-25", huge.as_str()),
        (1, "Jan-26", huge.as_str()),
    ]);
    assert_eq!(coerce_amount(&huge), Decimal::MAX);
    assert_eq!(month_total(&table, Month::first()), Decimal::MAX);
    assert_eq!(row_total(&table.rows[0]), Decimal::MAX);
    assert_eq!(grand_total(&table), Decimal::MAX);
    assert_eq!(month_totals(&table)[1], Decimal::MAX);
}

#[test]
fn test_sum_amounts() {
    assert_eq!(sum_amounts([dec!(1000), dec!(500.50)]), dec!(1500.50));
    assert_eq!(sum_amounts(Vec::<Decimal>::new()), Decimal::ZERO);
    assert_eq!(sum_amounts([Decimal::MAX, dec!(1)]), Decimal::MAX);
}

#[test]
fn test_is_plain_amount() {
    assert!(is_plain_amount("2000"));
    assert!(is_plain_amount(" 12.50 "));
    assert!(!is_plain_amount(""));
    assert!(!is_plain_amount("paid"));
    assert!(!is_plain_amount("2,000"));
    assert!(!is_plain_amount("-5"));
}

// ── row_total ─────────────────────────────────────────────────

#[test]
fn test_row_total_skips_non_numeric() {
    let mut row = LedgerTable::seeded().rows.remove(0);
    row.entries[0] = "1000".into();
    row.entries[1] = "".into();
    row.entries[2] = "abc".into();
    row.entries[3] = "500".into();
    assert_eq!(row_total(&row), dec!(1500));
}

#[test]
fn test_row_total_empty_row() {
    let row = LedgerTable::seeded().rows.remove(0);
    assert_eq!(row_total(&row), Decimal::ZERO);
}

// ── month_total ───────────────────────────────────────────────

#[test]
fn test_month_total_sums_all_rows() {
    let table = table_with(&[
        (1, "Dec-25", "2000"),
        (2, "Dec-25", "2000"),
        (9, "Dec-25", "4000"),
        (3, "Jan-26", "2000"),
        (4, "Dec-25", "later"),
    ]);
    let dec25 = Month::parse("Dec-25").unwrap();
    let jan26 = Month::parse("Jan-26").unwrap();
    assert_eq!(month_total(&table, dec25), dec!(8000));
    assert_eq!(month_total(&table, jan26), dec!(2000));
    assert_eq!(month_total(&table, Month::parse("Feb-26").unwrap()), Decimal::ZERO);
}

#[test]
fn test_month_total_invariant_under_row_order() {
    let mut table = table_with(&[(1, "Mar-26", "100"), (5, "Mar-26", "250.5"), (10, "Mar-26", "4000")]);
    let march = Month::parse("Mar-26").unwrap();
    let before = month_total(&table, march);
    table.rows.reverse();
    assert_eq!(month_total(&table, march), before);
    table.rows.rotate_left(3);
    assert_eq!(month_total(&table, march), before);
    assert_eq!(before, dec!(4350.5));
}

#[test]
fn test_month_total_matching_filters_rows() {
    let table = table_with(&[(1, "Dec-25", "2000"), (2, "Dec-25", "2000")]);
    let total = month_total_matching(&table, Month::first(), |r| r.sr == 2);
    assert_eq!(total, dec!(2000));
    let none = month_total_matching(&table, Month::first(), |_| false);
    assert_eq!(none, Decimal::ZERO);
}

#[test]
fn test_month_totals_and_grand_total_agree() {
    let table = table_with(&[
        (1, "Dec-25", "2000"),
        (1, "Jan-26", "2000"),
        (9, "Nov-26", "4000"),
        (7, "Jun-26", "x"),
    ]);
    let totals = month_totals(&table);
    assert_eq!(totals.len(), 12);
    assert_eq!(totals.iter().copied().sum::<Decimal>(), grand_total(&table));
    assert_eq!(grand_total(&table), dec!(8000));
}

#[test]
fn test_expected_per_month() {
    assert_eq!(expected_per_month(&LedgerTable::seeded()), dec!(24000));
}
