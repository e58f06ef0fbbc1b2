#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

fn month(label: &str) -> Month {
    Month::parse(label).unwrap()
}

fn open_temp() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    (dir, store)
}

fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

// ── Ledger: create / load ─────────────────────────────────────

#[test]
fn test_first_load_creates_seeded_file() {
    let (_dir, store) = open_temp();
    assert!(!store.ledger_path().exists());

    let loaded = store.load_ledger().unwrap();
    assert!(matches!(loaded, Loaded::Created(_)));
    assert!(store.ledger_path().exists());
    assert_eq!(loaded.into_inner(), LedgerTable::seeded());
}

#[test]
fn test_second_load_is_clean() {
    let (_dir, store) = open_temp();
    store.load_ledger().unwrap();
    let loaded = store.load_ledger().unwrap();
    assert!(matches!(loaded, Loaded::Clean(_)));
    assert!(!loaded.is_rebuilt());
    assert_eq!(loaded.into_inner(), LedgerTable::seeded());
}

#[test]
fn test_written_header() {
    let (_dir, store) = open_temp();
    store.load_ledger().unwrap();
    let content = read_file(&store.ledger_path());
    let header = content.lines().next().unwrap();
    assert!(header.starts_with("SR,Flat No,Name,Kitti Amount,Dec-25,Jan-26"));
    assert!(header.ends_with("Nov-26,Total"));
}

// ── Ledger: due amount invariant ──────────────────────────────

#[test]
fn test_tampered_dues_are_overwritten_on_load() {
    let (_dir, store) = open_temp();
    store.load_ledger().unwrap();

    let content = read_file(&store.ledger_path());
    let tampered = content.replacen(",2000,", ",1,", 1).replacen(",4000,", ",50000,", 1);
    assert_ne!(content, tampered);
    std::fs::write(store.ledger_path(), tampered).unwrap();

    let table = store.load_ledger().unwrap().into_inner();
    for row in &table.rows {
        assert_eq!(row.dues, crate::models::Roster::dues_for(row.sr).unwrap());
    }
}

#[test]
fn test_dues_stable_across_cycles() {
    let (_dir, store) = open_temp();
    let mut table = store.load_ledger().unwrap().into_inner();
    for _ in 0..3 {
        table.rows[0].dues = dec!(7);
        store.save_ledger(&mut table).unwrap();
        assert_eq!(table.rows[0].dues, dec!(2000));
        table = store.load_ledger().unwrap().into_inner();
        assert_eq!(table.rows[0].dues, dec!(2000));
        assert_eq!(table.rows[9].dues, dec!(4000));
    }
}

#[test]
fn test_unknown_sr_is_fatal() {
    let (_dir, store) = open_temp();
    store.load_ledger().unwrap();
    let content = read_file(&store.ledger_path());
    let broken = content.replacen("\n1,", "\n77,", 1);
    std::fs::write(store.ledger_path(), broken).unwrap();
    assert!(store.load_ledger().is_err());
}

#[test]
fn test_non_numeric_sr_is_fatal() {
    let (_dir, store) = open_temp();
    store.load_ledger().unwrap();
    let content = read_file(&store.ledger_path());
    let broken = content.replacen("\n1,", "\nfirst,", 1);
    std::fs::write(store.ledger_path(), broken).unwrap();
    assert!(store.load_ledger().is_err());
}

// ── Ledger: round trip ────────────────────────────────────────

#[test]
fn test_save_load_round_trip_is_idempotent() {
    let (_dir, store) = open_temp();
    let mut table = store.load_ledger().unwrap().into_inner();
    table.set_entry(1, month("Dec-25"), "2000").unwrap();
    table.set_entry(5, month("Mar-26"), "1000.50").unwrap();
    table.set_entry(9, month("Nov-26"), "pending").unwrap();
    store.save_ledger(&mut table).unwrap();

    let first = store.load_ledger().unwrap().into_inner();
    assert_eq!(first, table);

    let mut again = first.clone();
    store.save_ledger(&mut again).unwrap();
    let second = store.load_ledger().unwrap().into_inner();
    assert_eq!(second, first);
    assert_eq!(read_file(&store.ledger_path()).lines().count(), 11);
}

#[test]
fn test_cells_saved_verbatim() {
    let (_dir, store) = open_temp();
    let mut table = store.load_ledger().unwrap().into_inner();
    table.set_entry(2, month("Jan-26"), "paid, cash").unwrap();
    store.save_ledger(&mut table).unwrap();

    let loaded = store.load_ledger().unwrap().into_inner();
    assert_eq!(loaded.row_by_sr(2).unwrap().entry(month("Jan-26")), "paid, cash");
}

#[test]
fn test_total_column_is_recomputed() {
    let (_dir, store) = open_temp();
    let mut table = store.load_ledger().unwrap().into_inner();
    table.set_entry(1, month("Dec-25"), "1000").unwrap();
    table.set_entry(1, month("Jan-26"), "abc").unwrap();
    table.set_entry(1, month("Feb-26"), "500").unwrap();
    store.save_ledger(&mut table).unwrap();

    let content = read_file(&store.ledger_path());
    let row = content.lines().nth(1).unwrap();
    assert!(row.ends_with(",1500"), "row was {row}");
}

#[test]
fn test_file_without_total_column_is_clean() {
    let (_dir, store) = open_temp();
    let mut header = vec!["SR".to_string(), "Flat No".into(), "Name".into()];
    header.extend(Month::labels().iter().cloned());
    let mut content = header.join(",");
    content.push('\n');
    content.push_str("3,A-101,Anju");
    content.push_str(&",".repeat(12));
    content.push('\n');
    std::fs::write(store.ledger_path(), content).unwrap();

    let loaded = store.load_ledger().unwrap();
    assert!(matches!(loaded, Loaded::Clean(_)));
    let table = loaded.into_inner();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].dues, dec!(2000));
    assert_eq!(table.rows[0].entries.len(), 12);
}

// ── Ledger: self-healing ──────────────────────────────────────

#[test]
fn test_missing_month_column_rebuilds() {
    let (_dir, store) = open_temp();
    std::fs::write(store.ledger_path(), "SR,Flat No,Name,Kitti Amount,Dec-25\n1,A-412,X,2000,500\n").unwrap();

    let loaded = store.load_ledger().unwrap();
    assert!(loaded.is_rebuilt());
    assert_eq!(loaded.into_inner(), LedgerTable::seeded());

    let backup = store.ledger_path().with_extension("csv.bak");
    assert!(backup.exists());
    assert!(read_file(&backup).contains("A-412,X"));
    assert!(matches!(store.load_ledger().unwrap(), Loaded::Clean(_)));
}

#[test]
fn test_invalid_utf8_cell_keeps_the_ledger() {
    let (_dir, store) = open_temp();
    let mut table = store.load_ledger().unwrap().into_inner();
    table.set_entry(1, month("Dec-25"), "2000").unwrap();
    table.set_entry(3, month("Jan-26"), "BAD").unwrap();
    store.save_ledger(&mut table).unwrap();

    let bytes = std::fs::read(store.ledger_path()).unwrap();
    let pos = bytes.windows(3).position(|w| w == b"BAD").unwrap();
    let mut broken = bytes.clone();
    broken.splice(pos..pos + 3, [0xff, 0xfe]);
    std::fs::write(store.ledger_path(), broken).unwrap();

    let loaded = store.load_ledger().unwrap();
    assert!(matches!(loaded, Loaded::Clean(_)));
    let table = loaded.into_inner();
    assert_eq!(table.rows[0].entry(month("Dec-25")), "2000");
    assert_eq!(table.rows[2].entry(month("Jan-26")), "\u{fffd}\u{fffd}");
    assert!(!store.ledger_path().with_extension("csv.bak").exists());
}

#[test]
fn test_header_only_file_rebuilds() {
    let (_dir, store) = open_temp();
    let header = schema::ledger_header().join(",");
    std::fs::write(store.ledger_path(), format!("{header}\n")).unwrap();
    assert!(store.load_ledger().unwrap().is_rebuilt());
}

#[test]
fn test_empty_file_rebuilds() {
    let (_dir, store) = open_temp();
    std::fs::write(store.ledger_path(), "").unwrap();
    let loaded = store.load_ledger().unwrap();
    assert!(loaded.is_rebuilt());
    assert_eq!(loaded.into_inner().rows.len(), 10);
}

// ── Summary ───────────────────────────────────────────────────

#[test]
fn test_summary_created_from_ledger() {
    let (_dir, store) = open_temp();
    let ledger = store.load_ledger().unwrap().into_inner();
    let loaded = store.load_summary(&ledger).unwrap();
    assert!(matches!(loaded, Loaded::Created(_)));
    let settlement = loaded.into_inner();
    assert_eq!(settlement.len(), 12);
    assert!(store.summary_path().exists());
}

#[test]
fn test_summary_round_trip_keeps_selection() {
    let (_dir, store) = open_temp();
    let mut ledger = store.load_ledger().unwrap().into_inner();
    let mut settlement = store.load_summary(&ledger).unwrap().into_inner();
    let name = ledger.rows[1].name.clone();
    ledger.set_entry(2, month("Apr-26"), "2000").unwrap();

    settlement
        .select_month(0, Some(month("Apr-26")), &ledger)
        .unwrap();
    settlement
        .select_recipient(0, Recipient::Member(name.clone()), &ledger)
        .unwrap();
    settlement.select_month(1, None, &ledger).unwrap();
    store.save_ledger(&mut ledger).unwrap();
    store.save_summary(&mut settlement, &ledger).unwrap();

    let ledger = store.load_ledger().unwrap().into_inner();
    let loaded = store.load_summary(&ledger).unwrap();
    assert!(matches!(loaded, Loaded::Clean(_)));
    let loaded = loaded.into_inner();
    assert_eq!(loaded, settlement);
    assert_eq!(loaded.entries()[0].recipient, Recipient::Member(name));
    assert_eq!(loaded.entries()[0].amount(), dec!(2000));
    assert_eq!(loaded.entries()[1].month, None);
}

#[test]
fn test_summary_stored_amount_is_not_trusted() {
    let (_dir, store) = open_temp();
    let ledger = store.load_ledger().unwrap().into_inner();
    std::fs::write(
        store.summary_path(),
        "Name,Month,Amount\nNone,Dec-25,123456\n,Jan-26,99\n",
    )
    .unwrap();

    let settlement = store.load_summary(&ledger).unwrap().into_inner();
    assert_eq!(settlement.len(), 2);
    assert!(settlement
        .entries()
        .iter()
        .all(|e| e.amount() == Decimal::ZERO && e.recipient == Recipient::Nobody));
}

#[test]
fn test_summary_without_amount_column_recomputes() {
    let (_dir, store) = open_temp();
    let mut ledger = store.load_ledger().unwrap().into_inner();
    ledger.set_entry(1, month("Dec-25"), "2000").unwrap();
    std::fs::write(store.summary_path(), "Name,Month\nNone,Dec-25\n").unwrap();

    let settlement = store.load_summary(&ledger).unwrap().into_inner();
    assert_eq!(settlement.entries()[0].amount(), dec!(2000));
}

#[test]
fn test_summary_unknown_month_is_unassigned() {
    let (_dir, store) = open_temp();
    let ledger = store.load_ledger().unwrap().into_inner();
    std::fs::write(store.summary_path(), "Name,Month,Amount\nNone,Dec-27,0\n").unwrap();

    let loaded = store.load_summary(&ledger).unwrap();
    assert!(matches!(loaded, Loaded::Clean(_)));
    assert_eq!(loaded.into_inner().entries()[0].month, None);
}

#[test]
fn test_summary_missing_columns_rebuilds() {
    let (_dir, store) = open_temp();
    let ledger = store.load_ledger().unwrap().into_inner();
    std::fs::write(store.summary_path(), "Who,When\nA,B\n").unwrap();

    let loaded = store.load_summary(&ledger).unwrap();
    assert!(loaded.is_rebuilt());
    assert_eq!(loaded.into_inner(), Settlement::seeded(&ledger).unwrap());
}

#[test]
fn test_summary_saved_amount_matches_ledger() {
    let (_dir, store) = open_temp();
    let mut ledger = store.load_ledger().unwrap().into_inner();
    let mut settlement = Settlement::default();
    settlement.add(&ledger);
    ledger.set_entry(3, month("Dec-25"), "2000").unwrap();
    store.save_summary(&mut settlement, &ledger).unwrap();

    let content = read_file(&store.summary_path());
    assert_eq!(content.lines().nth(1), Some("None,Dec-25,2000"));
}

// ── Export ────────────────────────────────────────────────────

#[test]
fn test_export_appends_totals_row() {
    let (dir, _store) = open_temp();
    let mut ledger = LedgerTable::seeded();
    ledger.set_entry(1, month("Dec-25"), "2000").unwrap();
    ledger.set_entry(9, month("Dec-25"), "4000").unwrap();

    let out = dir.path().join("export.csv");
    let count = export_ledger(&ledger, &out).unwrap();
    assert_eq!(count, 10);

    let content = read_file(&out);
    let footer = content.lines().last().unwrap();
    assert!(footer.starts_with(",,Total,24000,6000,0,"), "footer was {footer}");
    assert!(footer.ends_with(",6000"));
}

// ── End to end ────────────────────────────────────────────────

#[test]
fn test_end_to_end_first_month() {
    let (_dir, store) = open_temp();
    let mut ledger = store.load_ledger().unwrap().into_inner();
    let dues: Vec<Decimal> = ledger.rows.iter().map(|r| r.dues).collect();
    assert_eq!(dues.iter().filter(|d| **d == dec!(2000)).count(), 8);
    assert_eq!(dues.iter().filter(|d| **d == dec!(4000)).count(), 2);

    for row in ledger.rows.clone() {
        for m in Month::all() {
            let value = if row.sr == 1 && m == month("Dec-25") { "2000" } else { "0" };
            ledger.set_entry(row.sr, m, value).unwrap();
        }
    }
    store.save_ledger(&mut ledger).unwrap();
    let ledger = store.load_ledger().unwrap().into_inner();

    assert_eq!(totals::month_total(&ledger, month("Dec-25")), dec!(2000));

    let mut settlement = Settlement::default();
    let idx = settlement.add(&ledger);
    settlement
        .select_month(idx, Some(month("Dec-25")), &ledger)
        .unwrap();
    assert_eq!(settlement.entries()[idx].amount(), dec!(2000));
    assert_eq!(
        crate::settlement::recompute(&ledger, month("Dec-25"), &Recipient::Nobody),
        dec!(2000)
    );
}

// ── Snapshot ──────────────────────────────────────────────────

#[test]
fn test_snapshot_reports_repairs() {
    let (_dir, store) = open_temp();
    let fresh = store.load_snapshot().unwrap();
    assert!(fresh.repaired.is_empty());
    assert_eq!(fresh.settlement.len(), 12);

    std::fs::write(store.summary_path(), "garbage\n").unwrap();
    let repaired = store.load_snapshot().unwrap();
    assert_eq!(repaired.repaired, vec![store.summary_path()]);
}

#[test]
fn test_save_snapshot_reconciles_sheet() {
    let (_dir, store) = open_temp();
    let mut snapshot = store.load_snapshot().unwrap();
    snapshot
        .ledger
        .set_entry(1, month("Dec-25"), "2000")
        .unwrap();
    snapshot.ledger.rows[0].dues = dec!(5);
    store
        .save_snapshot(&mut snapshot.ledger, &mut snapshot.settlement)
        .unwrap();
    assert_eq!(snapshot.ledger.rows[0].dues, dec!(2000));

    let reloaded = store.load_snapshot().unwrap();
    let first = &reloaded.settlement.entries()[0];
    assert_eq!(first.month, Some(month("Dec-25")));
    assert_eq!(first.amount(), dec!(2000));
}
