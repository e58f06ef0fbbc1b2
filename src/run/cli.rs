use anyhow::Result;
use std::path::Path;

use crate::gate::{AccessGate, EditSession};
use crate::models::{Month, Roster};
use crate::settlement::Recipient;
use crate::store::{self, Snapshot, Store};
use crate::totals;
use crate::ui::util::{format_amount, pad, truncate};

const PASSWORD_FLAG: &str = "--password";

pub(crate) fn as_cli(args: &[String], store: &Store, gate: &AccessGate) -> Result<()> {
    match args[1].as_str() {
        "show" | "ledger" => cli_show(store),
        "summary" | "s" => cli_summary(store),
        "roster" => cli_roster(),
        "set" => cli_set(&args[2..], store, gate),
        "assign" => cli_assign(&args[2..], store, gate),
        "export" => cli_export(&args[2..], store),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("kitti {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Kitti: monthly society contribution ledger");
    println!();
    println!("Usage: kitti [--data-dir <path>] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                              Launch interactive TUI");
    println!("  show                                Print the ledger with totals");
    println!("  summary                             Print the settlement sheet");
    println!("  roster                              List members, tiers and dues");
    println!("  set <SR> <Month> <amount>           Record a contribution");
    println!("  assign <slot> <Month|-> [name|None] Change a settlement entry");
    println!("    --password <secret>               Required by set and assign");
    println!("  export <file.csv>                   Write the ledger with a totals row");
    println!("  --help, -h                          Show this help");
    println!("  --version, -V                       Show version");
    println!();
    println!("Months: {} (or 1-{})", Month::labels().join(" "), Month::count());
}

fn load(store: &Store) -> Result<Snapshot> {
    let snapshot = store.load_snapshot()?;
    for path in &snapshot.repaired {
        eprintln!(
            "Warning: {} did not match the expected columns and was rebuilt (old copy saved as .bak)",
            path.display()
        );
    }
    Ok(snapshot)
}

/// A wrong or missing password leaves the session read-only, which is
/// reported as a failed command so nothing is written.
fn unlock(args: &[String], gate: &AccessGate) -> Result<EditSession> {
    let secret = flag_value(args, PASSWORD_FLAG).unwrap_or("");
    let mut session = EditSession::default();
    session.unlock(gate, secret);
    if !session.can_edit() {
        anyhow::bail!("Read-only: wrong or missing {PASSWORD_FLAG}, nothing was saved");
    }
    Ok(session)
}

fn cli_show(store: &Store) -> Result<()> {
    let Snapshot { ledger, .. } = load(store)?;

    let mut header = format!("{:<3} {:<6} {} {:>6}", "SR", "Flat", pad("Name", 18), "Due");
    for label in Month::labels() {
        header.push_str(&format!(" {label:>7}"));
    }
    header.push_str(&format!(" {:>8}", "Total"));
    println!("{header}");
    println!("{}", "─".repeat(header.chars().count()));

    for row in &ledger.rows {
        let mut line = format!(
            "{:<3} {:<6} {} {:>6}",
            row.sr,
            truncate(&row.flat, 6),
            pad(&truncate(&row.name, 18), 18),
            format_amount(row.dues)
        );
        for month in Month::all() {
            line.push_str(&format!(" {:>7}", truncate(row.entry(month), 7)));
        }
        line.push_str(&format!(" {:>8}", format_amount(totals::row_total(row))));
        println!("{line}");
    }

    println!("{}", "─".repeat(header.chars().count()));
    let mut footer = format!(
        "{:<3} {:<6} {} {:>6}",
        "",
        "",
        pad("Total", 18),
        format_amount(totals::expected_per_month(&ledger))
    );
    for total in totals::month_totals(&ledger) {
        footer.push_str(&format!(" {:>7}", format_amount(total)));
    }
    footer.push_str(&format!(" {:>8}", format_amount(totals::grand_total(&ledger))));
    println!("{footer}");
    Ok(())
}

fn cli_summary(store: &Store) -> Result<()> {
    let Snapshot { settlement, .. } = load(store)?;

    if settlement.is_empty() {
        println!("No settlement entries");
        return Ok(());
    }

    println!("{:<4} {} {:<8} {:>10}", "#", pad("Name", 24), "Month", "Amount");
    println!("{}", "─".repeat(50));
    for (i, entry) in settlement.entries().iter().enumerate() {
        println!(
            "{:<4} {} {:<8} {:>10}",
            i + 1,
            pad(&truncate(entry.recipient.as_str(), 24), 24),
            entry.month.map(|m| m.label()).unwrap_or("-"),
            format_amount(entry.amount()),
        );
    }
    println!("{}", "─".repeat(50));
    println!(
        "{:<4} {} {:<8} {:>10}",
        "",
        pad("Total", 24),
        "",
        format_amount(settlement.total())
    );
    Ok(())
}

fn cli_roster() -> Result<()> {
    println!("{:<3} {:<6} {} {:<9} {:>6} Shares", "SR", "Flat", pad("Name", 24), "Tier", "Due");
    println!("{}", "─".repeat(60));
    for member in Roster::members() {
        println!(
            "{:<3} {:<6} {} {:<9} {:>6} {}",
            member.sr,
            member.flat,
            pad(&truncate(member.name, 24), 24),
            member.tier,
            format_amount(member.dues()),
            member.tier.shares(),
        );
    }
    Ok(())
}

fn cli_set(args: &[String], store: &Store, gate: &AccessGate) -> Result<()> {
    let positional = positional(args);
    let [sr, month, value] = positional.as_slice() else {
        anyhow::bail!("Usage: kitti set <SR> <Month> <amount> {PASSWORD_FLAG} <secret>");
    };
    let sr: u32 = sr
        .parse()
        .map_err(|_| anyhow::anyhow!("SR must be a number, got '{sr}'"))?;
    let month = parse_month(month)?;
    unlock(args, gate)?;

    let Snapshot {
        mut ledger,
        mut settlement,
        ..
    } = load(store)?;
    ledger.set_entry(sr, month, value)?;
    store.save_snapshot(&mut ledger, &mut settlement)?;

    let row_total = ledger
        .row_by_sr(sr)
        .map(totals::row_total)
        .unwrap_or_default();
    println!(
        "SR {sr} {month} = {}  (row total {}, {month} total {})",
        value.trim(),
        format_amount(row_total),
        format_amount(totals::month_total(&ledger, month))
    );
    if totals::coerce_amount(value).is_zero() && !value.trim().is_empty() && value.trim() != "0" {
        println!("Note: '{}' is not a plain amount and counts as 0 in totals", value.trim());
    }
    Ok(())
}

fn cli_assign(args: &[String], store: &Store, gate: &AccessGate) -> Result<()> {
    let positional = positional(args);
    if positional.len() < 2 {
        anyhow::bail!("Usage: kitti assign <slot> <Month|-> [name|None] {PASSWORD_FLAG} <secret>");
    }
    let slot: usize = positional[0]
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| anyhow::anyhow!("Slot must be a positive number, got '{}'", positional[0]))?;
    let month = match positional[1] {
        "-" => None,
        label => Some(parse_month(label)?),
    };
    let recipient = (positional.len() > 2).then(|| Recipient::parse(&positional[2..].join(" ")));
    unlock(args, gate)?;

    let Snapshot {
        mut ledger,
        mut settlement,
        ..
    } = load(store)?;
    let index = slot - 1;
    settlement.select_month(index, month, &ledger)?;
    if let Some(recipient) = recipient {
        if let Recipient::Member(name) = &recipient {
            if !ledger.rows.iter().any(|r| recipient.matches(r)) {
                eprintln!("Warning: '{name}' is not on the ledger; the amount will be 0");
            }
        }
        settlement.select_recipient(index, recipient, &ledger)?;
    }
    store.save_snapshot(&mut ledger, &mut settlement)?;

    let entry = &settlement.entries()[index];
    println!(
        "#{slot}: {} {} = {}",
        entry.recipient,
        entry.month.map(|m| m.label()).unwrap_or("-"),
        format_amount(entry.amount())
    );
    Ok(())
}

fn cli_export(args: &[String], store: &Store) -> Result<()> {
    let Some(target) = args.first().filter(|a| !a.starts_with('-')) else {
        anyhow::bail!("Usage: kitti export <file.csv>");
    };
    let Snapshot { ledger, .. } = load(store)?;
    let path = crate::config::expand_home(target, &|key: &str| std::env::var(key).ok());
    let count = store::export_ledger(&ledger, Path::new(&path))?;
    println!("Exported {count} ledger rows to {path}");
    Ok(())
}

/// A month label, or its 1-based position in the cycle (`1` is the first month).
fn parse_month(label: &str) -> Result<Month> {
    let by_position = || {
        label
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(Month::from_index)
    };
    Month::parse(label).or_else(by_position).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown month '{label}'. Months: {}",
            Month::labels().join(" ")
        )
    })
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither a flag nor a flag's value.
fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == PASSWORD_FLAG {
            iter.next();
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
