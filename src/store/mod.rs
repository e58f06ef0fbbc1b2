mod schema;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use crate::models::{LedgerRow, LedgerTable, Month};
use crate::settlement::{Recipient, Settlement, SettlementEntry};
use crate::totals;

pub(crate) const LEDGER_FILE: &str = "kitti_main.csv";
pub(crate) const SUMMARY_FILE: &str = "kitti_summary.csv";

/// How a persisted table came to be in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Loaded<T> {
    /// Read back as stored.
    Clean(T),
    /// No file existed; defaults were written.
    Created(T),
    /// The file did not fit the schema and was replaced with defaults.
    Rebuilt(T),
}

impl<T> Loaded<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Self::Clean(t) | Self::Created(t) | Self::Rebuilt(t) => t,
        }
    }

    pub(crate) fn is_rebuilt(&self) -> bool {
        matches!(self, Self::Rebuilt(_))
    }
}

enum Parsed<T> {
    Valid(T),
    Mismatch(String),
}

/// Ledger and settlement files inside one data directory.
///
/// There is no locking: two sessions saving at once means the last write wins.
pub(crate) struct Store {
    dir: PathBuf,
}

impl Store {
    pub(crate) fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub(crate) fn ledger_path(&self) -> PathBuf {
        self.dir.join(LEDGER_FILE)
    }

    pub(crate) fn summary_path(&self) -> PathBuf {
        self.dir.join(SUMMARY_FILE)
    }

    /// Load the ledger, creating it from the roster on first run and
    /// rebuilding it when the stored columns do not fit. Due amounts are
    /// always re-derived.
    pub(crate) fn load_ledger(&self) -> Result<Loaded<LedgerTable>> {
        let path = self.ledger_path();
        if !path.exists() {
            let mut table = LedgerTable::seeded();
            self.save_ledger(&mut table)?;
            info!("Created {} from the roster", path.display());
            return Ok(Loaded::Created(table));
        }

        match read_ledger(&path)? {
            Parsed::Valid(mut table) => {
                table.normalize()?;
                debug!("Loaded {} ledger rows from {}", table.rows.len(), path.display());
                Ok(Loaded::Clean(table))
            }
            Parsed::Mismatch(reason) => {
                warn!("{}: {reason}; rebuilding from the roster", path.display());
                backup(&path)?;
                let mut table = LedgerTable::seeded();
                self.save_ledger(&mut table)?;
                Ok(Loaded::Rebuilt(table))
            }
        }
    }

    /// Normalise due amounts, then write every row with its month cells as typed.
    pub(crate) fn save_ledger(&self, table: &mut LedgerTable) -> Result<()> {
        table.normalize()?;
        let path = self.ledger_path();
        write_atomically(&path, |wtr| write_ledger_rows(wtr, table))?;
        info!("Saved {} ledger rows to {}", table.rows.len(), path.display());
        Ok(())
    }

    /// Load the settlement sheet. Stored amounts are ignored and recomputed
    /// from `ledger`.
    pub(crate) fn load_summary(&self, ledger: &LedgerTable) -> Result<Loaded<Settlement>> {
        let path = self.summary_path();
        if !path.exists() {
            let mut settlement = Settlement::seeded(ledger)?;
            self.save_summary(&mut settlement, ledger)?;
            info!("Created {} with {} payout slots", path.display(), settlement.len());
            return Ok(Loaded::Created(settlement));
        }

        match read_summary(&path, ledger)? {
            Parsed::Valid(entries) => {
                let settlement = Settlement::from_entries(entries, ledger);
                debug!("Loaded {} settlement entries from {}", settlement.len(), path.display());
                Ok(Loaded::Clean(settlement))
            }
            Parsed::Mismatch(reason) => {
                warn!("{}: {reason}; rebuilding from the ledger", path.display());
                backup(&path)?;
                let mut settlement = Settlement::seeded(ledger)?;
                self.save_summary(&mut settlement, ledger)?;
                Ok(Loaded::Rebuilt(settlement))
            }
        }
    }

    /// Reconcile against `ledger`, then write the sheet.
    pub(crate) fn save_summary(&self, settlement: &mut Settlement, ledger: &LedgerTable) -> Result<()> {
        settlement.reconcile(ledger);
        let path = self.summary_path();
        write_atomically(&path, |wtr| {
            wtr.write_record(schema::summary_header())?;
            for entry in settlement.entries() {
                let month = entry.month.map(|m| m.label()).unwrap_or("");
                let amount = entry.amount().to_string();
                wtr.write_record([entry.recipient.as_str(), month, amount.as_str()])?;
            }
            Ok(())
        })?;
        info!("Saved {} settlement entries to {}", settlement.len(), path.display());
        Ok(())
    }
}

/// Both tables as loaded at the start of an interactive cycle.
#[derive(Debug)]
pub(crate) struct Snapshot {
    pub(crate) ledger: LedgerTable,
    pub(crate) settlement: Settlement,
    /// Files that were rebuilt from defaults while loading.
    pub(crate) repaired: Vec<PathBuf>,
}

impl Store {
    pub(crate) fn load_snapshot(&self) -> Result<Snapshot> {
        let mut repaired = Vec::new();

        let ledger = self.load_ledger()?;
        if ledger.is_rebuilt() {
            repaired.push(self.ledger_path());
        }
        let ledger = ledger.into_inner();

        let settlement = self.load_summary(&ledger)?;
        if settlement.is_rebuilt() {
            repaired.push(self.summary_path());
        }

        Ok(Snapshot {
            ledger,
            settlement: settlement.into_inner(),
            repaired,
        })
    }

    /// Save the ledger first so the sheet is reconciled against what is on disk.
    pub(crate) fn save_snapshot(&self, ledger: &mut LedgerTable, settlement: &mut Settlement) -> Result<()> {
        self.save_ledger(ledger)?;
        self.save_summary(settlement, ledger)
    }
}

/// Write the ledger plus a month-totals footer row to any path.
/// Returns the number of member rows written.
pub(crate) fn export_ledger(table: &LedgerTable, path: &Path) -> Result<usize> {
    let mut table = table.clone();
    table.normalize()?;
    write_atomically(path, |wtr| {
        write_ledger_rows(wtr, &table)?;
        let mut footer = vec![
            String::new(),
            String::new(),
            schema::TOTAL.to_string(),
            totals::expected_per_month(&table).to_string(),
        ];
        footer.extend(totals::month_totals(&table).iter().map(Decimal::to_string));
        footer.push(totals::grand_total(&table).to_string());
        wtr.write_record(&footer)?;
        Ok(())
    })?;
    Ok(table.rows.len())
}

fn write_ledger_rows(wtr: &mut csv::Writer<std::fs::File>, table: &LedgerTable) -> Result<()> {
    wtr.write_record(schema::ledger_header())?;
    for row in &table.rows {
        let mut record = vec![
            row.sr.to_string(),
            row.flat.clone(),
            row.name.clone(),
            row.dues.to_string(),
        ];
        record.extend(row.entries.iter().cloned());
        record.push(totals::row_total(row).to_string());
        wtr.write_record(&record)?;
    }
    Ok(())
}

fn read_ledger(path: &Path) -> Result<Parsed<LedgerTable>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = match rdr.headers() {
        Ok(h) => h.clone(),
        Err(e) => return Ok(Parsed::Mismatch(format!("unreadable header ({e})"))),
    };
    let columns = match schema::LedgerColumns::locate(&headers) {
        Ok(c) => c,
        Err(missing) => {
            return Ok(Parsed::Mismatch(format!(
                "missing columns: {}",
                missing.join(", ")
            )))
        }
    };

    let mut rows = Vec::new();
    for (i, result) in rdr.byte_records().enumerate() {
        let record = match result {
            Ok(r) => decode_record(r, path, i + 1),
            Err(e) => return Ok(Parsed::Mismatch(format!("unreadable row {} ({e})", i + 1))),
        };
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let sr_cell = cell(columns.sr).trim();
        let sr: u32 = sr_cell.parse().with_context(|| {
            format!(
                "{}: row {} has SR '{sr_cell}', which is not a roster serial number",
                path.display(),
                i + 1
            )
        })?;

        rows.push(LedgerRow {
            sr,
            flat: cell(columns.flat).to_string(),
            name: cell(columns.name).to_string(),
            dues: Decimal::ZERO,
            entries: columns.months.iter().map(|&idx| cell(idx).to_string()).collect(),
        });
    }

    if rows.is_empty() {
        return Ok(Parsed::Mismatch("no member rows".into()));
    }
    Ok(Parsed::Valid(LedgerTable { rows }))
}

fn read_summary(path: &Path, ledger: &LedgerTable) -> Result<Parsed<Vec<SettlementEntry>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = match rdr.headers() {
        Ok(h) => h.clone(),
        Err(e) => return Ok(Parsed::Mismatch(format!("unreadable header ({e})"))),
    };
    let columns = match schema::SummaryColumns::locate(&headers) {
        Ok(c) => c,
        Err(missing) => {
            return Ok(Parsed::Mismatch(format!(
                "missing columns: {}",
                missing.join(", ")
            )))
        }
    };

    let mut entries = Vec::new();
    for (i, result) in rdr.byte_records().enumerate() {
        let record = match result {
            Ok(r) => decode_record(r, path, i + 1),
            Err(e) => return Ok(Parsed::Mismatch(format!("unreadable row {} ({e})", i + 1))),
        };
        let recipient = Recipient::parse(record.get(columns.name).unwrap_or(""));
        let month_cell = record.get(columns.month).unwrap_or("").trim();
        let month = if month_cell.is_empty() {
            None
        } else {
            let parsed = Month::parse(month_cell);
            if parsed.is_none() {
                warn!(
                    "{}: row {} names month '{month_cell}', which is outside the cycle; leaving it unassigned",
                    path.display(),
                    i + 1
                );
            }
            parsed
        };
        entries.push(SettlementEntry::new(recipient, month, ledger));
    }
    Ok(Parsed::Valid(entries))
}

/// Decode one row, replacing invalid UTF-8 in a cell rather than giving up on
/// the whole file.
fn decode_record(record: csv::ByteRecord, path: &Path, row: usize) -> csv::StringRecord {
    match csv::StringRecord::from_byte_record(record) {
        Ok(r) => r,
        Err(e) => {
            warn!(
                "{}: row {row} is not valid UTF-8; unreadable bytes replaced",
                path.display()
            );
            e.into_byte_record()
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect()
        }
    }
}

/// Keep a copy of a file that is about to be replaced by defaults.
fn backup(path: &Path) -> Result<()> {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    let backup_path = PathBuf::from(name);
    std::fs::copy(path, &backup_path)
        .with_context(|| format!("Failed to back up {}", path.display()))?;
    warn!("Previous contents kept at {}", backup_path.display());
    Ok(())
}

/// Write through a sibling temp file and rename it into place, so a failed
/// save leaves the previous file untouched.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut csv::Writer<std::fs::File>) -> Result<()>,
{
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut wtr = csv::Writer::from_path(&tmp)
        .with_context(|| format!("Failed to create {}", tmp.display()))?;
    write(&mut wtr).with_context(|| format!("Failed to write {}", tmp.display()))?;
    wtr.flush()
        .with_context(|| format!("Failed to flush {}", tmp.display()))?;
    drop(wtr);
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests;
