use anyhow::Result;
use rust_decimal::Decimal;

use super::{Member, Month, Roster};

/// One member's line in the contribution ledger.
///
/// `entries` holds one free-form cell per cycle month, kept exactly as typed.
/// Cells only become numbers when totals are computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub sr: u32,
    pub flat: String,
    pub name: String,
    pub dues: Decimal,
    pub entries: Vec<String>,
}

impl LedgerRow {
    pub fn blank(member: &Member) -> Self {
        Self {
            sr: member.sr,
            flat: member.flat.to_string(),
            name: member.name.to_string(),
            dues: member.dues(),
            entries: vec![String::new(); Month::count()],
        }
    }

    pub fn entry(&self, month: Month) -> &str {
        self.entries
            .get(month.index())
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerTable {
    pub rows: Vec<LedgerRow>,
}

impl LedgerTable {
    /// Fresh table: one row per roster member, every month empty.
    pub fn seeded() -> Self {
        Self {
            rows: Roster::members().iter().map(LedgerRow::blank).collect(),
        }
    }

    /// Re-derive every due amount from the roster and pad or cut each row's
    /// entries to the cycle length. Runs on every load and every save.
    pub fn normalize(&mut self) -> Result<()> {
        for row in &mut self.rows {
            row.dues = Roster::dues_for(row.sr)?;
            row.entries.resize(Month::count(), String::new());
        }
        Ok(())
    }

    pub fn row_by_sr(&self, sr: u32) -> Option<&LedgerRow> {
        self.rows.iter().find(|r| r.sr == sr)
    }

    /// Store a month entry verbatim (trimmed). Identity and dues stay fixed.
    pub fn set_entry(&mut self, sr: u32, month: Month, value: &str) -> Result<()> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.sr == sr)
            .ok_or_else(|| anyhow::anyhow!("No ledger row for SR {sr}"))?;
        if row.entries.len() < Month::count() {
            row.entries.resize(Month::count(), String::new());
        }
        row.entries[month.index()] = value.trim().to_string();
        Ok(())
    }

    /// Distinct member names in ledger order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !names.contains(&row.name.as_str()) {
                names.push(&row.name);
            }
        }
        names
    }
}
