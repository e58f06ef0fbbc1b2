use anyhow::Result;
use rust_decimal::Decimal;

use crate::models::{LedgerRow, LedgerTable, Month, Roster};
use crate::totals;

/// Label persisted when a settlement entry names no specific recipient.
pub(crate) const NO_RECIPIENT: &str = "None";

/// Who a settlement entry is recorded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Recipient {
    Nobody,
    Member(String),
}

impl Recipient {
    /// Empty and `None` (any case) both mean no specific recipient.
    pub(crate) fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_RECIPIENT) {
            Self::Nobody
        } else {
            Self::Member(trimmed.to_string())
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        match self {
            Self::Nobody => NO_RECIPIENT,
            Self::Member(name) => name,
        }
    }

    /// Rows match by name, so a member holding two rows matches both.
    pub(crate) fn matches(&self, row: &LedgerRow) -> bool {
        match self {
            Self::Nobody => true,
            Self::Member(name) => row.name.trim() == name.as_str(),
        }
    }
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Amount collected in `month` from the ledger rows selected by `recipient`.
/// Total over all inputs: an unmatched recipient simply yields zero.
pub(crate) fn recompute(ledger: &LedgerTable, month: Month, recipient: &Recipient) -> Decimal {
    totals::month_total_matching(ledger, month, |row| recipient.matches(row))
}

/// One line of the settlement sheet. The amount is private and only ever
/// written by recomputing it from a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SettlementEntry {
    pub(crate) recipient: Recipient,
    /// `None` when the slot has no month assigned yet.
    pub(crate) month: Option<Month>,
    amount: Decimal,
}

impl SettlementEntry {
    pub(crate) fn new(recipient: Recipient, month: Option<Month>, ledger: &LedgerTable) -> Self {
        let mut entry = Self {
            recipient,
            month,
            amount: Decimal::ZERO,
        };
        entry.reconcile(ledger);
        entry
    }

    pub(crate) fn amount(&self) -> Decimal {
        self.amount
    }

    pub(crate) fn reconcile(&mut self, ledger: &LedgerTable) {
        self.amount = match self.month {
            Some(month) => recompute(ledger, month, &self.recipient),
            None => Decimal::ZERO,
        };
    }

    pub(crate) fn select_month(&mut self, month: Option<Month>, ledger: &LedgerTable) {
        self.month = month;
        self.reconcile(ledger);
    }

    pub(crate) fn select_recipient(&mut self, recipient: Recipient, ledger: &LedgerTable) {
        self.recipient = recipient;
        self.reconcile(ledger);
    }
}

/// The settlement sheet: every materialised (recipient, month) selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Settlement {
    entries: Vec<SettlementEntry>,
}

impl Settlement {
    pub(crate) fn from_entries(entries: Vec<SettlementEntry>, ledger: &LedgerTable) -> Self {
        let mut settlement = Self { entries };
        settlement.reconcile(ledger);
        settlement
    }

    /// One slot per payout share: double-tier members appear twice.
    pub(crate) fn seeded(ledger: &LedgerTable) -> Result<Self> {
        let mut entries = Vec::new();
        for row in &ledger.rows {
            for _ in 0..Roster::shares_for(row.sr)? {
                entries.push(SettlementEntry::new(
                    Recipient::Member(row.name.clone()),
                    Some(Month::first()),
                    ledger,
                ));
            }
        }
        Ok(Self { entries })
    }

    pub(crate) fn entries(&self) -> &[SettlementEntry] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn reconcile(&mut self, ledger: &LedgerTable) {
        for entry in &mut self.entries {
            entry.reconcile(ledger);
        }
    }

    /// Append a blank slot (no recipient, first month). Returns its index.
    pub(crate) fn add(&mut self, ledger: &LedgerTable) -> usize {
        self.entries.push(SettlementEntry::new(
            Recipient::Nobody,
            Some(Month::first()),
            ledger,
        ));
        self.entries.len() - 1
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<SettlementEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub(crate) fn select_month(&mut self, index: usize, month: Option<Month>, ledger: &LedgerTable) -> Result<()> {
        self.entry_mut(index)?.select_month(month, ledger);
        Ok(())
    }

    pub(crate) fn select_recipient(
        &mut self,
        index: usize,
        recipient: Recipient,
        ledger: &LedgerTable,
    ) -> Result<()> {
        self.entry_mut(index)?.select_recipient(recipient, ledger);
        Ok(())
    }

    /// Total of all amounts on the sheet.
    pub(crate) fn total(&self) -> Decimal {
        totals::sum_amounts(self.entries.iter().map(|e| e.amount))
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut SettlementEntry> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or_else(|| anyhow::anyhow!("No settlement entry #{} ({} entries)", index + 1, len))
    }
}

/// Recipient choices for a ledger: nobody first, then each distinct name.
pub(crate) fn recipient_choices(ledger: &LedgerTable) -> Vec<Recipient> {
    std::iter::once(Recipient::Nobody)
        .chain(
            ledger
                .names()
                .into_iter()
                .map(|n| Recipient::Member(n.trim().to_string())),
        )
        .collect()
}
