use anyhow::Result;

use crate::gate::{AccessGate, EditSession, Permission};
use crate::models::{LedgerRow, LedgerTable, Month};
use crate::settlement::{recipient_choices, Settlement};
use crate::store::{Snapshot, Store};
use crate::ui::util::clamp_cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Ledger,
    Settlement,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Ledger, Self::Settlement]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ledger => write!(f, "Ledger"),
            Self::Settlement => write!(f, "Settlement"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Password,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Password => write!(f, "PASSWORD"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteEntry { index: usize },
    DiscardAndQuit,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) password_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    gate: AccessGate,
    pub(crate) session: EditSession,

    pub(crate) ledger: LedgerTable,
    pub(crate) settlement: Settlement,
    /// In-memory edits not yet written to disk.
    pub(crate) dirty: bool,

    // Ledger
    pub(crate) row_index: usize,
    pub(crate) row_scroll: usize,
    pub(crate) month: Month,

    // Settlement
    pub(crate) entry_index: usize,
    pub(crate) entry_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(store: &Store, gate: AccessGate) -> Result<Self> {
        let mut app = Self {
            running: true,
            screen: Screen::Ledger,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            password_input: String::new(),
            status_message: String::new(),
            show_help: false,

            gate,
            session: EditSession::default(),

            ledger: LedgerTable::default(),
            settlement: Settlement::default(),
            dirty: false,

            row_index: 0,
            row_scroll: 0,
            month: Month::first(),

            entry_index: 0,
            entry_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        };
        app.reload(store)?;
        Ok(app)
    }

    /// Replace both tables with what is on disk, dropping unsaved edits.
    pub(crate) fn reload(&mut self, store: &Store) -> Result<()> {
        let Snapshot {
            ledger,
            settlement,
            repaired,
        } = store.load_snapshot()?;
        self.ledger = ledger;
        self.settlement = settlement;
        self.dirty = false;
        clamp_cursor(&mut self.row_index, &mut self.row_scroll, self.ledger.rows.len());
        clamp_cursor(&mut self.entry_index, &mut self.entry_scroll, self.settlement.len());

        if !repaired.is_empty() {
            let names: Vec<String> = repaired
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            self.set_status(format!(
                "Rebuilt {} from defaults (old copy kept as .bak)",
                names.join(", ")
            ));
        }
        Ok(())
    }

    pub(crate) fn save(&mut self, store: &Store) -> Result<()> {
        if !self.require_edit() {
            return Ok(());
        }
        store.save_snapshot(&mut self.ledger, &mut self.settlement)?;
        self.reload(store)?;
        self.set_status(format!(
            "Saved {} ledger rows and {} settlement entries",
            self.ledger.rows.len(),
            self.settlement.len()
        ));
        Ok(())
    }

    pub(crate) fn unlock(&mut self, secret: &str) {
        match self.session.unlock(&self.gate, secret) {
            Permission::Granted => self.set_status("Edit mode unlocked"),
            Permission::ReadOnly => self.set_status("Wrong password: still read-only"),
        }
    }

    pub(crate) fn lock(&mut self) {
        self.session.lock();
        if self.dirty {
            self.set_status("Locked. Unsaved edits stay in memory until :reload");
        } else {
            self.set_status("Locked: read-only");
        }
    }

    /// Gate for every mutation. Sets a status line when refused.
    pub(crate) fn require_edit(&mut self) -> bool {
        if self.session.can_edit() {
            true
        } else {
            self.set_status("Read-only: press u to unlock editing");
            false
        }
    }

    pub(crate) fn selected_row(&self) -> Option<&LedgerRow> {
        self.ledger.rows.get(self.row_index)
    }

    /// Enter edit mode on the focused ledger cell.
    pub(crate) fn begin_edit(&mut self) {
        if !self.require_edit() {
            return;
        }
        let Some(current) = self.selected_row().map(|r| r.entry(self.month).to_string()) else {
            return;
        };
        self.command_input = current;
        self.input_mode = InputMode::Editing;
    }

    pub(crate) fn commit_edit(&mut self, value: &str) -> Result<()> {
        if !self.require_edit() {
            return Ok(());
        }
        let Some((sr, name)) = self.selected_row().map(|r| (r.sr, r.name.clone())) else {
            return Ok(());
        };
        self.ledger.set_entry(sr, self.month, value)?;
        self.settlement.reconcile(&self.ledger);
        self.dirty = true;
        self.set_status(format!("{name} {}: '{}' (unsaved)", self.month, value.trim()));
        Ok(())
    }

    /// Move the selected settlement entry's month by `delta`, wrapping.
    /// An unassigned entry starts at the first month.
    pub(crate) fn shift_entry_month(&mut self, delta: i32) -> Result<()> {
        if self.settlement.is_empty() || !self.require_edit() {
            return Ok(());
        }
        let Some(current) = self.settlement.entries().get(self.entry_index).map(|e| e.month) else {
            return Ok(());
        };
        let next = match current {
            None => Month::first(),
            Some(m) if delta >= 0 => m.next(),
            Some(m) => m.prev(),
        };
        self.settlement
            .select_month(self.entry_index, Some(next), &self.ledger)?;
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn clear_entry_month(&mut self) -> Result<()> {
        if self.settlement.is_empty() || !self.require_edit() {
            return Ok(());
        }
        self.settlement
            .select_month(self.entry_index, None, &self.ledger)?;
        self.dirty = true;
        Ok(())
    }

    /// Step the selected entry's recipient through None and each ledger name.
    pub(crate) fn cycle_recipient(&mut self, delta: i32) -> Result<()> {
        if self.settlement.is_empty() || !self.require_edit() {
            return Ok(());
        }
        let choices = recipient_choices(&self.ledger);
        let Some(current) = self.settlement.entries().get(self.entry_index).map(|e| &e.recipient) else {
            return Ok(());
        };
        let pos = choices.iter().position(|c| c == current).unwrap_or(0);
        let len = choices.len();
        let next = if delta >= 0 {
            (pos + 1) % len
        } else {
            (pos + len - 1) % len
        };
        let recipient = choices[next].clone();
        self.settlement
            .select_recipient(self.entry_index, recipient, &self.ledger)?;
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn add_entry(&mut self) {
        if !self.require_edit() {
            return;
        }
        self.entry_index = self.settlement.add(&self.ledger);
        if self.entry_index >= self.entry_scroll + self.visible_rows {
            self.entry_scroll = self.entry_index + 1 - self.visible_rows.max(1);
        }
        self.dirty = true;
        self.set_status(format!("Added settlement entry #{}", self.entry_index + 1));
    }

    pub(crate) fn request_delete_entry(&mut self) {
        if self.settlement.is_empty() || !self.require_edit() {
            return;
        }
        let Some(entry) = self.settlement.entries().get(self.entry_index) else {
            return;
        };
        self.confirm_message = format!(
            "Delete entry #{} ({}, {})?",
            self.entry_index + 1,
            entry.recipient,
            entry.month.map(|m| m.label()).unwrap_or("-")
        );
        self.pending_action = Some(PendingAction::DeleteEntry {
            index: self.entry_index,
        });
        self.input_mode = InputMode::Confirm;
    }

    pub(crate) fn delete_entry(&mut self, index: usize) {
        if !self.require_edit() {
            return;
        }
        if self.settlement.remove(index).is_some() {
            clamp_cursor(&mut self.entry_index, &mut self.entry_scroll, self.settlement.len());
            self.dirty = true;
            self.set_status(format!("Deleted entry #{}", index + 1));
        }
    }

    /// Quit, asking first when there are unsaved edits.
    pub(crate) fn request_quit(&mut self) {
        if self.dirty {
            self.confirm_message = "Discard unsaved changes and quit?".into();
            self.pending_action = Some(PendingAction::DiscardAndQuit);
            self.input_mode = InputMode::Confirm;
        } else {
            self.running = false;
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
