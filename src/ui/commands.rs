use std::collections::HashMap;
use std::sync::LazyLock;

use super::app::{App, InputMode, Screen};
use crate::models::Month;
use crate::settlement::Recipient;
use crate::store::Store;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &Store) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit Kitti", cmd_quit, r);
    register_command!("quit", "Quit Kitti", cmd_quit, r);
    register_command!("q!", "Quit without saving", cmd_force_quit, r);
    register_command!("w", "Save ledger and settlement sheet", cmd_save, r);
    register_command!("save", "Save ledger and settlement sheet", cmd_save, r);
    register_command!("wq", "Save and quit", cmd_save_quit, r);
    register_command!("l", "Go to Ledger", cmd_ledger, r);
    register_command!("ledger", "Go to Ledger", cmd_ledger, r);
    register_command!("s", "Go to Settlement", cmd_settlement, r);
    register_command!("settlement", "Go to Settlement", cmd_settlement, r);
    register_command!("unlock", "Enter the edit password", cmd_unlock, r);
    register_command!("lock", "Return to read-only mode", cmd_lock, r);
    register_command!("reload", "Discard edits and reload from disk", cmd_reload, r);
    register_command!(
        "month",
        "Focus a month, or set the entry's month (e.g. :month Jan-26, :month -)",
        cmd_month,
        r
    );
    register_command!("m", "Focus or set a month (e.g. :m Jan-26)", cmd_month, r);
    register_command!(
        "recipient",
        "Set the entry's recipient (e.g. :recipient None)",
        cmd_recipient,
        r
    );
    register_command!("add", "Add a settlement entry", cmd_add, r);
    register_command!("delete", "Delete the selected settlement entry", cmd_delete, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, store)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.request_quit();
    Ok(())
}

fn cmd_force_quit(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_save(_args: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    app.save(store)
}

fn cmd_save_quit(_args: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    if !app.require_edit() {
        return Ok(());
    }
    app.save(store)?;
    app.running = false;
    Ok(())
}

fn cmd_ledger(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.screen = Screen::Ledger;
    Ok(())
}

fn cmd_settlement(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.screen = Screen::Settlement;
    Ok(())
}

fn cmd_unlock(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.password_input.clear();
    app.input_mode = InputMode::Password;
    Ok(())
}

fn cmd_lock(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.lock();
    Ok(())
}

fn cmd_reload(_args: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    app.set_status("");
    app.reload(store)?;
    if app.status_message.is_empty() {
        app.set_status("Reloaded from disk");
    }
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status(format!("Usage: :month <{}>", Month::labels().join("|")));
        return Ok(());
    }

    match app.screen {
        Screen::Ledger => match Month::parse(args) {
            Some(month) => {
                app.month = month;
                app.set_status(format!("Focused {month}"));
            }
            None => app.set_status(format!("Unknown month: {args}")),
        },
        Screen::Settlement => {
            if app.settlement.is_empty() || !app.require_edit() {
                return Ok(());
            }
            let month = if args == "-" {
                None
            } else {
                match Month::parse(args) {
                    Some(m) => Some(m),
                    None => {
                        app.set_status(format!("Unknown month: {args}"));
                        return Ok(());
                    }
                }
            };
            app.settlement
                .select_month(app.entry_index, month, &app.ledger)?;
            app.dirty = true;
        }
    }
    Ok(())
}

fn cmd_recipient(args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    if app.settlement.is_empty() || !app.require_edit() {
        return Ok(());
    }
    let recipient = Recipient::parse(args);
    if let Recipient::Member(name) = &recipient {
        if !app.ledger.rows.iter().any(|r| recipient.matches(r)) {
            app.set_status(format!("'{name}' is not on the ledger"));
            return Ok(());
        }
    }
    app.screen = Screen::Settlement;
    app.settlement
        .select_recipient(app.entry_index, recipient, &app.ledger)?;
    app.dirty = true;
    Ok(())
}

fn cmd_add(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.screen = Screen::Settlement;
    app.add_entry();
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.screen = Screen::Settlement;
    app.request_delete_entry();
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
