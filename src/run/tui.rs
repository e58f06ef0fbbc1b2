use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::gate::AccessGate;
use crate::store::Store;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(store: &Store, gate: &AccessGate) -> Result<()> {
    let mut app = App::new(store, gate.clone())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: &Store,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // tab + status + command bars, table borders, header and footer rows
            let content_height = f.area().height.saturating_sub(7) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, store)?,
                InputMode::Command => handle_command_input(key, app, store)?,
                InputMode::Password => handle_password_input(key, app),
                InputMode::Editing => handle_editing_input(key, app)?,
                InputMode::Confirm => handle_confirm_input(key, app),
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, store: &Store) -> Result<()> {
    match key.code {
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.request_quit();
        }
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('1') => app.screen = Screen::Ledger,
        KeyCode::Char('2') => app.screen = Screen::Settlement,
        KeyCode::Tab | KeyCode::BackTab => {
            app.screen = match app.screen {
                Screen::Ledger => Screen::Settlement,
                Screen::Settlement => Screen::Ledger,
            };
        }
        KeyCode::Char('j') | KeyCode::Down => move_down(app),
        KeyCode::Char('k') | KeyCode::Up => move_up(app),
        KeyCode::Char('g') => goto_top(app),
        KeyCode::Char('G') => goto_bottom(app),
        KeyCode::Char('h') | KeyCode::Left => match app.screen {
            Screen::Ledger => app.month = app.month.prev(),
            Screen::Settlement => app.shift_entry_month(-1)?,
        },
        KeyCode::Char('l') | KeyCode::Right => match app.screen {
            Screen::Ledger => app.month = app.month.next(),
            Screen::Settlement => app.shift_entry_month(1)?,
        },
        KeyCode::Char('n') if app.screen == Screen::Settlement => app.cycle_recipient(1)?,
        KeyCode::Char('p') if app.screen == Screen::Settlement => app.cycle_recipient(-1)?,
        KeyCode::Char('x') if app.screen == Screen::Settlement => app.clear_entry_month()?,
        KeyCode::Char('a') if app.screen == Screen::Settlement => app.add_entry(),
        KeyCode::Char('D') if app.screen == Screen::Settlement => app.request_delete_entry(),
        KeyCode::Enter if app.screen == Screen::Ledger => app.begin_edit(),
        KeyCode::Char('u') => {
            if app.session.can_edit() {
                app.set_status("Already unlocked");
            } else {
                app.password_input.clear();
                app.input_mode = InputMode::Password;
            }
        }
        KeyCode::Char('w') => app.save(store)?,
        KeyCode::Esc => app.set_status(""),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, store: &Store) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, store)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => app.command_input.push(c),
        _ => {}
    }
    Ok(())
}

fn handle_password_input(key: event::KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter => {
            let secret = std::mem::take(&mut app.password_input);
            app.input_mode = InputMode::Normal;
            app.unlock(&secret);
        }
        KeyCode::Esc => {
            app.password_input.clear();
            app.input_mode = InputMode::Normal;
            app.set_status("Unlock cancelled");
        }
        KeyCode::Backspace => {
            app.password_input.pop();
        }
        KeyCode::Char(c) => app.password_input.push(c),
        _ => {}
    }
}

fn handle_editing_input(key: event::KeyEvent, app: &mut App) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let value = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            app.commit_edit(&value)?;
        }
        KeyCode::Tab => {
            // commit and move to the next month, like a spreadsheet
            let value = std::mem::take(&mut app.command_input);
            app.commit_edit(&value)?;
            app.month = app.month.next();
            app.input_mode = InputMode::Normal;
            app.begin_edit();
        }
        KeyCode::Esc => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
            app.set_status("Edit cancelled");
        }
        KeyCode::Backspace => {
            app.command_input.pop();
        }
        KeyCode::Char(c) => app.command_input.push(c),
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App) {
    app.input_mode = InputMode::Normal;
    let action = app.pending_action.take();
    app.confirm_message.clear();

    if !matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        app.set_status("Cancelled");
        return;
    }
    match action {
        Some(PendingAction::DeleteEntry { index }) => app.delete_entry(index),
        Some(PendingAction::DiscardAndQuit) => app.running = false,
        None => {}
    }
}

// ── Navigation ───────────────────────────────────────────────

fn move_down(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Ledger => {
            let len = app.ledger.rows.len();
            scroll_down(&mut app.row_index, &mut app.row_scroll, len, page);
        }
        Screen::Settlement => {
            let len = app.settlement.len();
            scroll_down(&mut app.entry_index, &mut app.entry_scroll, len, page);
        }
    }
}

fn move_up(app: &mut App) {
    match app.screen {
        Screen::Ledger => scroll_up(&mut app.row_index, &mut app.row_scroll),
        Screen::Settlement => scroll_up(&mut app.entry_index, &mut app.entry_scroll),
    }
}

fn goto_top(app: &mut App) {
    match app.screen {
        Screen::Ledger => scroll_to_top(&mut app.row_index, &mut app.row_scroll),
        Screen::Settlement => scroll_to_top(&mut app.entry_index, &mut app.entry_scroll),
    }
}

fn goto_bottom(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Ledger => {
            let len = app.ledger.rows.len();
            scroll_to_bottom(&mut app.row_index, &mut app.row_scroll, len, page);
        }
        Screen::Settlement => {
            let len = app.settlement.len();
            scroll_to_bottom(&mut app.entry_index, &mut app.entry_scroll, len, page);
        }
    }
}
