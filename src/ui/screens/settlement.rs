use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.settlement.is_empty() {
        render_empty(f, area);
        return;
    }

    let header_cells = ["#", "Name", "Month", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let page = area.height.saturating_sub(4) as usize;

    let rows: Vec<Row> = app
        .settlement
        .entries()
        .iter()
        .enumerate()
        .skip(app.entry_scroll)
        .take(page)
        .map(|(i, entry)| {
            let style = if i == app.entry_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let month = entry
                .month
                .map(|m| m.label().to_string())
                .unwrap_or_else(|| "-".into());

            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(truncate(entry.recipient.as_str(), 24)),
                Cell::from(month),
                Cell::from(format_amount(entry.amount())),
            ])
            .style(style)
        })
        .collect();

    let footer = Row::new(vec![
        Cell::from(""),
        Cell::from("Total"),
        Cell::from(""),
        Cell::from(format_amount(app.settlement.total())),
    ])
    .style(theme::total_style());

    let widths = [
        Constraint::Length(4),
        Constraint::Min(16),
        Constraint::Length(8),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .footer(footer)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::OVERLAY))
                .title(Span::styled(
                    format!(" Settlement ({}) ", app.settlement.len()),
                    Style::default()
                        .fg(theme::TEXT_DIM)
                        .add_modifier(Modifier::BOLD),
                )),
        );

    f.render_widget(table, area);
}

fn render_empty(f: &mut Frame, area: Rect) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("No settlement entries", theme::dim_style())),
        Line::from(""),
        Line::from(Span::styled(
            "Unlock with u, then press a or use :add to create one",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                " Settlement ",
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(msg, area);
}
