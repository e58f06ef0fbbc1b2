use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::models::{LedgerRow, Month};
use crate::totals::{self, coerce_amount, is_plain_amount};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut header_cells: Vec<Cell> = ["SR", "Flat", "Name", "Due"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()))
        .collect();
    for month in Month::all() {
        let style = if month == app.month {
            theme::header_style().fg(theme::YELLOW)
        } else {
            theme::header_style()
        };
        header_cells.push(Cell::from(month.label()).style(style));
    }
    header_cells.push(Cell::from("Total").style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    // Borders, header and footer take four lines.
    let page = area.height.saturating_sub(4) as usize;

    let rows: Vec<Row> = app
        .ledger
        .rows
        .iter()
        .enumerate()
        .skip(app.row_scroll)
        .take(page)
        .map(|(i, row)| {
            let is_cursor = i == app.row_index;
            let base = if is_cursor {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let mut cells = vec![
                Cell::from(row.sr.to_string()),
                Cell::from(row.flat.clone()),
                Cell::from(truncate(&row.name, 10)),
                Cell::from(format_amount(row.dues)),
            ];
            for month in Month::all() {
                let text = truncate(row.entry(month), 8);
                let cell = if is_cursor && month == app.month {
                    Cell::from(text).style(theme::cursor_cell_style())
                } else if is_cursor {
                    Cell::from(text)
                } else {
                    Cell::from(Span::styled(text, entry_style(row, month)))
                };
                cells.push(cell);
            }
            cells.push(Cell::from(format_amount(totals::row_total(row))));
            Row::new(cells).style(base)
        })
        .collect();

    let mut footer_cells = vec![
        Cell::from(""),
        Cell::from(""),
        Cell::from("Total"),
        Cell::from(format_amount(totals::expected_per_month(&app.ledger))),
    ];
    footer_cells.extend(
        totals::month_totals(&app.ledger)
            .into_iter()
            .map(|t| Cell::from(format_amount(t))),
    );
    footer_cells.push(Cell::from(format_amount(totals::grand_total(&app.ledger))));
    let footer = Row::new(footer_cells).style(theme::total_style());

    let mut widths = vec![
        Constraint::Length(3),
        Constraint::Length(6),
        Constraint::Min(8),
        Constraint::Length(6),
    ];
    widths.extend(std::iter::repeat(Constraint::Length(8)).take(Month::count()));
    widths.push(Constraint::Length(9));

    let table = Table::new(rows, widths)
        .header(header)
        .footer(footer)
        .column_spacing(1)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::OVERLAY))
                .title(Span::styled(
                    format!(
                        " Ledger ({} members) | {} collected {} ",
                        app.ledger.rows.len(),
                        app.month,
                        format_amount(totals::month_total(&app.ledger, app.month))
                    ),
                    Style::default()
                        .fg(theme::TEXT_DIM)
                        .add_modifier(Modifier::BOLD),
                )),
        );

    f.render_widget(table, area);
}

fn entry_style(row: &LedgerRow, month: Month) -> Style {
    let cell = row.entry(month);
    if cell.trim().is_empty() {
        theme::dim_style()
    } else if !is_plain_amount(cell) {
        theme::invalid_style()
    } else if coerce_amount(cell) >= row.dues && row.dues > Decimal::ZERO {
        theme::paid_style()
    } else {
        theme::short_style()
    }
}
