// ============================================================================
// Dashboard - Classement paginé et achats
// ============================================================================
// Layout :
//   ┌ header ─────────────────────────────┐
//   │ tableau des coins de la page        │
//   │ liste des achats                    │
//   └ footer (raccourcis / statut) ───────┘
// La modale d'achat est dessinée par-dessus (widget Clear).
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::models::CoinMarket;
use crate::ui::format::{format_change, format_market_cap, format_price};

/// Hauteur max de la liste des achats (bordures comprises)
const MAX_PURCHASES_HEIGHT: u16 = 8;

/// Hauteur de la liste des achats : une ligne par achat + bordures
fn purchases_height(count: usize) -> u16 {
    u16::try_from(count)
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .clamp(3, MAX_PURCHASES_HEIGHT)
}

/// Dessine le dashboard
pub fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let purchases_height = purchases_height(app.purchases.len());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                // Header
            Constraint::Min(5),                   // Tableau
            Constraint::Length(purchases_height), // Achats
            Constraint::Length(3),                // Footer
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_coin_table(frame, app, chunks[1]);
    render_purchases(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut spans = vec![
        Span::styled(
            "Cryptocurrency Dashboard",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  ·  Page {}", app.page)),
    ];

    if let Some(message) = app.loading_message.as_ref().filter(|_| app.is_loading()) {
        spans.push(Span::styled(
            format!("  ⟳ {}", message),
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tableau des coins
// ============================================================================

fn render_coin_table(frame: &mut Frame, app: &App, area: Rect) {
    let currency = app.vs_currency.to_uppercase();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📊 Markets ");

    if app.coins.is_empty() {
        let message = if app.is_loading() { "Loading..." } else { "No coins on this page" };
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        ])
        .block(block)
        .alignment(Alignment::Center);

        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        "#".to_string(),
        "Name".to_string(),
        "Symbol".to_string(),
        format!("Current Price ({})", currency),
        format!("Market Cap ({})", currency),
        "24h".to_string(),
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .coins
        .iter()
        .enumerate()
        .map(|(index, coin)| coin_row(coin, &app.vs_currency, index == app.selected_index))
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Min(16),
        Constraint::Length(8),
        Constraint::Length(22),
        Constraint::Length(28),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

/// Une ligne du tableau ; le prix est vert si le coin monte sur 24h
fn coin_row<'a>(coin: &'a CoinMarket, vs_currency: &str, selected: bool) -> Row<'a> {
    let price_color = if coin.is_positive() { Color::Green } else { Color::Red };
    let rank = coin
        .market_cap_rank
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());

    let row = Row::new(vec![
        Cell::from(rank),
        Cell::from(coin.name.as_str()),
        Cell::from(coin.ticker()),
        Cell::from(format_price(coin.current_price, vs_currency))
            .style(Style::default().fg(price_color)),
        Cell::from(format_market_cap(coin.market_cap, vs_currency)),
        Cell::from(format_change(coin.price_change_percentage_24h))
            .style(Style::default().fg(price_color)),
    ]);

    if selected {
        row.style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
    } else {
        row
    }
}

// ============================================================================
// Achats
// ============================================================================

fn render_purchases(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Purchased Coins ");

    if app.purchases.is_empty() {
        let paragraph = Paragraph::new(Span::styled(
            "No purchases yet",
            Style::default().fg(Color::Gray),
        ))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    // Les achats les plus récents restent visibles quand la zone déborde
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.purchases.len().saturating_sub(visible);

    let items: Vec<ListItem> = app
        .purchases
        .iter()
        .skip(skip)
        .map(|purchase| {
            ListItem::new(Line::from(vec![
                Span::raw(purchase.display()),
                Span::styled(
                    format!("  ({})", format_price(purchase.total_value(), &app.vs_currency)),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

// ============================================================================
// Footer
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(Span::styled(
            "⚠  Press [q] again to quit, any other key to cancel ⚠",
            key.add_modifier(Modifier::SLOW_BLINK),
        ))
    } else if let Some(status) = &app.status_message {
        Line::from(Span::styled(format!("✗ {}", status), Style::default().fg(Color::Red)))
    } else {
        let previous_style = if app.page > 1 { key } else { Style::default().fg(Color::DarkGray) };
        Line::from(vec![
            Span::styled("[↑↓]", key),
            Span::raw(" Select  "),
            Span::styled("[Enter]", key),
            Span::raw(" Details  "),
            Span::styled("[b]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Buy  "),
            Span::styled("[p]", previous_style),
            Span::raw(" Previous Page  "),
            Span::styled("[n]", key),
            Span::raw(" Next Page  "),
            Span::styled("[r]", key),
            Span::raw(" Refresh  "),
            Span::styled("[q]", key),
            Span::raw(" Quit"),
        ])
    };

    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Modale d'achat
// ============================================================================

/// Dessine la modale "Buy {coin}" au centre de l'écran
pub fn render_purchase_modal(frame: &mut Frame, app: &App, area: Rect) {
    let Some(coin) = &app.pending_purchase else {
        return;
    };

    let popup = centered_rect(50, 9, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(format!(" Buy {} ", coin.name));

    let mut lines = vec![
        Line::from(format!(
            "Price: {}",
            format_price(coin.current_price, &app.vs_currency)
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Amount: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(app.input_buffer.as_str()),
            Span::styled("█", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::from(""),
    ];

    if let Some(status) = &app.status_message {
        lines.push(Line::from(Span::styled(status.as_str(), Style::default().fg(Color::Red))));
    } else {
        lines.push(Line::from(vec![
            Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Save Purchase  "),
            Span::styled("[Esc]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Close"),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// Rectangle centré : largeur en pourcentage, hauteur en lignes
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
