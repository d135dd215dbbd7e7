// ============================================================================
// Details - Fiche d'un coin et graphique de prix
// ============================================================================
// Affiche :
// 1. Titre "Bitcoin (BTC)" + sélecteur de période
// 2. Graphique ligne du prix (axe X : dates "MMM DD", axe Y : prix)
// 3. Rang, description et page d'accueil
//
// CONCEPTS RATATUI :
// - Chart / Dataset / Axis : graphique ligne
// - Paragraph + Wrap : texte long (description)
// ============================================================================

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::models::{ChartPeriod, CoinDetail, PriceHistory};
use crate::ui::format::{currency_symbol, format_change};

/// Format des dates de l'axe X ("Mar 01")
const DATE_FORMAT: &str = "%b %d";

/// Dessine la vue détail
pub fn render_details(frame: &mut Frame, app: &App, area: Rect) {
    // Tant que la fiche n'est pas là : "Loading..."
    let Some(detail) = &app.coin_details else {
        render_loading(frame, app, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),       // Titre + période
            Constraint::Percentage(55),  // Graphique
            Constraint::Min(5),          // Infos
            Constraint::Length(3),       // Footer
        ])
        .split(area);

    render_title(frame, app, detail, chunks[0]);
    render_price_chart(frame, app, detail, chunks[1]);
    render_info(frame, detail, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("Loading...", Style::default().fg(Color::Yellow))),
        Line::from(""),
    ];

    if let Some(status) = &app.status_message {
        lines.push(Line::from(Span::styled(status.as_str(), Style::default().fg(Color::Red))));
    }
    lines.push(Line::from(Span::styled("[Esc] Back", Style::default().fg(Color::Gray))));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        area,
    );
}

// ============================================================================
// Titre et sélecteur de période
// ============================================================================

fn render_title(frame: &mut Frame, app: &App, detail: &CoinDetail, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" 📈 {} ", detail.title()));

    let mut spans = vec![Span::raw("Time Period: ")];
    for period in ChartPeriod::ALL {
        let style = if period == app.current_period {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", period.label()), style));
        spans.push(Span::raw(" "));
    }

    if let Some(change) = app.price_history.as_ref().and_then(PriceHistory::change_percent) {
        let color = if change > 0.0 { Color::Green } else { Color::Red };
        spans.push(Span::styled(format_change(Some(change)), Style::default().fg(color)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Graphique
// ============================================================================

fn render_price_chart(frame: &mut Frame, app: &App, detail: &CoinDetail, area: Rect) {
    let currency = app.vs_currency.to_uppercase();
    let title = format!(" {} Price ({}) ", detail.name, currency);

    // Historique absent ou d'une autre période : encore en chargement
    let history = match &app.price_history {
        Some(history) if history.period == app.current_period => history,
        _ => {
            let message = if app.is_loading() { "Loading chart..." } else { "No chart data" };
            let paragraph = Paragraph::new(vec![Line::from(""), Line::from(message)])
                .block(Block::default().borders(Borders::ALL).title(title))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }
    };

    let points = history.chart_points();
    let Some((min_price, max_price)) = history.price_bounds() else {
        return;
    };

    // Marge de 5% pour que la courbe ne colle pas aux bords
    let margin = ((max_price - min_price) * 0.05).max(max_price.abs() * 0.001);
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    let x_min = points.first().map(|p| p.0).unwrap_or(0.0);
    let x_max = points.last().map(|p| p.0).unwrap_or(0.0).max(x_min + 1.0);

    let color = if history.change_percent().map(|c| c > 0.0).unwrap_or(false) {
        Color::Green
    } else {
        Color::Red
    };

    let datasets = vec![Dataset::default()
        .name(format!("{} Price ({})", detail.name, currency))
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([x_min, x_max])
        .labels(date_labels(history).into_iter().map(Span::raw).collect());

    let symbol = currency_symbol(&app.vs_currency);
    let y_axis = Axis::default()
        .title(format!("Price ({})", currency))
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{}{:.2}", symbol, y_min)),
            Span::raw(format!("{}{:.2}", symbol, (y_min + y_max) / 2.0)),
            Span::raw(format!("{}{:.2}", symbol, y_max)),
        ]);

    // Légende masquée : le titre du bloc porte déjà le label
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .x_axis(x_axis)
        .y_axis(y_axis)
        .hidden_legend_constraints((Constraint::Length(0), Constraint::Length(0)));

    frame.render_widget(chart, area);
}

/// Labels de l'axe X : première, milieu et dernière date
pub fn date_labels(history: &PriceHistory) -> Vec<String> {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return Vec::new();
    };

    let middle_ts = (first.time.timestamp() + last.time.timestamp()) / 2;
    let middle = DateTime::<Utc>::from_timestamp(middle_ts, 0).unwrap_or(first.time);

    vec![
        first.time.format(DATE_FORMAT).to_string(),
        middle.format(DATE_FORMAT).to_string(),
        last.time.format(DATE_FORMAT).to_string(),
    ]
}

// ============================================================================
// Infos : rang, description, page d'accueil
// ============================================================================

fn render_info(frame: &mut Frame, detail: &CoinDetail, area: Rect) {
    let rank = detail
        .market_cap_rank
        .map(|r| r.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Market Cap Rank: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(rank),
        ]),
        Line::from(vec![
            Span::styled("Homepage: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                detail.homepage().unwrap_or("N/A").to_string(),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            ),
        ]),
        Line::from(""),
    ];

    lines.extend(detail.description_text().lines().map(|line| Line::from(line.to_string())));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Info "),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let line = if let Some(status) = &app.status_message {
        Line::from(Span::styled(format!("✗ {}", status), Style::default().fg(Color::Red)))
    } else {
        Line::from(vec![
            Span::styled("[h/l]", key),
            Span::raw(" Time Period  "),
            Span::styled("[r]", key),
            Span::raw(" Reload  "),
            Span::styled("[Esc]", key),
            Span::raw(" Back  "),
            Span::styled("[q]", key),
            Span::raw(" Quit"),
        ])
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(
        Paragraph::new(line).block(block).alignment(Alignment::Center),
        area,
    );
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::TimeZone;

    #[test]
    fn test_date_labels() {
        let mut history = PriceHistory::new("bitcoin".to_string(), ChartPeriod::SevenDays);
        for day in 1..=7 {
            let time = Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap();
            history.add_point(PricePoint::new(time, 100.0 + day as f64));
        }

        assert_eq!(date_labels(&history), vec!["Mar 01", "Mar 04", "Mar 07"]);
    }

    #[test]
    fn test_date_labels_empty() {
        let history = PriceHistory::new("bitcoin".to_string(), ChartPeriod::SevenDays);
        assert!(date_labels(&history).is_empty());
    }
}
