// ============================================================================
// Module : ui
// ============================================================================
// Interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod dashboard; // Classement paginé + achats + modale d'achat
pub mod details;   // Fiche d'un coin + graphique
pub mod events;    // Gestion des événements clavier
pub mod format;    // Formatage des prix et capitalisations
pub mod intro;     // Page d'accueil

pub use events::{Event, EventHandler};

use ratatui::Frame;

use crate::app::{App, Screen};

/// Dessine l'écran courant
///
/// Le compilateur garantit que chaque Screen a son rendu.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.size();

    match app.current_screen {
        Screen::Intro => intro::render_intro(frame, app, area),
        Screen::Dashboard => dashboard::render_dashboard(frame, app, area),
        Screen::CoinDetails => details::render_details(frame, app, area),
        Screen::PurchaseInput => {
            // La modale s'affiche par-dessus le dashboard
            dashboard::render_dashboard(frame, app, area);
            dashboard::render_purchase_modal(frame, app, area);
        }
    }
}

// ============================================================================
// Tests : rendu dans un TestBackend
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartPeriod, CoinDetail, CoinMarket, PriceHistory, PricePoint};
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};

    /// Rend l'app et retourne le contenu de l'écran sous forme de texte
    fn draw(app: &App) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    fn bitcoin() -> CoinMarket {
        let mut coin = CoinMarket::new("bitcoin", "btc", "Bitcoin");
        coin.current_price = Some(5_623_411.5);
        coin.market_cap = Some(110_734_567_890_123.0);
        coin.market_cap_rank = Some(1);
        coin.price_change_percentage_24h = Some(1.5);
        coin
    }

    #[test]
    fn test_render_intro() {
        let app = App::new();
        let screen = draw(&app);
        assert!(screen.contains("CryptoDash"));
        assert!(screen.contains("Dashboard"));
    }

    #[test]
    fn test_render_dashboard_table_and_purchases() {
        let mut app = App::new();
        app.enter_dashboard();
        app.set_coins(1, vec![bitcoin()]);
        app.start_purchase();
        app.append_char('2');
        app.submit_purchase().unwrap();

        let screen = draw(&app);
        assert!(screen.contains("Cryptocurrency Dashboard"));
        assert!(screen.contains("Current Price (INR)"));
        assert!(screen.contains("BTC"));
        assert!(screen.contains("₹110,734,567,890,123"));
        assert!(screen.contains("Bitcoin - Amount: 2  (₹11246823.00)"));
    }

    #[test]
    fn test_render_purchase_modal() {
        let mut app = App::new();
        app.enter_dashboard();
        app.set_coins(1, vec![bitcoin()]);
        app.start_purchase();
        app.append_char('5');

        let screen = draw(&app);
        assert!(screen.contains("Buy Bitcoin"));
        assert!(screen.contains("Amount: 5"));
    }

    #[test]
    fn test_render_details_loading_then_loaded() {
        let mut app = App::new();
        app.enter_dashboard();
        app.set_coins(1, vec![bitcoin()]);
        app.open_details();
        assert!(draw(&app).contains("Loading..."));

        let detail: CoinDetail = serde_json::from_value(serde_json::json!({
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "market_cap_rank": 1,
            "description": { "en": "Peer-to-peer cash." },
            "links": { "homepage": ["http://www.bitcoin.org"] }
        }))
        .unwrap();
        app.set_coin_details(detail);

        let mut history = PriceHistory::new("bitcoin".to_string(), ChartPeriod::SevenDays);
        for day in 1..=7 {
            let time = Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap();
            history.add_point(PricePoint::new(time, 5_000_000.0 + day as f64 * 10_000.0));
        }
        app.set_price_history(history);

        let screen = draw(&app);
        assert!(screen.contains("Bitcoin (BTC)"));
        assert!(screen.contains("Bitcoin Price (INR)"));
        assert!(screen.contains("Market Cap Rank: 1"));
        assert!(screen.contains("http://www.bitcoin.org"));
    }
}
