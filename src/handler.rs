// ============================================================================
// Handler : événements clavier et résultats du worker → état de l'App
// ============================================================================
// Les fonctions de ce module ne font aucune I/O : elles modifient App et
// retournent éventuellement la commande à envoyer au worker.
// ============================================================================

use std::sync::mpsc;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::app::{App, Screen};
use crate::ui::events::{
    get_char_from_event, is_amount_char_event, is_backspace_event, is_buy_event, is_down_event,
    is_enter_event, is_escape_event, is_force_quit_event, is_next_page_event,
    is_next_period_event, is_previous_page_event, is_previous_period_event, is_quit_event,
    is_refresh_event, is_up_event, Event,
};
use crate::worker::{AppCommand, AppResult};

/// Envoie une commande au worker et active l'indicateur de chargement
pub fn dispatch(app: &mut App, command_tx: &mpsc::Sender<AppCommand>, command: AppCommand) -> Result<()> {
    app.start_loading(command.loading_message());
    command_tx
        .send(command)
        .context("Background worker is no longer running")
}

/// Traite un événement clavier
pub fn handle_event(app: &mut App, event: &Event) -> Option<AppCommand> {
    if matches!(event, Event::Tick) {
        return None;
    }

    if is_force_quit_event(event) {
        info!("User force quit (Ctrl+C)");
        app.quit();
        return None;
    }

    // La modale capture toutes les touches ('q' compris)
    if app.is_in_purchase_input() {
        handle_purchase_input(app, event);
        return None;
    }

    // Two-step quit : toute autre touche annule la confirmation
    if is_quit_event(event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return None;
    }
    app.cancel_quit();

    let command = match app.current_screen {
        Screen::Intro => handle_intro(app, event),
        Screen::Dashboard => handle_dashboard(app, event),
        Screen::CoinDetails => handle_details(app, event),
        Screen::PurchaseInput => None,
    };

    if command.is_some() {
        app.clear_status();
    }
    command
}

fn handle_intro(app: &mut App, event: &Event) -> Option<AppCommand> {
    if is_enter_event(event) {
        info!("User opened dashboard");
        return Some(app.enter_dashboard());
    }
    None
}

fn handle_dashboard(app: &mut App, event: &Event) -> Option<AppCommand> {
    if is_up_event(event) {
        app.navigate_up();
        None
    } else if is_down_event(event) {
        app.navigate_down();
        None
    } else if is_enter_event(event) {
        let command = app.open_details();
        if let Some(id) = &app.detail_coin_id {
            info!(coin = %id, "User opened coin details");
        }
        command
    } else if is_buy_event(event) {
        if app.start_purchase() {
            debug!("User opened purchase modal");
        }
        None
    } else if is_next_page_event(event) {
        let command = app.next_page();
        info!(page = app.page, "User went to next page");
        Some(command)
    } else if is_previous_page_event(event) {
        let command = app.previous_page();
        if command.is_some() {
            info!(page = app.page, "User went to previous page");
        }
        command
    } else if is_refresh_event(event) {
        Some(app.markets_command())
    } else if is_escape_event(event) {
        app.show_intro();
        None
    } else {
        None
    }
}

fn handle_details(app: &mut App, event: &Event) -> Option<AppCommand> {
    if is_escape_event(event) || is_backspace_event(event) {
        debug!("User returned to dashboard");
        app.show_dashboard();
        None
    } else if is_next_period_event(event) {
        let command = app.next_period();
        info!(period = app.current_period.label(), "User changed to next period");
        command
    } else if is_previous_period_event(event) {
        let command = app.previous_period();
        info!(period = app.current_period.label(), "User changed to previous period");
        command
    } else if is_refresh_event(event) {
        if app.coin_details.is_some() {
            app.chart_command()
        } else {
            app.detail_coin_id
                .clone()
                .map(|id| AppCommand::FetchCoinDetails { id })
        }
    } else {
        None
    }
}

fn handle_purchase_input(app: &mut App, event: &Event) {
    if is_escape_event(event) {
        debug!("User closed purchase modal");
        app.clear_status();
        app.cancel_purchase();
    } else if is_enter_event(event) {
        match app.submit_purchase() {
            Ok(purchase) => {
                info!(coin = %purchase.coin_id, amount = purchase.amount, "Purchase saved");
                app.clear_status();
            }
            Err(e) => {
                debug!(error = %e, "Rejected purchase amount");
                app.set_status(e.to_string());
            }
        }
    } else if is_backspace_event(event) {
        app.backspace();
    } else if is_amount_char_event(event) {
        if let Some(c) = get_char_from_event(event) {
            app.clear_status();
            app.append_char(c);
        }
    }
}

/// Traite un résultat du worker ; peut déclencher une requête de suite
/// (fiche reçue → chargement du graphique)
pub fn handle_result(app: &mut App, result: AppResult) -> Option<AppCommand> {
    app.stop_loading();

    match result {
        AppResult::MarketsLoaded { page, coins } => {
            let count = coins.len();
            if app.set_coins(page, coins) {
                info!(page, count, "Market page installed");
            } else {
                debug!(page, current = app.page, "Dropped stale market page");
            }
            None
        }
        AppResult::CoinDetailsLoaded { detail } => {
            let id = detail.id.clone();
            let command = app.set_coin_details(detail);
            if command.is_none() {
                debug!(coin = %id, "Dropped stale coin details");
            }
            command
        }
        AppResult::MarketChartLoaded { history } => {
            let (id, points) = (history.coin_id.clone(), history.len());
            if app.set_price_history(history) {
                info!(coin = %id, points, "Chart installed");
            } else {
                debug!(coin = %id, "Dropped stale chart");
            }
            None
        }
        AppResult::LoadFailed { command, error } => {
            if app.is_current(&command) {
                error!(?command, error = %error, "Failed to load data");
                app.set_status(format!("Request failed: {}", error));
            } else {
                debug!(?command, error = %error, "Dropped stale failure");
            }
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartPeriod, CoinDetail, CoinMarket};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn press(app: &mut App, code: KeyCode) -> Option<AppCommand> {
        handle_event(app, &key(code))
    }

    fn loaded_dashboard() -> App {
        let mut app = App::new();
        press(&mut app, KeyCode::Enter);
        handle_result(
            &mut app,
            AppResult::MarketsLoaded {
                page: 1,
                coins: vec![
                    CoinMarket::new("bitcoin", "btc", "Bitcoin"),
                    CoinMarket::new("ethereum", "eth", "Ethereum"),
                ],
            },
        );
        app
    }

    #[test]
    fn test_intro_enter_fetches_first_page() {
        let mut app = App::new();
        let command = press(&mut app, KeyCode::Enter);
        assert_eq!(command, Some(AppCommand::FetchMarkets { page: 1, per_page: 10 }));
        assert!(app.is_on_dashboard());
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.is_running());
        assert!(app.is_awaiting_quit_confirmation());

        // Une autre touche annule
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.is_awaiting_quit_confirmation());

        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.is_running());
    }

    #[test]
    fn test_pagination_keys() {
        let mut app = loaded_dashboard();
        assert_eq!(press(&mut app, KeyCode::Char('p')), None);
        assert_eq!(
            press(&mut app, KeyCode::Char('n')),
            Some(AppCommand::FetchMarkets { page: 2, per_page: 10 })
        );
        assert_eq!(
            press(&mut app, KeyCode::Left),
            Some(AppCommand::FetchMarkets { page: 1, per_page: 10 })
        );
    }

    #[test]
    fn test_purchase_modal_captures_q() {
        let mut app = loaded_dashboard();
        press(&mut app, KeyCode::Char('b'));
        assert!(app.is_in_purchase_input());

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.is_awaiting_quit_confirmation());
        assert!(app.input_buffer.is_empty());

        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert!(app.is_on_dashboard());
        assert_eq!(app.purchases.len(), 1);
        assert_eq!(app.purchases[0].amount, 4.0);
    }

    #[test]
    fn test_empty_amount_sets_status() {
        let mut app = loaded_dashboard();
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Enter);

        assert!(app.is_in_purchase_input());
        assert!(app.status_message.is_some());

        press(&mut app, KeyCode::Esc);
        assert!(app.is_on_dashboard());
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_details_then_chart_sequence() {
        let mut app = loaded_dashboard();
        let command = press(&mut app, KeyCode::Enter);
        assert_eq!(command, Some(AppCommand::FetchCoinDetails { id: "bitcoin".to_string() }));

        let detail: CoinDetail = serde_json::from_value(serde_json::json!({
            "id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "market_cap_rank": 1
        }))
        .unwrap();
        let follow_up = handle_result(&mut app, AppResult::CoinDetailsLoaded { detail });
        assert_eq!(
            follow_up,
            Some(AppCommand::FetchMarketChart { id: "bitcoin".to_string(), period: ChartPeriod::SevenDays })
        );

        assert_eq!(
            press(&mut app, KeyCode::Char('l')),
            Some(AppCommand::FetchMarketChart { id: "bitcoin".to_string(), period: ChartPeriod::ThirtyDays })
        );

        press(&mut app, KeyCode::Esc);
        assert!(app.is_on_dashboard());
        assert_eq!(app.coins.len(), 2);
    }

    #[test]
    fn test_failure_sets_status_and_stops_loading() {
        let mut app = App::new();
        let (tx, rx) = mpsc::channel();
        let command = press(&mut app, KeyCode::Enter).unwrap();
        dispatch(&mut app, &tx, command.clone()).unwrap();
        assert!(app.is_loading());
        assert_eq!(rx.recv().unwrap(), command);

        handle_result(
            &mut app,
            AppResult::LoadFailed { command, error: "HTTP 429".to_string() },
        );
        assert!(!app.is_loading());
        assert_eq!(app.status_message.as_deref(), Some("Request failed: HTTP 429"));

        // Une nouvelle requête efface le statut
        assert!(press(&mut app, KeyCode::Char('r')).is_some());
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_stale_failure_leaves_status_empty() {
        let mut app = loaded_dashboard();
        press(&mut app, KeyCode::Char('n'));
        handle_result(
            &mut app,
            AppResult::MarketsLoaded { page: 2, coins: vec![CoinMarket::new("solana", "sol", "Solana")] },
        );

        // Échec tardif de la page 1 : la page 2 est déjà affichée
        handle_result(
            &mut app,
            AppResult::LoadFailed {
                command: AppCommand::FetchMarkets { page: 1, per_page: 10 },
                error: "HTTP 429".to_string(),
            },
        );
        assert_eq!(app.page, 2);
        assert_eq!(app.coins.len(), 1);
        assert!(app.status_message.is_none());

        // Échec d'une ancienne période du graphique : ignoré aussi
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('l'));
        handle_result(
            &mut app,
            AppResult::LoadFailed {
                command: AppCommand::FetchMarketChart {
                    id: "solana".to_string(),
                    period: ChartPeriod::SevenDays,
                },
                error: "HTTP 500".to_string(),
            },
        );
        assert!(app.status_message.is_none());

        handle_result(
            &mut app,
            AppResult::LoadFailed {
                command: AppCommand::FetchMarketChart {
                    id: "solana".to_string(),
                    period: ChartPeriod::ThirtyDays,
                },
                error: "HTTP 500".to_string(),
            },
        );
        assert_eq!(app.status_message.as_deref(), Some("Request failed: HTTP 500"));
    }

    #[test]
    fn test_dispatch_fails_when_worker_is_gone() {
        let mut app = App::new();
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let command = app.markets_command();
        assert!(dispatch(&mut app, &tx, command).is_err());
    }
}
