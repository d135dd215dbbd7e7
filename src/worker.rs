// ============================================================================
// Background Worker
// ============================================================================
// Thread séparé qui exécute les appels réseau
// - Reçoit des AppCommand via un channel
// - Envoie des AppResult via un autre channel
// - L'UI ne bloque jamais sur le réseau
//
// Les commandes sont traitées une par une, dans l'ordre d'envoi.
// ============================================================================

use std::sync::mpsc;
use std::thread::JoinHandle;

use tracing::{error, info};

use crate::api::CoinGeckoClient;
use crate::models::{ChartPeriod, CoinDetail, CoinMarket, PriceHistory};

/// Commandes envoyées au worker
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Charger une page du classement
    FetchMarkets { page: u32, per_page: u32 },

    /// Charger la fiche d'un coin
    FetchCoinDetails { id: String },

    /// Charger l'historique de prix d'un coin pour une période
    FetchMarketChart { id: String, period: ChartPeriod },
}

impl AppCommand {
    /// Message affiché pendant le chargement
    pub fn loading_message(&self) -> String {
        match self {
            AppCommand::FetchMarkets { page, .. } => format!("Loading page {}...", page),
            AppCommand::FetchCoinDetails { id } => format!("Loading {}...", id),
            AppCommand::FetchMarketChart { id, period } => {
                format!("Loading {} chart ({})...", id, period.label())
            }
        }
    }
}

/// Résultats renvoyés par le worker
///
/// Chaque variant garde les paramètres de la requête pour que l'UI puisse
/// écarter une réponse qui ne correspond plus à l'état courant.
#[derive(Debug)]
pub enum AppResult {
    MarketsLoaded { page: u32, coins: Vec<CoinMarket> },
    CoinDetailsLoaded { detail: CoinDetail },
    MarketChartLoaded { history: PriceHistory },

    /// Échec d'une requête (seule catégorie d'erreur)
    LoadFailed { command: AppCommand, error: String },
}

/// Lance le worker et retourne son handle
///
/// Le thread se termine quand tous les Sender de commandes sont droppés.
pub fn spawn_worker(
    client: CoinGeckoClient,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        // Runtime tokio propre au worker : block_on bloque ce thread, pas l'UI
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime, worker exiting");
                return;
            }
        };

        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");

            let result = runtime.block_on(execute(&client, command));

            if result_tx.send(result).is_err() {
                info!("Result channel closed, worker exiting");
                return;
            }
        }

        info!("Worker thread exiting (channel closed)");
    })
}

/// Exécute une commande et la convertit en résultat
pub async fn execute(client: &CoinGeckoClient, command: AppCommand) -> AppResult {
    let outcome = match &command {
        AppCommand::FetchMarkets { page, per_page } => client
            .fetch_markets(*page, *per_page)
            .await
            .map(|coins| AppResult::MarketsLoaded { page: *page, coins }),

        AppCommand::FetchCoinDetails { id } => client
            .fetch_coin_details(id)
            .await
            .map(|detail| AppResult::CoinDetailsLoaded { detail }),

        AppCommand::FetchMarketChart { id, period } => client
            .fetch_market_chart(id, *period)
            .await
            .map(|history| AppResult::MarketChartLoaded { history }),
    };

    outcome.unwrap_or_else(|e| {
        error!(?command, error = ?e, "Request failed");
        AppResult::LoadFailed {
            command,
            error: format!("{:#}", e),
        }
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_loading_messages() {
        let command = AppCommand::FetchMarkets { page: 2, per_page: 10 };
        assert_eq!(command.loading_message(), "Loading page 2...");

        let command = AppCommand::FetchMarketChart {
            id: "bitcoin".to_string(),
            period: ChartPeriod::NinetyDays,
        };
        assert_eq!(command.loading_message(), "Loading bitcoin chart (90 Days)...");
    }

    #[test]
    fn test_unreachable_api_reports_failure() {
        // Port 9 (discard) : la connexion échoue immédiatement en local
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let client = CoinGeckoClient::new(&config).unwrap();

        let (command_tx, command_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();
        let handle = spawn_worker(client, command_rx, result_tx);

        let command = AppCommand::FetchCoinDetails { id: "bitcoin".to_string() };
        command_tx.send(command.clone()).unwrap();

        match result_rx.recv().unwrap() {
            AppResult::LoadFailed { command: failed, error } => {
                assert_eq!(failed, command);
                assert!(!error.is_empty());
            }
            other => panic!("unexpected result: {:?}", other),
        }

        drop(command_tx);
        handle.join().unwrap();
    }
}
