// ============================================================================
// Structure : App
// ============================================================================
// État global de l'application TUI
//
// PATTERN : "Application State"
// - Toutes les vues lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Les méthodes qui nécessitent un appel réseau retournent la commande à
//   envoyer au worker ; App ne fait jamais d'I/O
// ============================================================================

use anyhow::Result;

use crate::config::Config;
use crate::models::{parse_amount, ChartPeriod, CoinDetail, CoinMarket, PriceHistory, Purchase};
use crate::worker::AppCommand;

// ============================================================================
// Enum : Screen
// ============================================================================
// Un seul écran actif à la fois (state machine) :
//
//   Intro ──Enter──▶ Dashboard ──Enter──▶ CoinDetails
//                     │    ▲  ◀────Esc────┘
//                     b   Enter/Esc
//                     ▼    │
//                   PurchaseInput
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Page d'accueil
    Intro,

    /// Classement paginé + liste des achats
    Dashboard,

    /// Fiche d'un coin avec son graphique
    CoinDetails,

    /// Modale de saisie de la quantité achetée (au-dessus du dashboard)
    PurchaseInput,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Devise de cotation (ex: "inr")
    pub vs_currency: String,

    // ---- Dashboard ----
    /// Page courante du classement (commence à 1)
    pub page: u32,

    /// Taille de page
    pub per_page: u32,

    /// Coins de la page courante
    pub coins: Vec<CoinMarket>,

    /// Index de la ligne sélectionnée
    pub selected_index: usize,

    /// Achats enregistrés (perdus à la fermeture)
    pub purchases: Vec<Purchase>,

    // ---- Modale d'achat ----
    /// Coin en cours d'achat
    pub pending_purchase: Option<CoinMarket>,

    /// Quantité en cours de saisie
    pub input_buffer: String,

    // ---- Fiche détaillée ----
    /// Coin affiché dans la vue détail
    pub detail_coin_id: Option<String>,

    /// Fiche chargée (None = "Loading...")
    pub coin_details: Option<CoinDetail>,

    /// Historique affiché par le graphique
    pub price_history: Option<PriceHistory>,

    /// Période du graphique
    pub current_period: ChartPeriod,

    // ---- Statut ----
    /// Two-step quit : première pression de 'q' → confirmation
    pub confirm_quit: bool,

    /// Nombre de requêtes envoyées au worker sans réponse
    pub pending_requests: usize,

    /// Message affiché pendant le chargement
    pub loading_message: Option<String>,

    /// Dernière erreur à afficher dans le footer
    pub status_message: Option<String>,
}

impl App {
    /// Crée l'application avec la configuration par défaut
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Crée l'application à partir de la configuration
    pub fn with_config(config: &Config) -> Self {
        Self {
            running: true,
            current_screen: Screen::Intro,
            vs_currency: config.vs_currency.clone(),
            page: 1,
            per_page: config.per_page,
            coins: Vec::new(),
            selected_index: 0,
            purchases: Vec::new(),
            pending_purchase: None,
            input_buffer: String::new(),
            detail_coin_id: None,
            coin_details: None,
            price_history: None,
            current_period: ChartPeriod::default(),
            confirm_quit: false,
            pending_requests: 0,
            loading_message: None,
            status_message: None,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Quit confirmation
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Chargement
    // ========================================================================

    /// Enregistre une requête envoyée au worker
    pub fn start_loading(&mut self, message: String) {
        self.pending_requests += 1;
        self.loading_message = Some(message);
    }

    /// Enregistre la réponse d'une requête
    pub fn stop_loading(&mut self) {
        self.pending_requests = self.pending_requests.saturating_sub(1);
        if self.pending_requests == 0 {
            self.loading_message = None;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending_requests > 0
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    // ========================================================================
    // Navigation entre écrans
    // ========================================================================

    /// Intro → Dashboard ; retourne la requête de la page courante
    pub fn enter_dashboard(&mut self) -> AppCommand {
        self.current_screen = Screen::Dashboard;
        self.markets_command()
    }

    /// Retour à la page d'accueil
    pub fn show_intro(&mut self) {
        self.current_screen = Screen::Intro;
    }

    /// Retour au dashboard (depuis la fiche ou la modale)
    ///
    /// La page déjà chargée est conservée.
    pub fn show_dashboard(&mut self) {
        self.current_screen = Screen::Dashboard;
    }

    pub fn is_on_intro(&self) -> bool {
        self.current_screen == Screen::Intro
    }

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    pub fn is_on_details(&self) -> bool {
        self.current_screen == Screen::CoinDetails
    }

    pub fn is_in_purchase_input(&self) -> bool {
        self.current_screen == Screen::PurchaseInput
    }

    // ========================================================================
    // Dashboard : sélection et pagination
    // ========================================================================

    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_index = self.coins.len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    pub fn selected_coin(&self) -> Option<&CoinMarket> {
        self.coins.get(self.selected_index)
    }

    /// Requête de la page courante
    pub fn markets_command(&self) -> AppCommand {
        AppCommand::FetchMarkets {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Page suivante (toujours possible, pas de borne haute connue)
    pub fn next_page(&mut self) -> AppCommand {
        self.page += 1;
        self.markets_command()
    }

    /// Page précédente ; None sur la première page
    pub fn previous_page(&mut self) -> Option<AppCommand> {
        if self.page <= 1 {
            return None;
        }
        self.page -= 1;
        Some(self.markets_command())
    }

    /// Installe une page reçue du worker
    ///
    /// Retourne false si la page ne correspond plus à la page courante.
    pub fn set_coins(&mut self, page: u32, coins: Vec<CoinMarket>) -> bool {
        if page != self.page {
            return false;
        }
        self.coins = coins;
        self.selected_index = 0;
        true
    }

    // ========================================================================
    // Fiche détaillée
    // ========================================================================

    /// Dashboard → CoinDetails pour le coin sélectionné
    ///
    /// La fiche et le graphique précédents sont abandonnés ; la période
    /// revient à sa valeur par défaut.
    pub fn open_details(&mut self) -> Option<AppCommand> {
        let id = self.selected_coin()?.id.clone();

        self.current_screen = Screen::CoinDetails;
        self.detail_coin_id = Some(id.clone());
        self.coin_details = None;
        self.price_history = None;
        self.current_period = ChartPeriod::default();

        Some(AppCommand::FetchCoinDetails { id })
    }

    /// Requête du graphique pour le coin et la période courants
    pub fn chart_command(&self) -> Option<AppCommand> {
        self.detail_coin_id.as_ref().map(|id| AppCommand::FetchMarketChart {
            id: id.clone(),
            period: self.current_period,
        })
    }

    /// Installe la fiche reçue ; déclenche le chargement du graphique
    ///
    /// Une seconde fiche pour le même coin remplace la première sans
    /// relancer le graphique.
    pub fn set_coin_details(&mut self, detail: CoinDetail) -> Option<AppCommand> {
        if self.detail_coin_id.as_deref() != Some(detail.id.as_str()) {
            return None;
        }
        let first_load = self.coin_details.is_none();
        self.coin_details = Some(detail);
        if first_load {
            self.chart_command()
        } else {
            None
        }
    }

    /// Vrai si la commande correspond encore à l'état affiché
    ///
    /// Sert à écarter les réponses (succès ou échec) de requêtes périmées.
    pub fn is_current(&self, command: &AppCommand) -> bool {
        match command {
            AppCommand::FetchMarkets { page, .. } => *page == self.page,
            AppCommand::FetchCoinDetails { id } => self.detail_coin_id.as_deref() == Some(id.as_str()),
            AppCommand::FetchMarketChart { id, period } => {
                self.detail_coin_id.as_deref() == Some(id.as_str()) && *period == self.current_period
            }
        }
    }

    /// Installe un historique reçu ; l'ancien graphique est droppé
    pub fn set_price_history(&mut self, history: PriceHistory) -> bool {
        let matches = self.detail_coin_id.as_deref() == Some(history.coin_id.as_str())
            && history.period == self.current_period;
        if matches {
            self.price_history = Some(history);
        }
        matches
    }

    pub fn next_period(&mut self) -> Option<AppCommand> {
        self.change_period(self.current_period.next())
    }

    pub fn previous_period(&mut self) -> Option<AppCommand> {
        self.change_period(self.current_period.previous())
    }

    /// Change la période ; le graphique n'est rechargé qu'une fois la fiche là
    fn change_period(&mut self, period: ChartPeriod) -> Option<AppCommand> {
        self.current_period = period;
        self.coin_details.as_ref()?;
        self.chart_command()
    }

    // ========================================================================
    // Achats
    // ========================================================================

    /// Ouvre la modale d'achat pour le coin sélectionné
    pub fn start_purchase(&mut self) -> bool {
        let Some(coin) = self.selected_coin().cloned() else {
            return false;
        };
        self.pending_purchase = Some(coin);
        self.input_buffer.clear();
        self.current_screen = Screen::PurchaseInput;
        true
    }

    /// Ferme la modale sans enregistrer
    pub fn cancel_purchase(&mut self) {
        self.pending_purchase = None;
        self.input_buffer.clear();
        self.current_screen = Screen::Dashboard;
    }

    /// Valide la modale : parse la quantité et enregistre l'achat
    ///
    /// En cas de quantité invalide, la modale reste ouverte.
    pub fn submit_purchase(&mut self) -> Result<&Purchase> {
        let amount = parse_amount(&self.input_buffer)?;
        let coin = self
            .pending_purchase
            .take()
            .ok_or_else(|| anyhow::anyhow!("No coin selected for purchase"))?;

        self.purchases.push(Purchase::new(&coin, amount));
        self.input_buffer.clear();
        self.current_screen = Screen::Dashboard;

        self.purchases
            .last()
            .ok_or_else(|| anyhow::anyhow!("Purchase was not recorded"))
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
