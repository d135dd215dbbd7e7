// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application : réponses CoinGecko désérialisées
// et achats saisis en mémoire
// ============================================================================

pub mod coin;          // Résumé d'un coin (ligne du tableau)
pub mod coin_detail;   // Fiche détaillée d'un coin
pub mod price_history; // Historique de prix + période du graphique
pub mod purchase;      // Achats en mémoire

// Re-export des structures principales
// use cryptodash::models::CoinMarket au lieu de models::coin::CoinMarket
pub use coin::CoinMarket;
pub use coin_detail::CoinDetail;
pub use price_history::{ChartPeriod, PriceHistory, PricePoint};
pub use purchase::{parse_amount, Purchase};
