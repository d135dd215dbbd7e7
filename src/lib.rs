// ============================================================================
// CryptoDash - Library
// ============================================================================
// Dashboard crypto en terminal : classement CoinGecko paginé, fiche et
// graphique de prix par coin, achats fictifs en mémoire
// ============================================================================

pub mod api;     // Client CoinGecko
pub mod app;     // État de l'application
pub mod config;  // Configuration (variables d'environnement)
pub mod handler; // Événements et résultats → état
pub mod models;  // Structures de données
pub mod ui;      // Interface utilisateur
pub mod worker;  // Thread des appels réseau
