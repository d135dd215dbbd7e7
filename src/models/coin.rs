// ============================================================================
// Structure : CoinMarket
// ============================================================================
// Résumé d'une crypto tel que renvoyé par /coins/markets (une ligne du tableau)
//
// CONCEPTS RUST :
// 1. Option<f64> : CoinGecko renvoie null pour les coins sans cotation
// 2. #[derive(Deserialize)] : mapping direct des champs JSON (déjà en snake_case)
// ============================================================================

use serde::{Deserialize, Serialize};

/// Une crypto du classement par capitalisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinMarket {
    /// Identifiant CoinGecko (ex: "bitcoin"), utilisé dans les URLs de détail
    pub id: String,

    /// Symbole en minuscules (ex: "btc")
    pub symbol: String,

    /// Nom complet (ex: "Bitcoin")
    pub name: String,

    /// URL de l'icône
    pub image: Option<String>,

    /// Prix actuel dans la devise demandée (vs_currency)
    pub current_price: Option<f64>,

    /// Capitalisation de marché
    pub market_cap: Option<f64>,

    /// Rang par capitalisation
    pub market_cap_rank: Option<u32>,

    /// Variation sur 24h en pourcentage
    pub price_change_percentage_24h: Option<f64>,
}

impl CoinMarket {
    /// Crée un coin minimal (sans cotation)
    pub fn new(id: &str, symbol: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            image: None,
            current_price: None,
            market_cap: None,
            market_cap_rank: None,
            price_change_percentage_24h: None,
        }
    }

    /// Symbole en majuscules pour l'affichage (ex: "BTC")
    pub fn ticker(&self) -> String {
        self.symbol.to_uppercase()
    }

    /// Retourne true si le coin est en hausse sur 24h
    ///
    /// Une variation inconnue compte comme une baisse (affichée en rouge).
    pub fn is_positive(&self) -> bool {
        self.price_change_percentage_24h
            .map(|c| c > 0.0)
            .unwrap_or(false)
    }
}

// ============================================================================
// Tests
// ============================================================================
