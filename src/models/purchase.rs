// ============================================================================
// Structure : Purchase
// ============================================================================
// Achat fictif saisi par l'utilisateur (coin + quantité)
//
// Les achats ne vivent qu'en mémoire : ils disparaissent à la fermeture.
// ============================================================================

use anyhow::{bail, Context, Result};

use crate::models::CoinMarket;

/// Un achat enregistré depuis le dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub coin_id: String,
    pub name: String,
    pub symbol: String,

    /// Quantité saisie
    pub amount: f64,

    /// Prix unitaire au moment de l'achat (None si le coin n'était pas coté)
    pub unit_price: Option<f64>,
}

impl Purchase {
    /// Crée un achat à partir de la ligne sélectionnée
    pub fn new(coin: &CoinMarket, amount: f64) -> Self {
        Self {
            coin_id: coin.id.clone(),
            name: coin.name.clone(),
            symbol: coin.symbol.clone(),
            amount,
            unit_price: coin.current_price,
        }
    }

    /// Valeur totale de l'achat au prix d'achat
    pub fn total_value(&self) -> Option<f64> {
        self.unit_price.map(|price| price * self.amount)
    }

    /// Ligne de la liste des achats : "Bitcoin - Amount: 0.5"
    pub fn display(&self) -> String {
        format!("{} - Amount: {}", self.name, self.amount)
    }
}

/// Parse la quantité saisie dans la modale d'achat
///
/// Accepte un nombre décimal strictement positif (ex: "0.25", "3").
pub fn parse_amount(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("Amount is empty");
    }

    let amount: f64 = trimmed
        .parse()
        .with_context(|| format!("Invalid amount: {}", trimmed))?;

    if !amount.is_finite() || amount <= 0.0 {
        bail!("Amount must be greater than zero");
    }

    Ok(amount)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_from_coin() {
        let mut coin = CoinMarket::new("bitcoin", "btc", "Bitcoin");
        coin.current_price = Some(1000.0);

        let purchase = Purchase::new(&coin, 0.5);
        assert_eq!(purchase.coin_id, "bitcoin");
        assert_eq!(purchase.total_value(), Some(500.0));
        assert_eq!(purchase.display(), "Bitcoin - Amount: 0.5");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("3").unwrap(), 3.0);
        assert_eq!(parse_amount(" 0.25 ").unwrap(), 0.25);

        assert!(parse_amount("").is_err());
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-2").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("inf").is_err());
    }
}
