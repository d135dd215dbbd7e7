// ============================================================================
// Structure : CoinDetail
// ============================================================================
// Fiche détaillée d'une crypto (/coins/{id}) : description, liens, rang
//
// La réponse CoinGecko contient des dizaines de champs ; serde ignore tous
// ceux qui ne sont pas déclarés ici.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Fiche détaillée d'une crypto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,

    /// Rang par capitalisation (null pour les coins non classés)
    pub market_cap_rank: Option<u32>,

    #[serde(default)]
    pub description: Description,

    #[serde(default)]
    pub links: Links,
}

/// Descriptions localisées ; seule la version anglaise est utilisée
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub en: Option<String>,
}

/// Liens externes du projet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    /// CoinGecko remplit ce tableau avec des chaînes vides quand il manque des URLs
    #[serde(default)]
    pub homepage: Vec<String>,
}

impl CoinDetail {
    /// Titre affiché : "Bitcoin (BTC)"
    pub fn title(&self) -> String {
        format!("{} ({})", self.name, self.symbol.to_uppercase())
    }

    /// Première page d'accueil non vide
    pub fn homepage(&self) -> Option<&str> {
        self.links
            .homepage
            .iter()
            .map(|url| url.trim())
            .find(|url| !url.is_empty())
    }

    /// Description anglaise sans balises HTML
    pub fn description_text(&self) -> String {
        self.description
            .en
            .as_deref()
            .map(strip_html)
            .unwrap_or_default()
    }
}

/// Supprime les balises HTML (CoinGecko inclut des <a href="...">)
///
/// Les entités courantes (&amp; etc.) sont décodées ; les retours à la
/// ligne "\r\n" sont normalisés.
pub fn strip_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("\r\n", "\n")
        .trim()
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BITCOIN_JSON: &str = r#"{
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "market_cap_rank": 1,
        "description": {
            "en": "Bitcoin is the first <a href=\"https://www.coingecko.com/en?hashing_algorithm=SHA-256\">SHA-256</a> cryptocurrency.\r\nIt was created in 2009.",
            "de": "Bitcoin ist..."
        },
        "links": {
            "homepage": ["", "http://www.bitcoin.org", ""],
            "blockchain_site": ["https://mempool.space/"]
        },
        "market_data": { "current_price": { "inr": 5623411.5 } }
    }"#;

    #[test]
    fn test_deserialize_detail() {
        let detail: CoinDetail = serde_json::from_str(BITCOIN_JSON).unwrap();
        assert_eq!(detail.title(), "Bitcoin (BTC)");
        assert_eq!(detail.market_cap_rank, Some(1));
        assert_eq!(detail.homepage(), Some("http://www.bitcoin.org"));
    }

    #[test]
    fn test_description_is_stripped() {
        let detail: CoinDetail = serde_json::from_str(BITCOIN_JSON).unwrap();
        assert_eq!(
            detail.description_text(),
            "Bitcoin is the first SHA-256 cryptocurrency.\nIt was created in 2009."
        );
    }

    #[test]
    fn test_missing_description_and_links() {
        let json = r#"{ "id": "x", "symbol": "x", "name": "X", "market_cap_rank": null }"#;
        let detail: CoinDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.description_text(), "");
        assert!(detail.homepage().is_none());
    }

    #[test]
    fn test_strip_html_entities() {
        assert_eq!(strip_html("<b>A &amp; B</b>"), "A & B");
        assert_eq!(strip_html("<p>  padded  </p>"), "padded");
    }
}
