// ============================================================================
// Formatage des montants
// ============================================================================

/// Symbole de la devise de cotation ("inr" → "₹")
///
/// Les devises sans symbole connu sont préfixées par leur code.
pub fn currency_symbol(vs_currency: &str) -> String {
    match vs_currency.to_lowercase().as_str() {
        "inr" => "₹".to_string(),
        "usd" => "$".to_string(),
        "eur" => "€".to_string(),
        "gbp" => "£".to_string(),
        "jpy" => "¥".to_string(),
        "btc" => "₿".to_string(),
        other => format!("{} ", other.to_uppercase()),
    }
}

/// Prix avec deux décimales : "₹5623411.50"
pub fn format_price(value: Option<f64>, vs_currency: &str) -> String {
    match value {
        Some(price) => format!("{}{:.2}", currency_symbol(vs_currency), price),
        None => "N/A".to_string(),
    }
}

/// Capitalisation avec séparateurs de milliers : "₹110,734,567,890,123"
pub fn format_market_cap(value: Option<f64>, vs_currency: &str) -> String {
    match value {
        Some(cap) => format!("{}{}", currency_symbol(vs_currency), format_thousands(cap)),
        None => "N/A".to_string(),
    }
}

/// Variation en pourcentage avec flèche : "▲ +2.11%"
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(c) => {
            let arrow = if c > 0.0 { "▲" } else { "▼" };
            format!("{} {:+.2}%", arrow, c)
        }
        None => String::new(),
    }
}

/// Arrondit à l'entier et insère une virgule tous les trois chiffres
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
