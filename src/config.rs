// ============================================================================
// Configuration
// ============================================================================
// Paramètres lus depuis les variables d'environnement (et un éventuel .env)
//
//   CRYPTODASH_API_URL   URL de base de l'API   (défaut: CoinGecko public v3)
//   CRYPTODASH_CURRENCY  devise de cotation     (défaut: inr)
//   CRYPTODASH_PER_PAGE  coins par page         (défaut: 10, max 250)
//   CRYPTODASH_LOG_DIR   répertoire des logs    (défaut: data_local_dir)
// ============================================================================

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_CURRENCY: &str = "inr";
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Limite imposée par /coins/markets
pub const MAX_PER_PAGE: u32 = 250;

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// URL de base, sans slash final
    pub api_base_url: String,

    /// Devise de cotation (paramètre vs_currency), en minuscules
    pub vs_currency: String,

    /// Nombre de coins par page du dashboard
    pub per_page: u32,

    /// Répertoire des fichiers de logs
    pub log_dir: PathBuf,
}

impl Config {
    /// Lit la configuration depuis l'environnement du processus
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construit la configuration à partir d'une fonction de lookup
    ///
    /// CONCEPT RUST : Closure générique
    /// - Permet de tester sans modifier les vraies variables d'environnement
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("CRYPTODASH_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            bail!("CRYPTODASH_API_URL must be an http(s) URL, got {:?}", api_base_url);
        }

        let vs_currency = lookup("CRYPTODASH_CURRENCY")
            .map(|cur| cur.trim().to_lowercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        if vs_currency.is_empty() || !vs_currency.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!("CRYPTODASH_CURRENCY must be a currency code like \"inr\", got {:?}", vs_currency);
        }

        let per_page = match lookup("CRYPTODASH_PER_PAGE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("CRYPTODASH_PER_PAGE is not a number: {:?}", raw))?,
            None => DEFAULT_PER_PAGE,
        };

        if per_page == 0 || per_page > MAX_PER_PAGE {
            bail!("CRYPTODASH_PER_PAGE must be between 1 and {}, got {}", MAX_PER_PAGE, per_page);
        }

        let log_dir = lookup("CRYPTODASH_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_log_dir);

        Ok(Self {
            api_base_url,
            vs_currency,
            per_page,
            log_dir,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            vs_currency: DEFAULT_CURRENCY.to_string(),
            per_page: DEFAULT_PER_PAGE,
            log_dir: default_log_dir(),
        }
    }
}

/// Répertoire de logs par défaut
///
/// - Linux : ~/.local/share/cryptodash/logs
/// - macOS : ~/Library/Application Support/cryptodash/logs
/// - Sinon : ./logs
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("cryptodash").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

// ============================================================================
// Tests
// ============================================================================
