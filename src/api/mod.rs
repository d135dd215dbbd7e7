// ============================================================================
// Module : api
// ============================================================================
// Client de l'API publique CoinGecko (classement, fiches, historiques)
// ============================================================================

pub mod coingecko;

pub use coingecko::CoinGeckoClient;
