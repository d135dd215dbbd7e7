// ============================================================================
// Structures : ChartPeriod, PricePoint, PriceHistory
// ============================================================================
// Historique de prix d'une crypto (/coins/{id}/market_chart)
//
// CONCEPTS RUST :
// 1. Enum Copy pour la période : pas d'allocation, comparaison avec ==
// 2. DateTime<Utc> : chaque point garde son horodatage
// 3. fold() : min/max en un seul passage
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Période affichée par le graphique
///
/// Cycle : 7 jours → 30 jours → 90 jours → 7 jours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartPeriod {
    #[default]
    SevenDays,
    ThirtyDays,
    NinetyDays,
}

impl ChartPeriod {
    /// Toutes les périodes, dans l'ordre du sélecteur
    pub const ALL: [ChartPeriod; 3] = [
        ChartPeriod::SevenDays,
        ChartPeriod::ThirtyDays,
        ChartPeriod::NinetyDays,
    ];

    /// Nombre de jours (paramètre "days" de l'API)
    pub fn days(&self) -> u32 {
        match self {
            ChartPeriod::SevenDays => 7,
            ChartPeriod::ThirtyDays => 30,
            ChartPeriod::NinetyDays => 90,
        }
    }

    /// Label du sélecteur
    pub fn label(&self) -> &'static str {
        match self {
            ChartPeriod::SevenDays => "7 Days",
            ChartPeriod::ThirtyDays => "30 Days",
            ChartPeriod::NinetyDays => "90 Days",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ChartPeriod::SevenDays => ChartPeriod::ThirtyDays,
            ChartPeriod::ThirtyDays => ChartPeriod::NinetyDays,
            ChartPeriod::NinetyDays => ChartPeriod::SevenDays,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            ChartPeriod::SevenDays => ChartPeriod::NinetyDays,
            ChartPeriod::ThirtyDays => ChartPeriod::SevenDays,
            ChartPeriod::NinetyDays => ChartPeriod::ThirtyDays,
        }
    }
}

/// Un point du graphique : (date, prix)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(time: DateTime<Utc>, price: f64) -> Self {
        Self { time, price }
    }
}

/// Série de prix pour un coin et une période
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    /// Coin auquel appartient la série (sert à écarter les réponses périmées)
    pub coin_id: String,

    /// Période demandée
    pub period: ChartPeriod,

    /// Points triés par date croissante (ordre de l'API)
    pub points: Vec<PricePoint>,
}

impl PriceHistory {
    pub fn new(coin_id: String, period: ChartPeriod) -> Self {
        Self {
            coin_id,
            period,
            points: Vec::new(),
        }
    }

    pub fn add_point(&mut self, point: PricePoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Prix minimum et maximum de la série
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }

        Some(self.points.iter().fold(
            (f64::MAX, f64::MIN),
            |(min, max), point| (min.min(point.price), max.max(point.price)),
        ))
    }

    /// Variation entre le premier et le dernier point, en pourcentage
    pub fn change_percent(&self) -> Option<f64> {
        let first = self.first()?.price;
        let last = self.last()?.price;

        if first == 0.0 {
            return None;
        }

        Some((last - first) / first * 100.0)
    }

    /// Points (x, y) pour le widget Chart : x = timestamp Unix en secondes
    pub fn chart_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|point| (point.time.timestamp() as f64, point.price))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_history() -> PriceHistory {
        let mut history = PriceHistory::new("bitcoin".to_string(), ChartPeriod::SevenDays);
        for (day, price) in [(1, 100.0), (2, 80.0), (3, 120.0), (4, 110.0)] {
            let time = Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap();
            history.add_point(PricePoint::new(time, price));
        }
        history
    }

    #[test]
    fn test_period_cycle() {
        let period = ChartPeriod::default();
        assert_eq!(period, ChartPeriod::SevenDays);
        assert_eq!(period.next().days(), 30);
        assert_eq!(period.next().next().days(), 90);
        assert_eq!(period.next().next().next(), ChartPeriod::SevenDays);
        assert_eq!(period.previous(), ChartPeriod::NinetyDays);
    }

    #[test]
    fn test_price_bounds() {
        let history = sample_history();
        assert_eq!(history.price_bounds(), Some((80.0, 120.0)));

        let empty = PriceHistory::new("x".to_string(), ChartPeriod::ThirtyDays);
        assert!(empty.price_bounds().is_none());
    }

    #[test]
    fn test_change_percent() {
        let history = sample_history();
        let change = history.change_percent().unwrap();
        assert!((change - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_chart_points_use_seconds() {
        let history = sample_history();
        let points = history.chart_points();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], (1_709_251_200.0, 100.0));
        assert!(points[1].0 - points[0].0 == 86_400.0);
    }
}
