//! Built-in market flows dataset.
//!
//! Net flows by asset sub-class, as fed to the dashboard's Sankey view.

use crate::core::row::{FlowRow, FlowRowSet};

const MARKET_FLOWS: &[(&str, &str, f64)] = &[
    ("Equity", "US Equity Small Cap", -84.11),
    ("Equity", "US Equity Large Cap", -63.40),
    ("Equity", "Global Equity", 10.68),
    ("Equity", "Emerging Markets", 34.48),
    ("Equity", "Mid Cap Growth", 16.68),
    ("Fixed Income", "Core Investment Grade", 50.33),
    ("Fixed Income", "Municipal Bond", -43.90),
    ("Fixed Income", "Global Bonds", 34.73),
    ("Fixed Income", "Short Duration", -64.56),
    ("Fixed Income", "High Yield Bonds", 20.00),
    ("Fixed Income", "Government/Sovereign", 17.00),
    ("Fixed Income", "Credit Long Duration", 12.00),
    ("Cash", "Money Market Funds", 0.0),
    ("Cash", "Treasury Bills", 0.64),
    ("Cash", "Bank Deposits / CDs", 0.0),
    ("Cash", "Foreign Currency / FFX", 0.58),
    ("Private Markets", "Private Credit", -5.20),
    ("Private Markets", "Venture Capital", 15.60),
    ("Private Markets", "Co-Investment", 3.90),
    ("Private Markets", "Private Equity", 75.73),
    ("Other / Specialized", "Overlay Strategies", 3.82),
    ("Other / Specialized", "Factor Based Investing", 2.60),
    ("Multi-Asset", "Diversified Growth Funds", 1.64),
    ("Multi-Asset", "Target Date Funds", 2.67),
];

/// The dashboard's sample of net flows across six asset classes.
pub fn market_flows_sample() -> FlowRowSet {
    MARKET_FLOWS
        .iter()
        .map(|&(category, subcategory, amount)| FlowRow::new(category, subcategory, amount))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rebalance::rebalancer::FlowRebalancer;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sample_shape() {
        let set = market_flows_sample();
        assert_eq!(set.len(), 24);
        assert_eq!(set.selling().count(), 5);
        assert_eq!(set.buying().count(), 17);
        assert_eq!(set.categories().len(), 6);
    }

    #[test]
    fn test_sample_rebalances() {
        let set = market_flows_sample();
        let graph = FlowRebalancer::rebalance(&set).unwrap();

        // 5 selling + pool + new capital + 17 buying
        assert_eq!(graph.node_count(), 24);
        assert!(graph.validate().is_ok());
        assert_abs_diff_eq!(set.total_outflow(), 261.17, epsilon = 1e-9);
    }
}
