//! Random flow row generation for property tests and benchmarks.

use crate::core::row::{FlowRow, FlowRowSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for generating a random row set.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of rows to generate. Labels are unique up to
    /// `categories.len() * subcategories_per_category`.
    pub row_count: usize,
    /// Asset classes to draw from.
    pub categories: Vec<String>,
    /// Sub-classes generated per category.
    pub subcategories_per_category: usize,
    /// Largest |amount| generated.
    pub max_magnitude: f64,
    /// Chance that a row carries a zero amount.
    pub zero_probability: f64,
    /// Seed for reproducible output. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            row_count: 24,
            categories: [
                "Equity",
                "Fixed Income",
                "Cash",
                "Private Markets",
                "Other / Specialized",
                "Multi-Asset",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            subcategories_per_category: 8,
            max_magnitude: 100.0,
            zero_probability: 0.05,
            seed: None,
        }
    }
}

/// Generate a random row set with unique labels.
///
/// At most `categories.len() * subcategories_per_category` rows are
/// produced, so labels never repeat. Amounts are rounded to two decimals.
pub fn generate_random_rows(config: &GeneratorConfig) -> FlowRowSet {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let capacity = config.categories.len() * config.subcategories_per_category;
    let count = config.row_count.min(capacity);

    let mut slots: Vec<usize> = (0..capacity).collect();
    let mut set = FlowRowSet::new();
    for _ in 0..count {
        let slot = slots.swap_remove(rng.gen_range(0..slots.len()));
        let category = &config.categories[slot / config.subcategories_per_category];
        let subcategory = format!("Segment {:02}", slot % config.subcategories_per_category);

        let amount = if rng.gen_bool(config.zero_probability.clamp(0.0, 1.0)) {
            0.0
        } else {
            let magnitude = rng.gen_range(0.01..=config.max_magnitude.max(0.01));
            let signed = if rng.gen_bool(0.5) { -magnitude } else { magnitude };
            (signed * 100.0).round() / 100.0
        };

        set.add(FlowRow::new(category.clone(), subcategory, amount));
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rebalance::rebalancer::{rebalance, RebalanceError};
    use std::collections::HashSet;

    #[test]
    fn test_random_rows_generation() {
        let config = GeneratorConfig {
            row_count: 30,
            seed: Some(7),
            ..Default::default()
        };
        let set = generate_random_rows(&config);
        assert_eq!(set.len(), 30);

        let labels: HashSet<String> = set.rows().iter().map(|r| r.label().to_string()).collect();
        assert_eq!(labels.len(), 30);
    }

    #[test]
    fn test_row_count_capped_by_label_space() {
        let config = GeneratorConfig {
            row_count: 1_000,
            categories: vec!["Equity".to_string()],
            subcategories_per_category: 4,
            ..Default::default()
        };
        assert_eq!(generate_random_rows(&config).len(), 4);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let config = GeneratorConfig {
            seed: Some(42),
            ..Default::default()
        };
        let a = generate_random_rows(&config);
        let b = generate_random_rows(&config);
        assert_eq!(a.rows(), b.rows());
    }

    #[test]
    fn test_random_rows_rebalance() {
        let config = GeneratorConfig {
            row_count: 40,
            seed: Some(3),
            ..Default::default()
        };
        let set = generate_random_rows(&config);
        match rebalance(set.rows()) {
            Ok(graph) => assert!(graph.validate().is_ok()),
            // Every generated row may have come out negative or zero.
            Err(err) => assert!(matches!(err, RebalanceError::InvalidInput(_))),
        }
    }
}
