use crate::graph::flow_graph::{FlowGraph, LinkKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How one asset class took part in the rebalancing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    /// Capital the category's sub-classes sent into the pool.
    pub sold: f64,
    /// Capital received from the pool.
    pub from_pool: f64,
    /// Capital received from net new capital.
    pub from_new_capital: f64,
}

impl CategoryAllocation {
    pub fn bought(&self) -> f64 {
        self.from_pool + self.from_new_capital
    }

    /// Positive for net buyers, negative for net sellers.
    pub fn net(&self) -> f64 {
        self.bought() - self.sold
    }
}

/// Per-category view of a rebalanced flow graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocationBreakdown {
    /// Category -> allocation, sorted by category name.
    pub categories: BTreeMap<String, CategoryAllocation>,
}

impl AllocationBreakdown {
    /// Attribute every link to the category of its row-side endpoint.
    pub fn from_graph(graph: &FlowGraph) -> Self {
        let mut categories: BTreeMap<String, CategoryAllocation> = BTreeMap::new();

        for link in graph.links() {
            let row_end = match link.kind {
                LinkKind::Selling => link.source,
                LinkKind::Rebalance | LinkKind::NewCapital => link.target,
            };
            let Some(category) = graph.node(row_end).and_then(|n| n.category.as_ref()) else {
                continue;
            };
            let entry = categories.entry(category.clone()).or_default();
            match link.kind {
                LinkKind::Selling => entry.sold += link.value,
                LinkKind::Rebalance => entry.from_pool += link.value,
                LinkKind::NewCapital => entry.from_new_capital += link.value,
            }
        }

        AllocationBreakdown { categories }
    }

    pub fn get(&self, category: &str) -> Option<&CategoryAllocation> {
        self.categories.get(category)
    }

    /// Categories that sent more into the pool than they received.
    pub fn net_sellers(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, a)| a.net() < 0.0)
            .map(|(c, _)| c.as_str())
            .collect()
    }
}

impl std::fmt::Display for AllocationBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Category Allocation ===")?;
        for (category, a) in &self.categories {
            writeln!(f, "\n--- {} ---", category)?;
            writeln!(f, "  Sold:        {:.2}", a.sold)?;
            writeln!(f, "  From Pool:   {:.2}", a.from_pool)?;
            writeln!(f, "  New Capital: {:.2}", a.from_new_capital)?;
            writeln!(f, "  Net:         {:+.2}", a.net())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::row::FlowRow;
    use crate::rebalance::rebalancer::rebalance;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_allocation_by_category() {
        let rows = vec![
            FlowRow::new("Equity", "A", -10.0),
            FlowRow::new("Equity", "B", 30.0),
            FlowRow::new("Fixed Income", "C", 20.0),
        ];
        let graph = rebalance(&rows).unwrap();
        let breakdown = AllocationBreakdown::from_graph(&graph);

        let equity = breakdown.get("Equity").unwrap();
        assert_abs_diff_eq!(equity.sold, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(equity.from_pool, 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(equity.from_new_capital, 24.0, epsilon = 1e-9);
        assert_abs_diff_eq!(equity.net(), 20.0, epsilon = 1e-9);

        let fixed_income = breakdown.get("Fixed Income").unwrap();
        assert_abs_diff_eq!(fixed_income.sold, 0.0);
        assert_abs_diff_eq!(fixed_income.bought(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_net_sellers() {
        let rows = vec![
            FlowRow::new("Equity", "A", -50.0),
            FlowRow::new("Cash", "Treasury Bills", 10.0),
        ];
        let graph = rebalance(&rows).unwrap();
        let breakdown = AllocationBreakdown::from_graph(&graph);
        assert_eq!(breakdown.net_sellers(), vec!["Equity"]);
    }

    #[test]
    fn test_empty_graph_has_no_categories() {
        let graph = rebalance(&[]).unwrap();
        assert!(AllocationBreakdown::from_graph(&graph).categories.is_empty());
    }
}
