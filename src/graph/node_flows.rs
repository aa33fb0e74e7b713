use crate::graph::flow_graph::{FlowGraph, NodeIndex};
use serde::{Deserialize, Serialize};

/// Flow totals through a single node, as shown in the node tooltip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFlow {
    pub index: NodeIndex,
    pub name: String,
    /// Sum of values of links entering the node.
    pub incoming: f64,
    /// Sum of values of links leaving the node.
    pub outgoing: f64,
}

impl NodeFlow {
    /// Displayed node size: the larger of the two sides.
    pub fn value(&self) -> f64 {
        self.incoming.max(self.outgoing)
    }

    /// Incoming minus outgoing. Zero for the pool when every outflow was
    /// redistributed.
    pub fn imbalance(&self) -> f64 {
        self.incoming - self.outgoing
    }
}

/// Compute incoming/outgoing totals for every node, in node order.
pub fn node_flows(graph: &FlowGraph) -> Vec<NodeFlow> {
    let mut flows: Vec<NodeFlow> = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| NodeFlow {
            index,
            name: node.name.clone(),
            incoming: 0.0,
            outgoing: 0.0,
        })
        .collect();

    for link in graph.links() {
        if let Some(source) = flows.get_mut(link.source) {
            source.outgoing += link.value;
        }
        if let Some(target) = flows.get_mut(link.target) {
            target.incoming += link.value;
        }
    }
    flows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::row::FlowRow;
    use crate::rebalance::rebalancer::rebalance;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_pool_is_balanced_when_inflow_covers_outflow() {
        let rows = vec![
            FlowRow::new("Equity", "A", -10.0),
            FlowRow::new("Equity", "B", 50.0),
        ];
        let graph = rebalance(&rows).unwrap();
        let flows = node_flows(&graph);
        let pool = &flows[graph.pool_index().unwrap()];

        assert_abs_diff_eq!(pool.incoming, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pool.outgoing, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pool.imbalance(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_buying_node_value_is_full_inflow() {
        let rows = vec![
            FlowRow::new("Equity", "A", -10.0),
            FlowRow::new("Equity", "B", 50.0),
        ];
        let graph = rebalance(&rows).unwrap();
        let flows = node_flows(&graph);
        let b = &flows[graph.index_of("Equity: B").unwrap()];

        assert_eq!(b.outgoing, 0.0);
        assert_abs_diff_eq!(b.value(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_graph_has_zero_flows() {
        let graph = rebalance(&[]).unwrap();
        let flows = node_flows(&graph);
        assert_eq!(flows.len(), 2);
        assert!(flows.iter().all(|f| f.value() == 0.0));
    }
}
