//! # flow-rebalancer
//!
//! Turns signed fund-flow rows into a pooled flow graph for Sankey-style
//! diagrams.
//!
//! Outflows ("selling" rows) are gathered into a reallocation pool and
//! redistributed proportionally across inflows ("buying" rows). Whatever
//! the pool cannot fund is attributed to net new capital.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: flow rows, labels, row sets
//! - **graph** — The flow graph, its links, and per-node flow totals
//! - **rebalance** — The rebalancing transform and category allocation
//! - **simulation** — Built-in market sample and random row generation

pub mod core;
pub mod graph;
pub mod rebalance;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::label::Label;
    pub use crate::core::row::{FlowRow, FlowRowSet};
    pub use crate::graph::flow_graph::{FlowGraph, Link, LinkKind, Node, NodeRole};
    pub use crate::rebalance::allocation::AllocationBreakdown;
    pub use crate::rebalance::rebalancer::{
        rebalance, FlowRebalancer, InvalidInput, RebalanceError, RebalanceSummary,
    };
}
