use crate::core::label::{Label, NEW_CAPITAL_NAME, POOL_NAME};
use crate::core::row::{FlowDirection, FlowRow, FlowRowSet};
use crate::graph::flow_graph::{FlowGraph, Link, LinkKind, Node, NodeIndex, NodeRole};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Input the rebalancer cannot turn into a finite graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidInput {
    #[error("total inflow is zero, so {total_outflow} of outflow has nowhere to go")]
    NoInflow { total_outflow: f64 },
    #[error("amount for {label} is not finite: {amount}")]
    NonFiniteAmount { label: Label, amount: f64 },
    #[error("total {side} is not finite")]
    NonFiniteTotal { side: &'static str },
    #[error("rebalance factor overflows ({total_outflow} / {total_inflow})")]
    FactorOverflow { total_outflow: f64, total_inflow: f64 },
    #[error("flow into {label} overflows")]
    FlowOverflow { label: Label },
}

/// Errors returned by [`FlowRebalancer::rebalance`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RebalanceError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("duplicate flow label: {0}")]
    DuplicateLabel(Label),
}

/// Aggregates that drive the split between pool and new capital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceSummary {
    /// Sum of |amount| over selling rows.
    pub total_outflow: f64,
    /// Sum of amount over buying rows.
    pub total_inflow: f64,
    /// `total_outflow / total_inflow`. Zero when there are no rows to move.
    pub rebalance_factor: f64,
    pub selling_rows: usize,
    pub buying_rows: usize,
    /// Rows with a zero amount, left out of the graph.
    pub dropped_rows: usize,
}

impl RebalanceSummary {
    /// Inflow funded by the pool.
    pub fn reallocated(&self) -> f64 {
        self.total_inflow * self.rebalance_factor
    }

    /// Inflow the pool cannot cover. Zero when outflows overfund inflows.
    pub fn new_capital(&self) -> f64 {
        (self.total_inflow - self.reallocated()).max(0.0)
    }

    /// True when outflows exceed inflows and every new-capital link is
    /// suppressed.
    pub fn is_overfunded(&self) -> bool {
        self.rebalance_factor > 1.0
    }
}

impl fmt::Display for RebalanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Rebalance Summary ===")?;
        writeln!(f, "Total Outflow:    {:.2}", self.total_outflow)?;
        writeln!(f, "Total Inflow:     {:.2}", self.total_inflow)?;
        writeln!(f, "Rebalance Factor: {:.4}", self.rebalance_factor)?;
        writeln!(f, "Reallocated:      {:.2}", self.reallocated())?;
        writeln!(f, "New Capital:      {:.2}", self.new_capital())?;
        writeln!(
            f,
            "Rows:             {} selling, {} buying, {} dropped",
            self.selling_rows, self.buying_rows, self.dropped_rows
        )
    }
}

/// Pools outflows and redistributes them across inflows.
///
/// The transform is pure: the same rows always produce the same graph or
/// the same error.
pub struct FlowRebalancer;

impl FlowRebalancer {
    /// Rebalance a row set. See [`rebalance`].
    pub fn rebalance(rows: &FlowRowSet) -> Result<FlowGraph, RebalanceError> {
        rebalance(rows.rows())
    }

    /// Compute totals and the rebalance factor without building the graph.
    ///
    /// Fails with the same [`InvalidInput`] errors as [`rebalance`].
    pub fn summarize(rows: &[FlowRow]) -> Result<RebalanceSummary, RebalanceError> {
        for row in rows {
            if !row.amount().is_finite() {
                return Err(InvalidInput::NonFiniteAmount {
                    label: row.label(),
                    amount: row.amount(),
                }
                .into());
            }
        }

        let mut summary = RebalanceSummary {
            total_outflow: 0.0,
            total_inflow: 0.0,
            rebalance_factor: 0.0,
            selling_rows: 0,
            buying_rows: 0,
            dropped_rows: 0,
        };
        for row in rows {
            match row.direction() {
                FlowDirection::Selling => {
                    summary.selling_rows += 1;
                    summary.total_outflow += row.amount().abs();
                }
                FlowDirection::Buying => {
                    summary.buying_rows += 1;
                    summary.total_inflow += row.amount();
                }
                FlowDirection::Flat => summary.dropped_rows += 1,
            }
        }

        if !summary.total_outflow.is_finite() {
            return Err(InvalidInput::NonFiniteTotal { side: "outflow" }.into());
        }
        if !summary.total_inflow.is_finite() {
            return Err(InvalidInput::NonFiniteTotal { side: "inflow" }.into());
        }

        if summary.total_inflow > 0.0 {
            summary.rebalance_factor = summary.total_outflow / summary.total_inflow;
            if !summary.rebalance_factor.is_finite() {
                return Err(InvalidInput::FactorOverflow {
                    total_outflow: summary.total_outflow,
                    total_inflow: summary.total_inflow,
                }
                .into());
            }
        } else if summary.selling_rows > 0 {
            return Err(InvalidInput::NoInflow {
                total_outflow: summary.total_outflow,
            }
            .into());
        }

        Ok(summary)
    }
}

/// Build the pooled flow graph for `rows`.
///
/// # Algorithm
///
/// 1. Split rows into selling (< 0) and buying (> 0). Zero rows are dropped.
/// 2. `factor = Σ|selling| / Σ buying`.
/// 3. Nodes: selling labels, pool, new capital, buying labels.
/// 4. Each selling row flows `|amount|` into the pool.
/// 5. Each buying row receives `amount × factor` from the pool (always
///    emitted) and the remainder from new capital (only when positive).
///
/// # Errors
///
/// [`RebalanceError::InvalidInput`] when outflow exists but inflow is zero,
/// or when an amount or derived flow is not finite.
/// [`RebalanceError::DuplicateLabel`] when two non-zero rows share a label.
///
/// An empty (or all-zero) input is valid and yields just the two synthetic
/// nodes.
pub fn rebalance(rows: &[FlowRow]) -> Result<FlowGraph, RebalanceError> {
    let summary = FlowRebalancer::summarize(rows)?;
    let factor = summary.rebalance_factor;

    debug!(
        "rebalancing {} selling / {} buying rows: outflow={} inflow={} factor={}",
        summary.selling_rows,
        summary.buying_rows,
        summary.total_outflow,
        summary.total_inflow,
        factor
    );
    if summary.dropped_rows > 0 {
        debug!("dropping {} zero-amount rows", summary.dropped_rows);
    }
    if summary.is_overfunded() {
        warn!(
            "outflows exceed inflows (factor {:.4}); no new capital links will be drawn",
            factor
        );
    }

    let selling: Vec<&FlowRow> = rows
        .iter()
        .filter(|r| r.direction() == FlowDirection::Selling)
        .collect();
    let buying: Vec<&FlowRow> = rows
        .iter()
        .filter(|r| r.direction() == FlowDirection::Buying)
        .collect();

    let mut seen: HashSet<String> = HashSet::with_capacity(selling.len() + buying.len());
    let mut nodes = Vec::with_capacity(selling.len() + buying.len() + 2);
    for row in &selling {
        nodes.push(row_node(row, NodeRole::Selling, &mut seen)?);
    }
    let pool: NodeIndex = nodes.len();
    nodes.push(synthetic_node(POOL_NAME, NodeRole::Pool));
    let new_capital: NodeIndex = nodes.len();
    nodes.push(synthetic_node(NEW_CAPITAL_NAME, NodeRole::NewCapital));
    let first_buying = nodes.len();
    for row in &buying {
        nodes.push(row_node(row, NodeRole::Buying, &mut seen)?);
    }

    let mut links = Vec::with_capacity(selling.len() + 2 * buying.len());
    for (index, row) in selling.iter().enumerate() {
        push_link(&mut links, index, pool, row.amount().abs(), LinkKind::Selling);
    }
    for (offset, row) in buying.iter().enumerate() {
        let target = first_buying + offset;
        let rebal_flow = row.amount() * factor;
        let new_cap_flow = row.amount() - rebal_flow;
        if !rebal_flow.is_finite() || !new_cap_flow.is_finite() {
            return Err(InvalidInput::FlowOverflow { label: row.label() }.into());
        }

        push_link(&mut links, pool, target, rebal_flow, LinkKind::Rebalance);
        if new_cap_flow > 0.0 {
            push_link(&mut links, new_capital, target, new_cap_flow, LinkKind::NewCapital);
        }
    }

    debug!("built flow graph: {} nodes, {} links", nodes.len(), links.len());
    Ok(FlowGraph::new(nodes, links))
}

fn row_node(
    row: &FlowRow,
    role: NodeRole,
    seen: &mut HashSet<String>,
) -> Result<Node, RebalanceError> {
    let label = row.label();
    let name = label.to_string();
    if !seen.insert(name.clone()) {
        return Err(RebalanceError::DuplicateLabel(label));
    }
    Ok(Node {
        name,
        role,
        category: Some(row.category().to_string()),
    })
}

fn synthetic_node(name: &str, role: NodeRole) -> Node {
    Node {
        name: name.to_string(),
        role,
        category: None,
    }
}

fn push_link(links: &mut Vec<Link>, source: NodeIndex, target: NodeIndex, value: f64, kind: LinkKind) {
    trace!("link {} -> {}: {} ({})", source, target, value, kind);
    links.push(Link {
        source,
        target,
        value,
        kind,
    });
}
