use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Position of a node in [`FlowGraph::nodes`]. Link endpoints are these.
pub type NodeIndex = usize;

/// What a node stands for in the pooled flow diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// A sub-class with net outflow. Feeds the pool.
    Selling,
    /// The reallocation pool.
    Pool,
    /// The net new capital source.
    NewCapital,
    /// A sub-class with net inflow. Fed by the pool and new capital.
    Buying,
}

/// A node of the flow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Display string handed to the renderer.
    pub name: String,
    pub role: NodeRole,
    /// Asset class of row nodes. `None` for the two synthetic nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// The three kinds of flow drawn in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Selling node -> pool.
    Selling,
    /// Pool -> buying node.
    Rebalance,
    /// New capital -> buying node.
    NewCapital,
}

impl LinkKind {
    /// Stroke color the diagram paints this kind of link with.
    pub fn color(&self) -> &'static str {
        match self {
            LinkKind::Selling => "#6EE7B7",
            LinkKind::Rebalance => "#FCA5A5",
            LinkKind::NewCapital => "rgba(0,100,200,0.7)",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkKind::Selling => "selling",
            LinkKind::Rebalance => "rebalance",
            LinkKind::NewCapital => "new capital",
        };
        f.write_str(name)
    }
}

/// A weighted, directed flow between two nodes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Link {
    pub source: NodeIndex,
    pub target: NodeIndex,
    /// Flow magnitude. Never negative.
    pub value: f64,
    pub kind: LinkKind,
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr {
            source: NodeIndex,
            target: NodeIndex,
            value: f64,
            kind: LinkKind,
            color: &'static str,
        }
        Repr {
            source: self.source,
            target: self.target,
            value: self.value,
            kind: self.kind,
            color: self.kind.color(),
        }
        .serialize(serializer)
    }
}

/// Ways a graph can break the contract its renderer relies on.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("link {link} points at node {endpoint}, but the graph has {node_count} nodes")]
    EndpointOutOfBounds {
        link: usize,
        endpoint: NodeIndex,
        node_count: usize,
    },
    #[error("link {link} has invalid value {value}")]
    InvalidValue { link: usize, value: f64 },
    #[error("flow graph contains a cycle")]
    Cyclic,
}

/// Nodes and links of a pooled flow diagram.
///
/// Node order is part of the contract: selling nodes first, then the pool,
/// then new capital, then buying nodes. Links refer to nodes by position.
///
/// Serializes to the `{ nodes: [{ name }], links: [{ source, target, value }] }`
/// shape d3-sankey style layout engines consume.
///
/// # Examples
///
/// ```
/// use flow_rebalancer::prelude::*;
///
/// let rows = vec![
///     FlowRow::new("Equity", "A", -10.0),
///     FlowRow::new("Equity", "B", 50.0),
/// ];
/// let graph = rebalance(&rows).unwrap();
///
/// assert_eq!(graph.node_count(), 4);
/// assert!(graph.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl FlowGraph {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self { nodes, links }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Index of the first node with the given role.
    pub fn position(&self, role: NodeRole) -> Option<NodeIndex> {
        self.nodes.iter().position(|n| n.role == role)
    }

    /// Index of the node with the given display name.
    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.nodes.iter().position(|n| n.name == name)
    }

    pub fn pool_index(&self) -> Option<NodeIndex> {
        self.position(NodeRole::Pool)
    }

    pub fn new_capital_index(&self) -> Option<NodeIndex> {
        self.position(NodeRole::NewCapital)
    }

    /// Links of one kind, in emission order.
    pub fn links_of_kind(&self, kind: LinkKind) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.kind == kind)
    }

    /// Sum of link values of one kind.
    pub fn total_value(&self, kind: LinkKind) -> f64 {
        self.links_of_kind(kind).map(|l| l.value).sum()
    }

    /// Links leaving a node.
    pub fn outgoing(&self, index: NodeIndex) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.source == index)
    }

    /// Links entering a node.
    pub fn incoming(&self, index: NodeIndex) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.target == index)
    }

    /// The link between two nodes, if one was emitted.
    pub fn link_between(&self, source: NodeIndex, target: NodeIndex) -> Option<&Link> {
        self.links
            .iter()
            .find(|l| l.source == source && l.target == target)
    }

    /// Build a petgraph view of this graph. Node indices are preserved.
    pub fn to_digraph(&self) -> DiGraph<&Node, f64> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.links.len());
        let indices: Vec<_> = self.nodes.iter().map(|n| graph.add_node(n)).collect();
        for link in &self.links {
            if let (Some(&a), Some(&b)) = (indices.get(link.source), indices.get(link.target)) {
                graph.add_edge(a, b, link.value);
            }
        }
        graph
    }

    /// Check the renderer contract: endpoints in bounds, values finite and
    /// non-negative, no cycles.
    pub fn validate(&self) -> Result<(), GraphError> {
        let node_count = self.nodes.len();
        for (i, link) in self.links.iter().enumerate() {
            for endpoint in [link.source, link.target] {
                if endpoint >= node_count {
                    return Err(GraphError::EndpointOutOfBounds {
                        link: i,
                        endpoint,
                        node_count,
                    });
                }
            }
            if !link.value.is_finite() || link.value < 0.0 {
                return Err(GraphError::InvalidValue {
                    link: i,
                    value: link.value,
                });
            }
        }
        if is_cyclic_directed(&self.to_digraph()) {
            return Err(GraphError::Cyclic);
        }
        Ok(())
    }
}

impl fmt::Display for FlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Flow Graph ===")?;
        writeln!(f, "Nodes: {}", self.nodes.len())?;
        for (i, node) in self.nodes.iter().enumerate() {
            writeln!(f, "  [{:>2}] {}", i, node.name)?;
        }
        writeln!(f, "\nLinks: {}", self.links.len())?;
        for link in &self.links {
            let source = self.nodes.get(link.source).map_or("?", |n| n.name.as_str());
            let target = self.nodes.get(link.target).map_or("?", |n| n.name.as_str());
            writeln!(
                f,
                "  {} → {}  {} ({})",
                source,
                target,
                format_flow_value(link.value),
                link.kind
            )?;
        }
        Ok(())
    }
}

/// Format a flow value for a diagram label: two decimals from 0.1 up,
/// three below so small flows stay visible.
pub fn format_flow_value(value: f64) -> String {
    if value >= 0.1 {
        format!("{:.2}", value)
    } else {
        format!("{:.3}", value)
    }
}
