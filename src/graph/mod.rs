pub mod flow_graph;
pub mod node_flows;
