pub mod allocation;
pub mod rebalancer;
