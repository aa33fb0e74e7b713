pub mod label;
pub mod row;
