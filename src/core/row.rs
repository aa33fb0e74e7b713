use crate::core::label::Label;
use serde::{Deserialize, Serialize};

/// Which way capital moves through a row's subcategory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    /// Negative amount: capital leaving the subcategory.
    Selling,
    /// Positive amount: capital entering the subcategory.
    Buying,
    /// Zero amount: contributes nothing to the graph.
    Flat,
}

/// A signed net flow for one asset sub-class.
///
/// This is the atomic input of the rebalancer. A negative `amount` is a net
/// outflow, a positive one a net inflow, and zero means no flow at all.
///
/// Rows deserialize from either an object or a `[category, subcategory,
/// amount]` triple, so hand-written data files can use the compact form.
///
/// # Examples
///
/// ```
/// use flow_rebalancer::core::row::{FlowDirection, FlowRow};
///
/// let row = FlowRow::new("Equity", "US Equity Small Cap", -84.11);
///
/// assert_eq!(row.direction(), FlowDirection::Selling);
/// assert_eq!(row.label().to_string(), "Equity: US Equity Small Cap");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RowRepr")]
pub struct FlowRow {
    category: String,
    subcategory: String,
    amount: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RowRepr {
    Object {
        category: String,
        subcategory: String,
        amount: f64,
    },
    Triple(String, String, f64),
}

impl From<RowRepr> for FlowRow {
    fn from(repr: RowRepr) -> Self {
        match repr {
            RowRepr::Object {
                category,
                subcategory,
                amount,
            }
            | RowRepr::Triple(category, subcategory, amount) => {
                FlowRow::new(category, subcategory, amount)
            }
        }
    }
}

impl FlowRow {
    pub fn new(category: impl Into<String>, subcategory: impl Into<String>, amount: f64) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
            amount,
        }
    }

    // --- Accessors ---

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subcategory(&self) -> &str {
        &self.subcategory
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// The node label this row maps to.
    pub fn label(&self) -> Label {
        Label::new(self.category.clone(), self.subcategory.clone())
    }

    /// Classify by sign. NaN and both zeros count as flat.
    pub fn direction(&self) -> FlowDirection {
        if self.amount < 0.0 {
            FlowDirection::Selling
        } else if self.amount > 0.0 {
            FlowDirection::Buying
        } else {
            FlowDirection::Flat
        }
    }
}

/// An ordered collection of flow rows submitted to the rebalancer.
///
/// Order matters: node indices in the resulting graph follow the order in
/// which selling and buying rows appear here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowRowSet {
    rows: Vec<FlowRow>,
}

impl FlowRowSet {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add(&mut self, row: FlowRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[FlowRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with a negative amount, in input order.
    pub fn selling(&self) -> impl Iterator<Item = &FlowRow> {
        self.with_direction(FlowDirection::Selling)
    }

    /// Rows with a positive amount, in input order.
    pub fn buying(&self) -> impl Iterator<Item = &FlowRow> {
        self.with_direction(FlowDirection::Buying)
    }

    /// Sum of |amount| over selling rows.
    pub fn total_outflow(&self) -> f64 {
        self.selling().map(|r| r.amount().abs()).sum()
    }

    /// Sum of amount over buying rows.
    pub fn total_inflow(&self) -> f64 {
        self.buying().map(|r| r.amount()).sum()
    }

    /// All unique categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> =
            self.rows.iter().map(|r| r.category().to_string()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    fn with_direction(&self, direction: FlowDirection) -> impl Iterator<Item = &FlowRow> {
        self.rows.iter().filter(move |r| r.direction() == direction)
    }
}

impl FromIterator<FlowRow> for FlowRowSet {
    fn from_iter<T: IntoIterator<Item = FlowRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<FlowRow>> for FlowRowSet {
    fn from(rows: Vec<FlowRow>) -> Self {
        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> FlowRowSet {
        vec![
            FlowRow::new("Equity", "A", -80.0),
            FlowRow::new("Cash", "Money Market Funds", 0.0),
            FlowRow::new("Equity", "B", 20.0),
            FlowRow::new("Bond", "C", 60.0),
        ]
        .into()
    }

    #[test]
    fn test_row_direction() {
        assert_eq!(FlowRow::new("E", "A", -1.0).direction(), FlowDirection::Selling);
        assert_eq!(FlowRow::new("E", "A", 1.0).direction(), FlowDirection::Buying);
        assert_eq!(FlowRow::new("E", "A", 0.0).direction(), FlowDirection::Flat);
        assert_eq!(FlowRow::new("E", "A", -0.0).direction(), FlowDirection::Flat);
    }

    #[test]
    fn test_row_set_partition_keeps_order() {
        let set = sample_set();
        let selling: Vec<_> = set.selling().map(|r| r.subcategory()).collect();
        let buying: Vec<_> = set.buying().map(|r| r.subcategory()).collect();
        assert_eq!(selling, vec!["A"]);
        assert_eq!(buying, vec!["B", "C"]);
    }

    #[test]
    fn test_row_set_totals() {
        let set = sample_set();
        assert_eq!(set.total_outflow(), 80.0);
        assert_eq!(set.total_inflow(), 80.0);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_row_set_categories() {
        let set = sample_set();
        assert_eq!(set.categories(), vec!["Bond", "Cash", "Equity"]);
    }

    #[test]
    fn test_row_deserializes_object_and_triple() {
        let json = r#"[
            { "category": "Equity", "subcategory": "Global Equity", "amount": 10.68 },
            ["Fixed Income", "Municipal Bond", -43.9]
        ]"#;
        let rows: Vec<FlowRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0], FlowRow::new("Equity", "Global Equity", 10.68));
        assert_eq!(rows[1], FlowRow::new("Fixed Income", "Municipal Bond", -43.9));
    }
}
