use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Display name of the synthetic node that gathers every outflow.
pub const POOL_NAME: &str = "Reallocation Pool";

/// Display name of the synthetic node funding inflows the pool cannot cover.
pub const NEW_CAPITAL_NAME: &str = "Net New Capital";

/// Identifies a flow node by asset class and sub-class.
///
/// Renders as `"{category}: {subcategory}"`, which is also the node name
/// handed to the diagram. Two rows with the same category and subcategory
/// map to the same label.
///
/// # Examples
///
/// ```
/// use flow_rebalancer::core::label::Label;
///
/// let label = Label::new("Equity", "Global Equity");
/// assert_eq!(label.to_string(), "Equity: Global Equity");
/// assert_eq!(label.category(), "Equity");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    category: String,
    subcategory: String,
}

impl Label {
    pub fn new(category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
        }
    }

    /// The asset class, e.g. "Fixed Income".
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The sub-class within the category, e.g. "Municipal Bond".
    pub fn subcategory(&self) -> &str {
        &self.subcategory
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.subcategory)
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = Label;
            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a \"category: subcategory\" string")
            }
            fn visit_str<E: de::Error>(self, value: &str) -> Result<Label, E> {
                let (category, subcategory) = value
                    .split_once(": ")
                    .ok_or_else(|| E::custom(format!("invalid label: {value}")))?;
                Ok(Label::new(category, subcategory))
            }
        }
        deserializer.deserialize_str(V)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_equality() {
        let a = Label::new("Equity", "Global Equity");
        let b = Label::new("Equity", "Global Equity");
        let c = Label::new("Fixed Income", "Global Bonds");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_label_display() {
        let label = Label::new("Private Markets", "Venture Capital");
        assert_eq!(format!("{}", label), "Private Markets: Venture Capital");
    }

    #[test]
    fn test_label_never_collides_with_synthetic_names() {
        // Row labels always contain the ": " separator; the synthetic names never do.
        assert!(!POOL_NAME.contains(": "));
        assert!(!NEW_CAPITAL_NAME.contains(": "));
    }

    #[test]
    fn test_label_json_is_display_string() {
        let label = Label::new("Cash", "Treasury Bills");
        let json = serde_json::to_string(&label).unwrap();
        assert_eq!(json, "\"Cash: Treasury Bills\"");

        let back: Label = serde_json::from_str(&json).unwrap();
        assert_eq!(back, label);
    }

    #[test]
    fn test_label_rejects_missing_separator() {
        let result: Result<Label, _> = serde_json::from_str("\"Reallocation Pool\"");
        assert!(result.is_err());
    }
}
