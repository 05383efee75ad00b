//! Menu item data models.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A (name, price) pair as recognized on a menu, before coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedItem {
    /// Item name, verbatim from the OCR text.
    pub name: String,
    /// Price substring, digits with an optional `.` decimal part.
    pub price: String,
}

impl ParsedItem {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
        }
    }

    /// Coerce the price string to a float.
    pub fn price_value(&self) -> Result<f64, ParseError> {
        self.price
            .trim()
            .parse::<f64>()
            .map_err(|source| ParseError::InvalidPrice {
                name: self.name.clone(),
                value: self.price.clone(),
                source,
            })
    }
}

/// A stored menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Store-assigned row id.
    pub id: i64,
    /// Item name.
    pub name: String,
    /// Item price.
    pub price: f64,
    /// When the batch that inserted this row was committed (RFC 3339).
    pub ingested_at: String,
}

/// Public JSON shape of a menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemView {
    pub name: String,
    pub price: f64,
}

impl From<MenuItem> for MenuItemView {
    fn from(item: MenuItem) -> Self {
        Self {
            name: item.name,
            price: item.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_value() {
        assert_eq!(ParsedItem::new("Burger", "12").price_value().unwrap(), 12.0);
        assert_eq!(ParsedItem::new("Soup", "4.50").price_value().unwrap(), 4.5);
    }

    #[test]
    fn test_price_value_rejects_text() {
        let err = ParsedItem::new("Burger", "N/A").price_value().unwrap_err();
        assert!(err.to_string().contains("N/A"));
    }

    #[test]
    fn test_view_serializes_name_and_price_only() {
        let item = MenuItem {
            id: 7,
            name: "Fries".to_string(),
            price: 5.0,
            ingested_at: "2024-01-01T00:00:00+00:00".to_string(),
        };
        let json = serde_json::to_string(&MenuItemView::from(item)).unwrap();
        assert_eq!(json, r#"{"name":"Fries","price":5.0}"#);
    }
}
