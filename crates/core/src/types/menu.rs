//! Menu items.

use serde::{Deserialize, Serialize};

use crate::{Bitcoin, MenuItemId};

/// A pizza on the menu. Immutable from the client's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub title: String,
    /// Image reference, relative to the storefront's asset root.
    pub image: String,
    pub price: Bitcoin,
    pub description: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_menu() {
        let json = r#"[
            {"id": 1, "title": "Veggie", "image": "pizza1.png", "price": 0.0038, "description": "A garden of delight"},
            {"id": "2", "title": "Pepperoni", "image": "pizza2.png", "price": 0.0042, "description": "Spicy treat"}
        ]"#;
        let menu: Vec<MenuItem> = serde_json::from_str(json).unwrap();
        assert_eq!(menu.len(), 2);
        assert_eq!(menu[1].id, MenuItemId::new(2));
        assert_eq!(menu[0].price, Bitcoin::from_parts(38, 4));
    }
}
