//! Product entity.

use serde::{Deserialize, Serialize};

use crate::model::{check_price, seed_date, EntityKind, Record, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Unit price in dollars.
    pub price: f64,
    pub category: String,
    pub stock: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<u32>,
}

impl Record for Product {
    type Draft = NewProduct;
    type Patch = ProductPatch;

    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: NewProduct, now: Timestamp) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            stock: draft.stock,
            created_at: now,
            updated_at: now,
        }
    }

    fn validate_draft(draft: &NewProduct) -> Result<(), String> {
        check_price(draft.price)
    }

    fn validate_patch(patch: &ProductPatch) -> Result<(), String> {
        patch.price.map_or(Ok(()), check_price)
    }

    fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: Timestamp) {
        self.updated_at = at;
    }

    fn seed() -> Vec<Self> {
        vec![
            Product {
                id: 1,
                name: "Laptop".into(),
                description: "High-performance laptop".into(),
                price: 999.99,
                category: "Electronics".into(),
                stock: 10,
                created_at: seed_date(2023, 1, 1),
                updated_at: seed_date(2023, 12, 1),
            },
            Product {
                id: 2,
                name: "Smartphone".into(),
                description: "Latest smartphone".into(),
                price: 699.99,
                category: "Electronics".into(),
                stock: 25,
                created_at: seed_date(2023, 2, 1),
                updated_at: seed_date(2023, 11, 1),
            },
            Product {
                id: 3,
                name: "Headphones".into(),
                description: "Noise-cancelling headphones".into(),
                price: 199.99,
                category: "Electronics".into(),
                stock: 15,
                created_at: seed_date(2023, 3, 1),
                updated_at: seed_date(2023, 10, 1),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_catalog() {
        let names: Vec<_> = Product::seed().into_iter().map(|p| (p.name, p.price)).collect();
        assert_eq!(
            names,
            vec![
                ("Laptop".to_string(), 999.99),
                ("Smartphone".to_string(), 699.99),
                ("Headphones".to_string(), 199.99),
            ]
        );
    }

    #[test]
    fn test_patch_price_and_stock() {
        let mut laptop = Product::seed().remove(0);
        laptop.apply_patch(ProductPatch {
            price: Some(899.0),
            stock: Some(0),
            ..Default::default()
        });
        assert_eq!(laptop.price, 899.0);
        assert_eq!(laptop.stock, 0);
        assert_eq!(laptop.description, "High-performance laptop");
    }
}
