// src/models.rs
use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;
use validator::Validate;

use crate::list_editor::ListRow;

pub const DEFAULT_QUANTITY: u32 = 1;

/// Para rozmiar/cena w postaci zapisywanej przez backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SizeWithPrice {
    pub size: String,
    pub price: f64,
}

/// Obrazek z galerii produktu. `file` jest ustawiony tylko dla plików
/// wybranych w formularzu, które nie zostały jeszcze wysłane do backendu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageFile {
    pub id: String,
    pub url: String,
    #[serde(skip)]
    pub file: Option<PendingFile>,
}

/// Plik wybrany przez administratora, trzymany w pamięci do czasu zapisu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingFile {
    pub file_name: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Bytes,
}

/// Istniejący produkt przekazany do formularza w trybie edycji.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub max_quantity: i64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sizes_with_prices: Vec<SizeWithPrice>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_recommended: bool,
    #[serde(default, alias = "imageUrl")]
    pub image: Option<String>,
    #[serde(default)]
    pub image_collection: Vec<ImageFile>,
}

/// Miejsce w formularzu, do którego trafiają wybrane pliki.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
pub enum ImageSlot {
    #[strum(serialize = "image")]
    Image,
    #[strum(serialize = "imageCollection")]
    ImageCollection,
}

impl ImageSlot {
    pub fn accepts_multiple(&self) -> bool {
        matches!(self, ImageSlot::ImageCollection)
    }
}

/// Wiersz edytora rozmiarów. Puste pola z formularza trafiają tu jako `None`.
#[derive(Debug, Clone, Serialize, PartialEq, Validate)]
pub struct SizeRow {
    pub row_id: Uuid,

    #[validate(required(message = "Size is required."))]
    pub size: Option<String>,

    #[validate(
        required(message = "Price is required."),
        range(exclusive_min = 0.0, message = "Price is invalid.")
    )]
    pub price: Option<f64>,
}

impl SizeRow {
    pub fn blank() -> Self {
        SizeRow {
            row_id: Uuid::new_v4(),
            size: None,
            price: Some(0.0),
        }
    }
}

impl From<&SizeWithPrice> for SizeRow {
    fn from(value: &SizeWithPrice) -> Self {
        SizeRow {
            row_id: Uuid::new_v4(),
            size: Some(value.size.clone()).filter(|s| !s.trim().is_empty()),
            price: Some(value.price),
        }
    }
}

impl ListRow for SizeRow {
    fn row_id(&self) -> Uuid {
        self.row_id
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct KeywordRow {
    pub row_id: Uuid,
    pub value: String,
}

impl KeywordRow {
    pub fn new(value: impl Into<String>) -> Self {
        KeywordRow {
            row_id: Uuid::new_v4(),
            value: value.into(),
        }
    }
}

impl ListRow for KeywordRow {
    fn row_id(&self) -> Uuid {
        self.row_id
    }
}

/// Stan formularza produktu, walidowany przy każdej zmianie i przy zapisie.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProductFormValues {
    #[validate(
        required(message = "Product name is required."),
        length(max = 60, message = "Product name must be less than 60 characters.")
    )]
    pub name: Option<String>,

    #[validate(required(message = "Description is required."))]
    pub description: Option<String>,

    pub price: f64,

    #[validate(
        required(message = "Max quantity is required."),
        range(exclusive_min = 0.0, message = "Max quantity is invalid.")
    )]
    pub max_quantity: Option<f64>,

    #[validate(length(min = 1, message = "Please enter at least 1 keyword for this product."))]
    pub keywords: Vec<KeywordRow>,

    #[validate(
        length(min = 1, message = "Please enter at least one size and price."),
        nested
    )]
    pub sizes_with_prices: Vec<SizeRow>,

    pub is_featured: bool,
    pub is_recommended: bool,
}

impl ProductFormValues {
    /// Wartości początkowe: puste dla nowego produktu albo przepisane
    /// z istniejącego rekordu.
    pub fn initial(product: Option<&Product>) -> Self {
        let Some(product) = product else {
            return ProductFormValues {
                name: None,
                description: None,
                price: 0.0,
                max_quantity: Some(0.0),
                keywords: Vec::new(),
                sizes_with_prices: vec![SizeRow::blank()],
                is_featured: false,
                is_recommended: false,
            };
        };

        let sizes_with_prices = if product.sizes_with_prices.is_empty() {
            vec![SizeRow::blank()]
        } else {
            product.sizes_with_prices.iter().map(SizeRow::from).collect()
        };

        ProductFormValues {
            name: Some(product.name.clone()).filter(|s| !s.trim().is_empty()),
            description: Some(product.description.clone()).filter(|s| !s.trim().is_empty()),
            price: product.price,
            max_quantity: Some(product.max_quantity as f64),
            keywords: product.keywords.iter().map(KeywordRow::new).collect(),
            sizes_with_prices,
            is_featured: product.is_featured,
            is_recommended: product.is_recommended,
        }
    }
}

/// Miniatura w payloadzie: nowo wybrany plik albo URL istniejącego obrazka.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ThumbnailRef {
    File(PendingFile),
    Url(String),
}

/// Payload przekazywany do backendu po poprawnym zapisie formularza.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub max_quantity: i64,
    pub keywords: Vec<String>,
    pub sizes_with_prices: Vec<SizeWithPrice>,
    pub is_featured: bool,
    pub is_recommended: bool,
    pub quantity: u32,
    #[serde(rename = "name_lower")]
    pub name_lower: String,
    pub date_added: i64,
    pub image: ThumbnailRef,
    pub image_collection: Vec<ImageFile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn image_slot_parses_form_names() {
        assert_eq!(ImageSlot::from_str("image").unwrap(), ImageSlot::Image);
        assert_eq!(
            ImageSlot::from_str("imageCollection").unwrap(),
            ImageSlot::ImageCollection
        );
        assert!(ImageSlot::from_str("gallery").is_err());
        assert_eq!(ImageSlot::ImageCollection.to_string(), "imageCollection");
    }

    #[test]
    fn create_mode_starts_with_one_blank_size_row() {
        let values = ProductFormValues::initial(None);
        assert_eq!(values.sizes_with_prices.len(), 1);
        assert_eq!(values.sizes_with_prices[0].size, None);
        assert_eq!(values.sizes_with_prices[0].price, Some(0.0));
        assert_eq!(values.max_quantity, Some(0.0));
        assert!(values.keywords.is_empty());
        assert!(!values.is_featured && !values.is_recommended);
    }

    #[test]
    fn product_accepts_image_url_alias() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "6f1c3a56-3c0e-4b4e-9d53-1b8f0d7e2a10",
            "name": "Shirt",
            "imageUrl": "https://cdn.example.com/shirt.jpg",
            "maxQuantity": 3
        }))
        .unwrap();

        assert_eq!(
            product.image.as_deref(),
            Some("https://cdn.example.com/shirt.jpg")
        );
        assert_eq!(product.max_quantity, 3);
        assert!(product.sizes_with_prices.is_empty());
    }
}
