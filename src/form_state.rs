// src/form_state.rs
use std::collections::BTreeSet;

use uuid::Uuid;

use crate::models::{KeywordRow, ProductFormValues, SizeRow};

/// Ścieżki błędów, które odpowiadają kontrolkom formularza.
pub const ALL_FIELD_ROOTS: [&str; 5] = [
    "name",
    "description",
    "max_quantity",
    "keywords",
    "sizes_with_prices",
];

/// Zawartość formularza odesłana przez przeglądarkę przy każdej interakcji.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub values: ProductFormValues,
    pub session_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub new_keyword: Option<String>,
    pub touched: BTreeSet<String>,
}

/// Same białe znaki to brak wartości; poza tym tekst zostaje taki, jak wpisano.
fn option_string_empty_as_none(value: Option<&str>) -> Option<String> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Pusty albo nieliczbowy tekst traktujemy jak brak wartości.
fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn is_checked(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("on") || v.eq_ignore_ascii_case("true"))
}

fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn all_values<'a>(pairs: &'a [(String, String)], key: &str) -> Vec<&'a str> {
    pairs
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

/// Mapuje nazwę kontrolki HTML na ścieżkę pola w błędach walidacji.
pub fn field_root_for_input(input_name: &str) -> Option<&'static str> {
    match input_name {
        "name" => Some("name"),
        "description" => Some("description"),
        "max_quantity" => Some("max_quantity"),
        "keyword" | "new_keyword" => Some("keywords"),
        "size" | "size_price" | "size_row_id" => Some("sizes_with_prices"),
        _ => None,
    }
}

impl FormSubmission {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let single = |key: &str| first_value(pairs, key);
        let all = |key: &str| all_values(pairs, key);

        // Wiersze rozmiarów przychodzą jako równoległe listy pól.
        let size_ids = all("size_row_id");
        let sizes = all("size");
        let size_prices = all("size_price");
        let row_count = size_ids.len().max(sizes.len()).max(size_prices.len());
        let sizes_with_prices = (0..row_count)
            .map(|i| SizeRow {
                row_id: size_ids
                    .get(i)
                    .and_then(|id| Uuid::parse_str(id).ok())
                    .unwrap_or_else(Uuid::new_v4),
                size: option_string_empty_as_none(sizes.get(i).copied()),
                price: parse_number(size_prices.get(i).copied()),
            })
            .collect();

        let keyword_ids = all("keyword_row_id");
        let keywords = all("keyword")
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| {
                let value = value.trim();
                if value.is_empty() {
                    return None;
                }
                Some(KeywordRow {
                    row_id: keyword_ids
                        .get(i)
                        .and_then(|id| Uuid::parse_str(id).ok())
                        .unwrap_or_else(Uuid::new_v4),
                    value: value.to_string(),
                })
            })
            .collect();

        let values = ProductFormValues {
            name: option_string_empty_as_none(single("name")),
            description: option_string_empty_as_none(single("description")),
            price: parse_number(single("price")).unwrap_or(0.0),
            max_quantity: parse_number(single("max_quantity")),
            keywords,
            sizes_with_prices,
            is_featured: is_checked(single("is_featured")),
            is_recommended: is_checked(single("is_recommended")),
        };

        let touched = all("touched")
            .into_iter()
            .filter_map(|name| ALL_FIELD_ROOTS.iter().find(|root| **root == name))
            .map(|root| root.to_string())
            .collect();

        FormSubmission {
            values,
            session_id: single("session_id").and_then(|id| Uuid::parse_str(id.trim()).ok()),
            product_id: single("product_id").and_then(|id| Uuid::parse_str(id.trim()).ok()),
            new_keyword: option_string_empty_as_none(single("new_keyword")),
            touched,
        }
    }

    pub fn touch_input(&mut self, input_name: &str) {
        if let Some(root) = field_root_for_input(input_name) {
            self.touched.insert(root.to_string());
        }
    }

    pub fn touch(&mut self, root: &str) {
        self.touched.insert(root.to_string());
    }

    /// Przy próbie zapisu wszystkie pola są traktowane jako dotknięte.
    pub fn touch_all(&mut self) {
        self.touched
            .extend(ALL_FIELD_ROOTS.iter().map(|root| root.to_string()));
    }
}
