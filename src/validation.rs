// src/validation.rs
use std::collections::{BTreeMap, BTreeSet};

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::models::ProductFormValues;

pub const MAX_QUANTITY_INTEGER_MESSAGE: &str = "Max quantity should be an integer.";
pub const MAX_QUANTITY_INVALID_MESSAGE: &str = "Max quantity is invalid.";

/// Górna granica, przy której `max_quantity` mieści się jeszcze w `i64`.
const MAX_QUANTITY_LIMIT: f64 = i64::MAX as f64;

/// Błędy formularza pogrupowane po ścieżce pola, np. `name`
/// albo `sizes_with_prices[0].size`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(path.into()).or_default().push(message.into());
    }

    /// Pierwszy komunikat dla pola, wyświetlany pod kontrolką.
    pub fn first(&self, path: &str) -> Option<&str> {
        self.fields
            .get(path)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().flat_map(|(path, messages)| {
            messages
                .iter()
                .map(move |message| (path.as_str(), message.as_str()))
        })
    }

    /// Zostawia tylko błędy pól, których użytkownik już dotknął.
    /// `sizes_with_prices` obejmuje też `sizes_with_prices[0].size`.
    pub fn retain_touched(&self, touched: &BTreeSet<String>) -> FormErrors {
        let fields = self
            .fields
            .iter()
            .filter(|(path, _)| {
                touched.iter().any(|root| {
                    path.as_str() == root.as_str()
                        || path
                            .strip_prefix(root.as_str())
                            .is_some_and(|rest| rest.starts_with('[') || rest.starts_with('.'))
                })
            })
            .map(|(path, messages)| (path.clone(), messages.clone()))
            .collect();
        FormErrors { fields }
    }

    fn collect(&mut self, prefix: &str, errors: &ValidationErrors) {
        for (field, kind) in errors.errors() {
            let path = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", prefix, field)
            };
            match kind {
                ValidationErrorsKind::Field(field_errors) => {
                    for error in field_errors {
                        let message = error.message.as_ref().map_or_else(
                            || format!("Field '{}' is invalid.", path),
                            |m| m.to_string(),
                        );
                        self.push(path.clone(), message);
                    }
                }
                ValidationErrorsKind::Struct(inner) => self.collect(&path, inner),
                ValidationErrorsKind::List(items) => {
                    for (index, inner) in items {
                        self.collect(&format!("{}[{}]", path, index), inner);
                    }
                }
            }
        }
    }
}

impl From<&ValidationErrors> for FormErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut form_errors = FormErrors::default();
        form_errors.collect("", errors);
        form_errors
    }
}

/// Sprawdza stan formularza. Reguły deklaratywne siedzą na strukturach
/// w `models.rs`, tutaj dochodzi jedynie wymóg liczby całkowitej.
pub fn validate_product_form(values: &ProductFormValues) -> Result<(), FormErrors> {
    let mut errors = match values.validate() {
        Ok(()) => FormErrors::default(),
        Err(validation_errors) => FormErrors::from(&validation_errors),
    };

    if let Some(max_quantity) = values.max_quantity {
        if max_quantity.fract() != 0.0 {
            errors.push("max_quantity", MAX_QUANTITY_INTEGER_MESSAGE);
        }
        if max_quantity >= MAX_QUANTITY_LIMIT {
            errors.push("max_quantity", MAX_QUANTITY_INVALID_MESSAGE);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!("Walidacja formularza nie powiodła się: {:?}", errors);
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KeywordRow, SizeRow};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn valid_values() -> ProductFormValues {
        ProductFormValues {
            name: Some("Shirt".into()),
            description: Some("d".into()),
            price: 0.0,
            max_quantity: Some(5.0),
            keywords: vec![KeywordRow::new("red")],
            sizes_with_prices: vec![SizeRow {
                row_id: Uuid::new_v4(),
                size: Some("M".into()),
                price: Some(10.0),
            }],
            is_featured: false,
            is_recommended: false,
        }
    }

    #[test]
    fn valid_form_passes() {
        assert_eq!(validate_product_form(&valid_values()), Ok(()));
    }

    #[test]
    fn name_longer_than_sixty_characters_is_rejected() {
        let mut values = valid_values();
        values.name = Some("x".repeat(61));

        let errors = validate_product_form(&values).unwrap_err();
        assert_eq!(
            errors.first("name"),
            Some("Product name must be less than 60 characters.")
        );
    }

    #[test]
    fn name_of_exactly_sixty_characters_is_accepted() {
        let mut values = valid_values();
        values.name = Some("ż".repeat(60));
        assert!(validate_product_form(&values).is_ok());
    }

    #[test]
    fn required_fields_report_their_messages() {
        let mut values = valid_values();
        values.name = None;
        values.description = None;
        values.max_quantity = None;

        let errors = validate_product_form(&values).unwrap_err();
        assert_eq!(errors.first("name"), Some("Product name is required."));
        assert_eq!(errors.first("description"), Some("Description is required."));
        assert_eq!(errors.first("max_quantity"), Some("Max quantity is required."));
    }

    #[test]
    fn max_quantity_must_be_a_positive_integer() {
        let mut values = valid_values();
        values.max_quantity = Some(0.0);
        let errors = validate_product_form(&values).unwrap_err();
        assert_eq!(errors.first("max_quantity"), Some("Max quantity is invalid."));

        values.max_quantity = Some(2.5);
        let errors = validate_product_form(&values).unwrap_err();
        assert_eq!(errors.first("max_quantity"), Some(MAX_QUANTITY_INTEGER_MESSAGE));
    }

    #[test]
    fn max_quantity_beyond_i64_is_rejected() {
        let mut values = valid_values();
        values.max_quantity = Some(1e30);
        let errors = validate_product_form(&values).unwrap_err();
        assert_eq!(errors.first("max_quantity"), Some(MAX_QUANTITY_INVALID_MESSAGE));

        values.max_quantity = Some(9_000_000_000_000_000_000.0);
        assert!(validate_product_form(&values).is_ok());
    }

    #[test]
    fn empty_keywords_are_rejected() {
        let mut values = valid_values();
        values.keywords.clear();

        let errors = validate_product_form(&values).unwrap_err();
        assert_eq!(
            errors.first("keywords"),
            Some("Please enter at least 1 keyword for this product.")
        );
    }

    #[test]
    fn empty_sizes_are_rejected() {
        let mut values = valid_values();
        values.sizes_with_prices.clear();

        let errors = validate_product_form(&values).unwrap_err();
        assert_eq!(
            errors.first("sizes_with_prices"),
            Some("Please enter at least one size and price.")
        );
    }

    #[test]
    fn size_rows_are_validated_individually() {
        let mut values = valid_values();
        values.sizes_with_prices.push(SizeRow {
            row_id: Uuid::new_v4(),
            size: None,
            price: Some(-3.0),
        });
        values.sizes_with_prices.push(SizeRow {
            row_id: Uuid::new_v4(),
            size: Some("XL".into()),
            price: None,
        });

        let errors = validate_product_form(&values).unwrap_err();
        assert!(!errors.contains("sizes_with_prices[0].size"));
        assert_eq!(errors.first("sizes_with_prices[1].size"), Some("Size is required."));
        assert_eq!(errors.first("sizes_with_prices[1].price"), Some("Price is invalid."));
        assert_eq!(errors.first("sizes_with_prices[2].price"), Some("Price is required."));
    }

    #[test]
    fn untouched_fields_are_filtered_out() {
        let mut values = valid_values();
        values.name = None;
        values.sizes_with_prices[0].size = None;
        let errors = validate_product_form(&values).unwrap_err();

        let touched = BTreeSet::from(["sizes_with_prices".to_string()]);
        let visible = errors.retain_touched(&touched);
        assert!(!visible.contains("name"));
        assert_eq!(visible.first("sizes_with_prices[0].size"), Some("Size is required."));
    }
}
