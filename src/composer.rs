// src/composer.rs

use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::file_handler::FileSession;
use crate::models::{DEFAULT_QUANTITY, ProductFormValues, ProductPayload, SizeWithPrice, ThumbnailRef};
use crate::validation::validate_product_form;

/// Miniatura wybrana w formularzu wygrywa z URL-em istniejącego produktu.
pub fn resolve_thumbnail(files: &FileSession) -> Option<ThumbnailRef> {
    if let Some(file) = files.image.as_ref().and_then(|image| image.file.clone()) {
        return Some(ThumbnailRef::File(file));
    }
    files.existing_image.clone().map(ThumbnailRef::Url)
}

/// Składa payload do zapisu. Zwraca `InvalidForm`, gdy formularz nie
/// przechodzi walidacji, albo `MissingThumbnail`, gdy brak miniatury.
pub fn compose_payload(
    values: &ProductFormValues,
    files: &FileSession,
    now: DateTime<Utc>,
) -> Result<ProductPayload, AppError> {
    validate_product_form(values).map_err(AppError::InvalidForm)?;

    let image = resolve_thumbnail(files).ok_or_else(|| {
        tracing::warn!("Odrzucono zapis produktu bez miniatury");
        AppError::MissingThumbnail
    })?;

    let name = values.name.clone().unwrap_or_default();
    let sizes_with_prices = values
        .sizes_with_prices
        .iter()
        .map(|row| SizeWithPrice {
            size: row.size.clone().unwrap_or_default(),
            price: row.price.unwrap_or_default(),
        })
        .collect();

    Ok(ProductPayload {
        name_lower: name.to_lowercase(),
        name,
        description: values.description.clone().unwrap_or_default(),
        price: values.price,
        max_quantity: values.max_quantity.unwrap_or_default() as i64,
        keywords: values.keywords.iter().map(|k| k.value.clone()).collect(),
        sizes_with_prices,
        is_featured: values.is_featured,
        is_recommended: values.is_recommended,
        quantity: DEFAULT_QUANTITY,
        date_added: now.timestamp_millis(),
        image,
        image_collection: files.image_collection.clone(),
    })
}
