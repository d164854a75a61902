// src/backend.rs

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, multipart};
use tokio::sync::{Mutex, RwLock};
use url::Url;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{PendingFile, Product, ProductPayload, ThumbnailRef};

/// Zewnętrzny backend, który odczytuje i zapisuje produkty.
/// Formularz nigdy nie utrwala danych sam.
#[async_trait]
pub trait ProductBackend: Send + Sync {
    async fn fetch(&self, product_id: Uuid) -> Result<Option<Product>, AppError>;

    /// `product_id` jest ustawione w trybie edycji.
    async fn submit(
        &self,
        product_id: Option<Uuid>,
        payload: ProductPayload,
    ) -> Result<(), AppError>;
}

/// Backend w pamięci: trzyma produkty do edycji i zapisuje odebrane payloady.
#[derive(Default)]
pub struct InMemoryProductBackend {
    products: RwLock<HashMap<Uuid, Product>>,
    submissions: Mutex<Vec<(Option<Uuid>, ProductPayload)>>,
}

impl InMemoryProductBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        InMemoryProductBackend {
            products: RwLock::new(products.into_iter().map(|p| (p.id, p)).collect()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub async fn submissions(&self) -> Vec<(Option<Uuid>, ProductPayload)> {
        self.submissions.lock().await.clone()
    }
}

#[async_trait]
impl ProductBackend for InMemoryProductBackend {
    async fn fetch(&self, product_id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.products.read().await.get(&product_id).cloned())
    }

    async fn submit(
        &self,
        product_id: Option<Uuid>,
        payload: ProductPayload,
    ) -> Result<(), AppError> {
        tracing::info!(
            "Zapisano payload produktu '{}' (edycja: {:?})",
            payload.name,
            product_id
        );
        self.submissions.lock().await.push((product_id, payload));
        Ok(())
    }
}

/// Przekazuje payload do backendu HTTP jako multipart: część `product`
/// z JSON-em oraz części z wybranymi plikami.
pub struct HttpProductBackend {
    client: Client,
    base_url: Url,
}

impl HttpProductBackend {
    pub fn new(base_url: Url) -> Self {
        HttpProductBackend {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn file_part(file: &PendingFile) -> Result<multipart::Part, AppError> {
        multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| {
                tracing::error!("Błąd ustawiania typu MIME: {}", e);
                AppError::InternalServerError(
                    "Could not prepare the selected file for upload.".to_string(),
                )
            })
    }

    fn build_form(payload: &ProductPayload) -> Result<multipart::Form, AppError> {
        let product_json = serde_json::to_string(payload).map_err(|e| {
            AppError::InternalServerError(format!("Could not serialize the product: {}", e))
        })?;
        let product_part = multipart::Part::text(product_json)
            .mime_str("application/json")
            .map_err(AppError::from)?;

        let mut form = multipart::Form::new().part("product", product_part);

        if let ThumbnailRef::File(file) = &payload.image {
            form = form.part("image", Self::file_part(file)?);
        }
        for image in &payload.image_collection {
            if let Some(file) = &image.file {
                form = form.part(format!("imageCollection[{}]", image.id), Self::file_part(file)?);
            }
        }
        Ok(form)
    }
}

#[async_trait]
impl ProductBackend for HttpProductBackend {
    async fn fetch(&self, product_id: Uuid) -> Result<Option<Product>, AppError> {
        let url = self.endpoint(&format!("products/{}", product_id));
        tracing::debug!("Pobieranie produktu z backendu: {}", url);

        let resp = self.client.get(&url).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(resp.json::<Product>().await?)),
            status => {
                let error_text = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "Brak treści błędu".to_string());
                Err(AppError::Backend(format!(
                    "GET {} zwrócił status {}: {}",
                    url, status, error_text
                )))
            }
        }
    }

    async fn submit(
        &self,
        product_id: Option<Uuid>,
        payload: ProductPayload,
    ) -> Result<(), AppError> {
        let form = Self::build_form(&payload)?;
        let request = match product_id {
            Some(id) => self.client.put(self.endpoint(&format!("products/{}", id))),
            None => self.client.post(self.endpoint("products")),
        };

        let resp = request.multipart(form).send().await?;
        if resp.status().is_success() {
            tracing::info!("Backend przyjął produkt '{}'", payload.name);
            Ok(())
        } else {
            let status = resp.status();
            let error_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "Brak treści błędu".to_string());
            Err(AppError::Backend(format!(
                "Zapis produktu odrzucony (status: {}): {}",
                status, error_text
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::file_handler::FileSession;
    use crate::models::{KeywordRow, ProductFormValues, SizeRow};

    fn payload() -> ProductPayload {
        let values = ProductFormValues {
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
        };
        let files = FileSession {
            existing_image: Some("https://cdn.example.com/shirt.jpg".into()),
            ..FileSession::default()
        };
        crate::composer::compose_payload(&values, &files, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn in_memory_backend_records_submissions() {
        let backend = InMemoryProductBackend::new();
        backend.submit(None, payload()).await.unwrap();

        let submissions = backend.submissions().await;
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].0, None);
        assert_eq!(submissions[0].1.name_lower, "shirt");
    }

    #[tokio::test]
    async fn in_memory_backend_fetches_seeded_products() {
        let id = Uuid::new_v4();
        let product: Product = serde_json::from_value(serde_json::json!({ "id": id })).unwrap();
        let backend = InMemoryProductBackend::with_products(vec![product]);

        assert!(backend.fetch(id).await.unwrap().is_some());
        assert!(backend.fetch(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let backend = HttpProductBackend::new(Url::parse("http://backend.local/api/").unwrap());
        assert_eq!(backend.endpoint("products"), "http://backend.local/api/products");
    }
}
