// src/file_handler.rs

use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ImageFile, ImageSlot, PendingFile, Product};

/// Stan obrazków jednego otwartego formularza.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSession {
    /// URL miniatury istniejącego produktu (tryb edycji).
    pub existing_image: Option<String>,
    pub image: Option<ImageFile>,
    pub image_collection: Vec<ImageFile>,
}

impl FileSession {
    /// URL do podglądu miniatury: nowo wybrany plik ma pierwszeństwo.
    pub fn thumbnail_preview(&self) -> Option<&str> {
        self.image
            .as_ref()
            .map(|image| image.url.as_str())
            .or(self.existing_image.as_deref())
    }

    /// Łączny rozmiar plików czekających na zapis.
    pub fn pending_bytes(&self) -> usize {
        self.image
            .iter()
            .chain(self.image_collection.iter())
            .filter_map(|image| image.file.as_ref())
            .map(|file| file.bytes.len())
            .sum()
    }

    fn find_pending(&self, image_id: &str) -> Option<&PendingFile> {
        self.image
            .iter()
            .chain(self.image_collection.iter())
            .find(|image| image.id == image_id)
            .and_then(|image| image.file.as_ref())
    }
}

/// Przechowuje wybrane pliki i adresy podglądu dla otwartych formularzy.
/// Porzucone sesje wygasają po `time_to_idle`.
#[derive(Clone)]
pub struct FileHandler {
    sessions: Cache<Uuid, FileSession>,
}

/// Limit pamięci na wszystkie sesje, liczony w bajtach wybranych plików.
pub const MAX_PENDING_BYTES: u64 = 512 * 1024 * 1024;

pub fn preview_url(session_id: Uuid, image_id: &str) -> String {
    format!("/uploads/{}/{}", session_id, image_id)
}

impl FileHandler {
    pub fn new(time_to_idle: Duration) -> Self {
        FileHandler {
            sessions: Cache::builder()
                .weigher(|_session_id: &Uuid, session: &FileSession| -> u32 {
                    // Pusta sesja też zajmuje miejsce w cache.
                    u32::try_from(session.pending_bytes())
                        .unwrap_or(u32::MAX)
                        .max(1)
                })
                .max_capacity(MAX_PENDING_BYTES)
                .time_to_idle(time_to_idle)
                .build(),
        }
    }

    pub async fn open_session(&self, product: Option<&Product>) -> (Uuid, FileSession) {
        let session_id = Uuid::new_v4();
        let session = FileSession {
            existing_image: product
                .and_then(|p| p.image.clone())
                .filter(|url| !url.trim().is_empty()),
            image: None,
            image_collection: product
                .map(|p| p.image_collection.clone())
                .unwrap_or_default(),
        };
        self.sessions.insert(session_id, session.clone()).await;
        tracing::debug!("Otwarto sesję plików formularza: {}", session_id);
        (session_id, session)
    }

    pub async fn session(&self, session_id: Uuid) -> Result<FileSession, AppError> {
        self.sessions.get(&session_id).await.ok_or_else(|| {
            tracing::warn!("Sesja plików {} nie istnieje lub wygasła", session_id);
            AppError::BadRequest(
                "The form session has expired, please reload the page.".to_string(),
            )
        })
    }

    /// Obsługuje wybór plików. Dla miniatury liczy się pierwszy plik,
    /// do kolekcji trafiają wszystkie.
    pub async fn on_file_change(
        &self,
        session_id: Uuid,
        slot: ImageSlot,
        files: Vec<PendingFile>,
    ) -> Result<FileSession, AppError> {
        let mut session = self.session(session_id).await?;

        if let Some(rejected) = files
            .iter()
            .find(|file| !file.content_type.starts_with("image/"))
        {
            return Err(AppError::UnprocessableEntity(format!(
                "'{}' is not an image file.",
                rejected.file_name
            )));
        }

        let mut selected = files.into_iter().filter(|file| !file.bytes.is_empty()).map(|file| {
            let id = Uuid::new_v4().to_string();
            ImageFile {
                url: preview_url(session_id, &id),
                id,
                file: Some(file),
            }
        });

        if slot.accepts_multiple() {
            session.image_collection.extend(selected);
        } else if let Some(image) = selected.next() {
            session.image = Some(image);
        }

        tracing::info!(
            "Wybrano pliki dla '{}' w sesji {}: miniatura={}, kolekcja={}",
            slot,
            session_id,
            session.image.is_some(),
            session.image_collection.len()
        );
        self.sessions.insert(session_id, session.clone()).await;
        Ok(session)
    }

    pub async fn remove_image(
        &self,
        session_id: Uuid,
        slot: ImageSlot,
        image_id: &str,
    ) -> Result<FileSession, AppError> {
        let mut session = self.session(session_id).await?;

        match slot {
            ImageSlot::Image => {
                if session.image.as_ref().is_some_and(|image| image.id == image_id) {
                    session.image = None;
                }
            }
            ImageSlot::ImageCollection => {
                session.image_collection.retain(|image| image.id != image_id);
            }
        }

        tracing::info!(
            "Usunięto obraz {} ('{}') z sesji {}",
            image_id,
            slot,
            session_id
        );
        self.sessions.insert(session_id, session.clone()).await;
        Ok(session)
    }

    pub async fn pending_file(&self, session_id: Uuid, image_id: &str) -> Option<PendingFile> {
        let session = self.sessions.get(&session_id).await?;
        session.find_pending(image_id).cloned()
    }

    pub async fn close_session(&self, session_id: Uuid) {
        self.sessions.invalidate(&session_id).await;
    }
}
