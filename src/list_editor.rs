// src/list_editor.rs
use uuid::Uuid;

use crate::models::{KeywordRow, ProductFormValues, SizeRow};

/// Wiersz listy edytowalnej w formularzu. Identyfikator jest stały
/// między kolejnymi renderami tego samego wiersza.
pub trait ListRow {
    fn row_id(&self) -> Uuid;
}

/// Edytor powtarzalnych wpisów: dodawanie na końcu, usuwanie po indeksie.
pub struct ListEditor<'a, T> {
    rows: &'a mut Vec<T>,
}

impl<'a, T: ListRow> ListEditor<'a, T> {
    pub fn new(rows: &'a mut Vec<T>) -> Self {
        ListEditor { rows }
    }

    pub fn push(&mut self, row: T) -> Uuid {
        let id = row.row_id();
        self.rows.push(row);
        id
    }

    /// Indeks spoza zakresu jest ignorowany.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            tracing::warn!(
                "Próba usunięcia wiersza {} z listy o długości {}",
                index,
                self.rows.len()
            );
            None
        }
    }

    pub fn position(&self, row_id: Uuid) -> Option<usize> {
        self.rows.iter().position(|row| row.row_id() == row_id)
    }
}

impl ProductFormValues {
    pub fn sizes_editor(&mut self) -> ListEditor<'_, SizeRow> {
        ListEditor::new(&mut self.sizes_with_prices)
    }

    pub fn keywords_editor(&mut self) -> ListEditor<'_, KeywordRow> {
        ListEditor::new(&mut self.keywords)
    }

    pub fn add_size_row(&mut self) -> Uuid {
        self.sizes_editor().push(SizeRow::blank())
    }

    pub fn remove_size_row(&mut self, index: usize) -> Option<SizeRow> {
        self.sizes_editor().remove(index)
    }

    /// Dodaje słowo kluczowe jak pole "creatable select": przycięte,
    /// bez pustych wpisów i bez duplikatów.
    pub fn add_keyword(&mut self, raw: &str) -> Option<Uuid> {
        let keyword = raw.trim();
        if keyword.is_empty() || self.keywords.iter().any(|k| k.value == keyword) {
            return None;
        }
        Some(self.keywords_editor().push(KeywordRow::new(keyword)))
    }

    pub fn remove_keyword(&mut self, index: usize) -> Option<KeywordRow> {
        self.keywords_editor().remove(index)
    }
}
