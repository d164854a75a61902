// src/views.rs

use maud::{DOCTYPE, Markup, PreEscaped, html};
use uuid::Uuid;

use crate::file_handler::FileSession;
use crate::form_state::FormSubmission;
use crate::models::{ImageSlot, ProductFormValues};
use crate::validation::FormErrors;

pub const PLACEHOLDER_IMAGE: &str = "/static/placeholder.svg";

// Skrypt strony: alert dla zdarzenia showAlert z nagłówka HX-Trigger,
// podmiana treści także dla odpowiedzi 422.
const PAGE_SCRIPT: &str = r#"
document.body.addEventListener('showAlert', function (e) { alert(e.detail.message); });
document.body.addEventListener('showMessage', function (e) {
  var box = document.getElementById('product-form-messages');
  if (box) { box.textContent = e.detail.message; box.dataset.type = e.detail.type; }
});
document.body.addEventListener('htmx:beforeSwap', function (e) {
  if (e.detail.xhr.status === 422) { e.detail.shouldSwap = true; e.detail.isError = false; }
});
"#;

const PAGE_STYLE: &str = r#"
.htmx-request .file-picker, .htmx-request.file-picker { display: none; }
.htmx-indicator { display: none; }
.htmx-request .htmx-indicator, .htmx-request.htmx-indicator { display: inline; }
.htmx-request .when-idle, .htmx-request.when-idle { display: none; }
.field-error { color: #b91c1c; font-size: 0.8rem; }
"#;

/// Wszystko, czego potrzeba do wyrenderowania formularza.
pub struct FormView<'a> {
    pub values: &'a ProductFormValues,
    pub errors: &'a FormErrors,
    pub touched: &'a [String],
    pub files: &'a FileSession,
    pub session_id: Uuid,
    pub product_id: Option<Uuid>,
    pub new_keyword: Option<&'a str>,
}

impl<'a> FormView<'a> {
    pub fn from_submission(
        submission: &'a FormSubmission,
        touched: &'a [String],
        errors: &'a FormErrors,
        files: &'a FileSession,
        session_id: Uuid,
    ) -> Self {
        FormView {
            values: &submission.values,
            errors,
            touched,
            files,
            session_id,
            product_id: submission.product_id,
            new_keyword: submission.new_keyword.as_deref(),
        }
    }
}

pub fn render_page(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src="https://unpkg.com/htmx.org@2.0.4" {}
                style { (PreEscaped(PAGE_STYLE)) }
            }
            body {
                main #admin-content ."p-4 sm:p-6 lg:p-8" { (content) }
                script { (PreEscaped(PAGE_SCRIPT)) }
            }
        }
    }
}

/// Obrazek z zastępczym plikiem, gdy adres nie daje się wczytać.
pub fn image_loader(src: &str, alt: &str, class: &str) -> Markup {
    let fallback = format!(
        "this.onerror=null;this.src='{}'",
        PLACEHOLDER_IMAGE
    );
    html! {
        img src=(src) alt=(alt) class=(class) loading="lazy" onerror=(fallback);
    }
}

fn field_error(errors: &FormErrors, path: &str) -> Markup {
    html! {
        @if let Some(message) = errors.first(path) {
            span ."field-error" data-field=(path) { (message) }
        }
    }
}

fn number_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn render_product_form(view: &FormView) -> Markup {
    let values = view.values;
    let errors = view.errors;
    let is_new = view.product_id.is_none();
    let form_title = if is_new { "Add New Product" } else { "Edit Product" };

    html! {
        div #product-form-container {
            div ."flex justify-between items-center mb-6 pb-3 border-b border-gray-300" {
                h2 ."text-2xl font-semibold text-gray-800" { (form_title)
                    @if let (false, Some(name)) = (is_new, values.name.as_deref()) { ": " span ."text-pink-600" { (name) } }
                }
            }
            div #product-form-messages ."mb-4 min-h-[2em]" {}

            form #product-form .product-form
                hx-post="/htmx/product-form/submit"
                hx-target="#product-form-container"
                hx-swap="outerHTML"
                hx-disabled-elt="find fieldset, find button[type='submit']" {

                input type="hidden" name="session_id" value=(view.session_id.to_string());
                @if let Some(product_id) = view.product_id {
                    input type="hidden" name="product_id" value=(product_id.to_string());
                }
                @for root in view.touched {
                    input type="hidden" name="touched" value=(root);
                }

                // Każda kontrolka z hx-post wysyła cały formularz do walidacji przy zmianie.
                fieldset #product-form-fields .product-form-inputs
                    hx-include="#product-form"
                    hx-target="#product-form-container"
                    hx-swap="outerHTML" {

                    div ."d-flex-start" {
                        div ."product-form-field" {
                            label for="name" { "* Product Name" }
                            input type="text" name="name" id="name" value=[values.name.as_deref()]
                                hx-post="/htmx/product-form/validate";
                            (field_error(errors, "name"))
                        }
                        div ."product-form-field" {
                            label for="description" { "* Product Description" }
                            textarea name="description" id="description" rows="3"
                                hx-post="/htmx/product-form/validate" {
                                (values.description.as_deref().unwrap_or(""))
                            }
                            (field_error(errors, "description"))
                        }
                    }

                    div ."d-flex" {
                        div ."product-form-field" {
                            label for="price" { "* Price" }
                            input type="number" step="any" name="price" id="price" value=(number_value(Some(values.price)))
                                hx-post="/htmx/product-form/validate";
                        }
                        div ."product-form-field" {
                            label for="max_quantity" { "* Max Quantity" }
                            input type="number" name="max_quantity" id="max_quantity"
                                value=(number_value(values.max_quantity))
                                hx-post="/htmx/product-form/validate";
                            (field_error(errors, "max_quantity"))
                        }
                    }

                    (render_sizes_editor(values, errors))
                    (render_keywords_editor(values, errors, view.new_keyword))

                    div ."d-flex" {
                        div ."product-form-field" {
                            input type="checkbox" name="is_featured" id="featured" checked[values.is_featured]
                                hx-post="/htmx/product-form/validate";
                            label for="featured" { h5 ."d-flex-grow-1 margin-0" { "Add to Featured" } }
                        }
                        div ."product-form-field" {
                            input type="checkbox" name="is_recommended" id="recommended" checked[values.is_recommended]
                                hx-post="/htmx/product-form/validate";
                            label for="recommended" { h5 ."d-flex-grow-1 margin-0" { "Add to Recommended" } }
                        }
                    }
                }

                div ."product-form-field product-form-submit" {
                    button .button type="submit" {
                        span ."when-idle" { "Save Product" }
                        span ."htmx-indicator" { "Saving Product" }
                    }
                }
            }

            (render_image_section(view.session_id, view.files))
        }
    }
}

fn render_sizes_editor(values: &ProductFormValues, errors: &FormErrors) -> Markup {
    html! {
        div #sizes-editor ."product-form-field" {
            span ."d-block padding-s" { "* Sizes and Prices" }
            @for (index, row) in values.sizes_with_prices.iter().enumerate() {
                @let size_path = format!("sizes_with_prices[{}].size", index);
                @let price_path = format!("sizes_with_prices[{}].price", index);
                div ."d-flex size-row" data-row-id=(row.row_id.to_string()) {
                    input type="hidden" name="size_row_id" value=(row.row_id.to_string());
                    div ."product-form-field" {
                        label { "Size" }
                        input type="text" name="size" value=[row.size.as_deref()]
                            hx-post="/htmx/product-form/validate";
                        (field_error(errors, &size_path))
                    }
                    div ."product-form-field" {
                        label { "Price" }
                        input type="number" step="any" name="size_price" value=(number_value(row.price))
                            hx-post="/htmx/product-form/validate";
                        (field_error(errors, &price_path))
                    }
                    button type="button"
                        hx-post=(format!("/htmx/product-form/sizes/remove/{}", index)) {
                        "Remove"
                    }
                }
            }
            (field_error(errors, "sizes_with_prices"))
            button type="button" ."link-button"
                hx-post="/htmx/product-form/sizes/add" {
                "+Add Size and Price"
            }
        }
    }
}

fn render_keywords_editor(
    values: &ProductFormValues,
    errors: &FormErrors,
    new_keyword: Option<&str>,
) -> Markup {
    html! {
        div #keywords-editor ."product-form-field" {
            span ."d-block padding-s" { "* Keywords" }
            ul ."keyword-list" {
                @for (index, keyword) in values.keywords.iter().enumerate() {
                    li ."keyword-chip" data-row-id=(keyword.row_id.to_string()) {
                        input type="hidden" name="keyword_row_id" value=(keyword.row_id.to_string());
                        input type="hidden" name="keyword" value=(keyword.value);
                        (keyword.value)
                        button type="button" title="Remove keyword"
                            hx-post=(format!("/htmx/product-form/keywords/remove/{}", index)) {
                            "×"
                        }
                    }
                }
            }
            input type="text" name="new_keyword" placeholder="Create/Select Keywords" value=[new_keyword];
            button type="button" hx-post="/htmx/product-form/keywords/add" { "Add" }
            (field_error(errors, "keywords"))
        }
    }
}

/// Sekcja obrazków leży poza formularzem, żeby wybór pliku nie
/// uruchamiał walidacji pól.
pub fn render_image_section(session_id: Uuid, files: &FileSession) -> Markup {
    let upload_url = |slot: ImageSlot| format!("/htmx/product-form/{}/files/{}", session_id, slot);
    let remove_url = |slot: ImageSlot, image_id: &str| {
        format!("/htmx/product-form/{}/files/{}/{}", session_id, slot, image_id)
    };

    html! {
        div #product-form-images {
            div ."product-form-file" {
                div ."product-form-field" {
                    span ."d-block padding-s" { "* Thumbnail" }
                    form ."file-picker" hx-encoding="multipart/form-data"
                        hx-post=(upload_url(ImageSlot::Image))
                        hx-trigger="change"
                        hx-target="#product-form-images"
                        hx-swap="outerHTML" {
                        label for="product-input-file" {
                            input type="file" name="files" id="product-input-file" accept="image/*" hidden;
                            "Choose Image"
                        }
                    }
                }
                div ."product-form-image-wrapper" {
                    @if let Some(src) = files.thumbnail_preview() {
                        (image_loader(src, "", "product-form-image-preview"))
                    }
                    @if let Some(image) = &files.image {
                        button type="button" ."product-form-delete-image" title="Delete Image"
                            hx-delete=(remove_url(ImageSlot::Image, &image.id))
                            hx-target="#product-form-images"
                            hx-swap="outerHTML" {
                            "×"
                        }
                    }
                }
            }

            div ."product-form-field" {
                span ."d-block padding-s" { "Image Collection" }
                form ."file-picker" hx-encoding="multipart/form-data"
                    hx-post=(upload_url(ImageSlot::ImageCollection))
                    hx-trigger="change"
                    hx-target="#product-form-images"
                    hx-swap="outerHTML" {
                    label for="product-input-file-collection" {
                        input type="file" name="files" id="product-input-file-collection" accept="image/*" multiple hidden;
                        "Choose Images"
                    }
                }
            }
            div ."product-form-collection" {
                @for image in &files.image_collection {
                    div ."product-form-collection-image" data-image-id=(image.id) {
                        (image_loader(&image.url, "", ""))
                        button type="button" ."product-form-delete-image" title="Delete Image"
                            hx-delete=(remove_url(ImageSlot::ImageCollection, &image.id))
                            hx-target="#product-form-images"
                            hx-swap="outerHTML" {
                            "×"
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageFile;

    fn render(values: &ProductFormValues, errors: &FormErrors, files: &FileSession) -> String {
        let view = FormView {
            values,
            errors,
            touched: &[],
            files,
            session_id: Uuid::nil(),
            product_id: None,
            new_keyword: None,
        };
        render_product_form(&view).into_string()
    }

    #[test]
    fn renders_one_row_per_size_with_stable_ids() {
        let mut values = ProductFormValues::initial(None);
        values.add_size_row();
        let html = render(&values, &FormErrors::default(), &FileSession::default());

        assert_eq!(html.matches("name=\"size_row_id\"").count(), 2);
        for row in &values.sizes_with_prices {
            assert!(html.contains(&row.row_id.to_string()));
        }
        assert!(html.contains("/htmx/product-form/sizes/remove/1"));
    }

    #[test]
    fn renders_inline_errors() {
        let values = ProductFormValues::initial(None);
        let mut errors = FormErrors::default();
        errors.push("name", "Product name is required.");
        let html = render(&values, &errors, &FileSession::default());

        assert!(html.contains("Product name is required."));
    }

    #[test]
    fn preview_falls_back_to_existing_image_and_placeholder() {
        let files = FileSession {
            existing_image: Some("https://cdn.example.com/shirt.jpg".into()),
            image: None,
            image_collection: vec![ImageFile {
                id: "g1".into(),
                url: "https://cdn.example.com/g1.jpg".into(),
                file: None,
            }],
        };
        let html = render_image_section(Uuid::nil(), &files).into_string();

        assert!(html.contains("https://cdn.example.com/shirt.jpg"));
        assert!(html.contains(PLACEHOLDER_IMAGE));
        assert!(html.contains("/files/imageCollection/g1"));
    }
}
