//! Request/response DTOs and JSON mapping helpers.

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use vault_catalog::{PhotoUpload, Product, ProductForm};
use vault_orders::CartLineItem;

/// Multipart part carrying the photo file.
pub const PHOTO_FIELD: &str = "photo";

/// Product as rendered to clients.
///
/// Photo bytes are base64 encoded and only present when the product was
/// loaded with its photo.
pub fn product_to_json(product: &Product) -> JsonValue {
    let mut body = json!({
        "_id": product.id_typed().to_string(),
        "name": product.name(),
        "slug": product.slug(),
        "description": product.description(),
        "price": product.price(),
        "category": product.category(),
        "quantity": product.quantity(),
        "shipping": product.shipping(),
        "createdAt": product.created_at(),
        "updatedAt": product.updated_at(),
    });
    if let Some(photo) = product.photo() {
        body["photo"] = json!({
            "data": BASE64.encode(&photo.data),
            "contentType": photo.content_type,
        });
    }
    body
}

/// Text fields and the optional photo of a product form.
#[derive(Debug, Default)]
pub struct ProductSubmission {
    pub form: ProductForm,
    pub photo: Option<PhotoUpload>,
}

/// Drain a multipart body into a [`ProductSubmission`].
///
/// Unknown text parts are ignored. An empty file part (a form submitted
/// with no file chosen) counts as no photo.
pub async fn read_product_submission(
    mut multipart: Multipart,
) -> Result<ProductSubmission, MultipartError> {
    let mut submission = ProductSubmission::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == PHOTO_FIELD {
            let unnamed = field.file_name().unwrap_or_default().is_empty();
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await?.to_vec();
            if data.is_empty() && unnamed {
                continue;
            }
            submission.photo = Some(PhotoUpload::new(data, content_type));
            continue;
        }

        let value = field.text().await?;
        if !submission.form.set(&name, value) {
            tracing::debug!(field = %name, "ignoring unknown product form field");
        }
    }

    Ok(submission)
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub nonce: String,
    #[serde(default)]
    pub cart: Vec<CartLineItem>,
}
