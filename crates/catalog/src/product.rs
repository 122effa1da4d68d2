use chrono::{DateTime, Utc};

use vault_core::{DomainError, DomainResult, Entity, ProductId};

use crate::fields::ProductForm;
use crate::photo::PhotoUpload;
use crate::slug::Slugifier;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Stored product photo: raw bytes + content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPhoto {
    pub data: Vec<u8>,
    pub content_type: String,
}

impl ProductPhoto {
    pub fn from_upload(upload: PhotoUpload) -> Self {
        let content_type = upload
            .content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
        Self {
            data: upload.data,
            content_type,
        }
    }
}

/// Typed product attributes parsed from a validated [`ProductForm`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub quantity: u32,
    pub shipping: bool,
}

impl ProductDraft {
    /// Parse form text into typed attributes.
    ///
    /// Presence is the field validator's job; this only rejects values that
    /// cannot be stored (non-numeric or negative price/quantity, unknown
    /// boolean spellings).
    pub fn from_form(form: &ProductForm) -> DomainResult<Self> {
        let name = required_text(&form.name, "name")?;
        let description = required_text(&form.description, "description")?;
        let category = required_text(&form.category, "category")?;
        let price = parse_price(required_text(&form.price, "price")?.as_str())?;
        let quantity = parse_quantity(required_text(&form.quantity, "quantity")?.as_str())?;
        let shipping = match form.shipping.as_deref() {
            None => false,
            Some(raw) => parse_flag(raw)?,
        };

        Ok(Self {
            name,
            description,
            price,
            category,
            quantity,
            shipping,
        })
    }
}

fn required_text(value: &Option<String>, field: &str) -> DomainResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(DomainError::validation(format!("{field} is missing"))),
    }
}

fn parse_price(raw: &str) -> DomainResult<f64> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| DomainError::validation(format!("price '{raw}' is not a number")))?;
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation(format!(
            "price must be a non-negative number (got {raw})"
        )));
    }
    Ok(price)
}

fn parse_quantity(raw: &str) -> DomainResult<u32> {
    raw.trim().parse().map_err(|_| {
        DomainError::validation(format!(
            "quantity must be a non-negative integer (got {raw})"
        ))
    })
}

fn parse_flag(raw: &str) -> DomainResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" => Ok(false),
        "true" | "1" | "yes" => Ok(true),
        _ => Err(DomainError::validation(format!(
            "shipping must be a boolean (got {raw})"
        ))),
    }
}

/// Every stored attribute of a product, used to rebuild one from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductParts {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub quantity: u32,
    pub shipping: bool,
    pub photo: Option<ProductPhoto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog entry.
///
/// The slug has no setter: it is recomputed from the name by every
/// constructor and every update.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    name: String,
    slug: String,
    description: String,
    price: f64,
    category: String,
    quantity: u32,
    shipping: bool,
    photo: Option<ProductPhoto>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        id: ProductId,
        draft: ProductDraft,
        slugifier: &dyn Slugifier,
        photo: Option<ProductPhoto>,
        now: DateTime<Utc>,
    ) -> Self {
        let slug = slugifier.slugify(&draft.name);
        Self {
            id,
            name: draft.name,
            slug,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            quantity: draft.quantity,
            shipping: draft.shipping,
            photo,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a product read back from storage. The stored slug is trusted.
    pub fn restore(parts: ProductParts) -> Self {
        Self {
            id: parts.id,
            name: parts.name,
            slug: parts.slug,
            description: parts.description,
            price: parts.price,
            category: parts.category,
            quantity: parts.quantity,
            shipping: parts.shipping,
            photo: parts.photo,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        }
    }

    /// Replace all attributes in place, keeping identity and creation time.
    ///
    /// `photo: None` keeps the stored photo.
    pub fn apply_update(
        &mut self,
        draft: ProductDraft,
        slugifier: &dyn Slugifier,
        photo: Option<ProductPhoto>,
        now: DateTime<Utc>,
    ) {
        self.slug = slugifier.slugify(&draft.name);
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
        self.category = draft.category;
        self.quantity = draft.quantity;
        self.shipping = draft.shipping;
        if photo.is_some() {
            self.photo = photo;
        }
        self.updated_at = now;
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn shipping(&self) -> bool {
        self.shipping
    }

    pub fn photo(&self) -> Option<&ProductPhoto> {
        self.photo.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Copy without photo bytes (listing responses).
    pub fn without_photo(&self) -> Self {
        Self {
            photo: None,
            ..self.clone()
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
