//! Catalog domain module.
//!
//! Business rules for products: required-field validation, photo constraints,
//! slug derivation and the product entity itself. Implemented as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod fields;
pub mod photo;
pub mod product;
pub mod slug;

pub use fields::{FieldValidator, ProductForm, RequiredField, ValidationError};
pub use photo::{MAX_PHOTO_BYTES, PhotoConstraintChecker, PhotoPolicy, PhotoUpload};
pub use product::{Product, ProductDraft, ProductParts, ProductPhoto};
pub use slug::{DefaultSlugifier, Slugifier};
