//! Product create / update / remove pipeline and the catalog reads.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use vault_catalog::{
    DefaultSlugifier, FieldValidator, PhotoConstraintChecker, PhotoPolicy, PhotoUpload, Product,
    ProductDraft, ProductForm, ProductPhoto, Slugifier, ValidationError,
};
use vault_core::{DomainError, ProductId};

use crate::store::{ProductStore, StoreError};

/// Listing cap.
pub const LIST_LIMIT: usize = 12;

#[derive(Debug, Error)]
pub enum ProductMutationError {
    /// Missing field or rejected photo; rendered as `{error: <message>}`.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unparseable values or a missing/malformed id.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProductMutationError {
    pub fn kind(&self) -> &'static str {
        match self {
            ProductMutationError::Validation(_) => "validation",
            ProductMutationError::Domain(DomainError::InvalidId(_)) => "invalid_id",
            ProductMutationError::Domain(DomainError::NotFound)
            | ProductMutationError::Store(StoreError::NotFound) => "not_found",
            ProductMutationError::Store(StoreError::Conflict(_)) => "conflict",
            ProductMutationError::Domain(DomainError::Validation(_)) => "invalid_value",
            ProductMutationError::Store(_) => "store",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ProductMutationError::Validation(_))
    }
}

pub struct ProductMutationService {
    store: Arc<dyn ProductStore>,
    validator: FieldValidator,
    photos: PhotoConstraintChecker,
    slugifier: Arc<dyn Slugifier>,
}

impl core::fmt::Debug for ProductMutationService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProductMutationService")
            .field("photo_policy", &self.photos.policy())
            .finish_non_exhaustive()
    }
}

impl ProductMutationService {
    pub fn new(store: Arc<dyn ProductStore>, photo_policy: PhotoPolicy) -> Self {
        Self::with_slugifier(store, photo_policy, Arc::new(DefaultSlugifier))
    }

    pub fn with_slugifier(
        store: Arc<dyn ProductStore>,
        photo_policy: PhotoPolicy,
        slugifier: Arc<dyn Slugifier>,
    ) -> Self {
        Self {
            store,
            validator: FieldValidator::new(),
            photos: PhotoConstraintChecker::new(photo_policy),
            slugifier,
        }
    }

    fn check_input(
        &self,
        form: &ProductForm,
        photo: Option<&PhotoUpload>,
    ) -> Result<(), ProductMutationError> {
        self.validator.validate(form)?;
        self.photos.check(photo)?;
        Ok(())
    }

    #[instrument(skip(self, form, photo), fields(name = form.name.as_deref().unwrap_or_default()))]
    pub async fn create(
        &self,
        form: &ProductForm,
        photo: Option<PhotoUpload>,
    ) -> Result<Product, ProductMutationError> {
        let result = self.try_create(form, photo).await;
        log_outcome("create", &result);
        result
    }

    async fn try_create(
        &self,
        form: &ProductForm,
        photo: Option<PhotoUpload>,
    ) -> Result<Product, ProductMutationError> {
        self.check_input(form, photo.as_ref())?;
        let draft = ProductDraft::from_form(form)?;
        let product = Product::new(
            ProductId::new(),
            draft,
            self.slugifier.as_ref(),
            photo.map(ProductPhoto::from_upload),
            Utc::now(),
        );
        Ok(self.store.insert(product).await?)
    }

    /// Fields are validated before the id is even looked at.
    #[instrument(skip(self, form, photo))]
    pub async fn update(
        &self,
        id: &str,
        form: &ProductForm,
        photo: Option<PhotoUpload>,
    ) -> Result<Product, ProductMutationError> {
        let result = self.try_update(id, form, photo).await;
        log_outcome("update", &result);
        result
    }

    async fn try_update(
        &self,
        id: &str,
        form: &ProductForm,
        photo: Option<PhotoUpload>,
    ) -> Result<Product, ProductMutationError> {
        self.check_input(form, photo.as_ref())?;
        let id: ProductId = id.parse()?;
        let draft = ProductDraft::from_form(form)?;

        let mut product = self.store.get(id).await?.ok_or(StoreError::NotFound)?;
        product.apply_update(
            draft,
            self.slugifier.as_ref(),
            photo.map(ProductPhoto::from_upload),
            Utc::now(),
        );
        Ok(self.store.update(product).await?)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> Result<(), ProductMutationError> {
        let result = self.try_remove(id).await;
        log_outcome("remove", &result);
        result
    }

    async fn try_remove(&self, id: &str) -> Result<(), ProductMutationError> {
        let id: ProductId = id.parse()?;
        self.store.delete(id).await?;
        Ok(())
    }

    /// Newest products first, capped at [`LIST_LIMIT`], without photo bytes.
    pub async fn list(&self) -> Result<Vec<Product>, ProductMutationError> {
        let result: Result<Vec<Product>, ProductMutationError> =
            self.store.list(LIST_LIMIT).await.map_err(Into::into);
        log_outcome("list", &result);
        result
    }

    /// Full product by slug, without photo bytes.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Product, ProductMutationError> {
        let result: Result<Product, ProductMutationError> = match self.store.get_by_slug(slug).await {
            Ok(Some(product)) => Ok(product.without_photo()),
            Ok(None) => Err(StoreError::NotFound.into()),
            Err(e) => Err(e.into()),
        };
        log_outcome("find_by_slug", &result);
        result
    }

    pub async fn photo(&self, id: &str) -> Result<ProductPhoto, ProductMutationError> {
        let result = self.try_photo(id).await;
        log_outcome("photo", &result);
        result
    }

    async fn try_photo(&self, id: &str) -> Result<ProductPhoto, ProductMutationError> {
        let id: ProductId = id.parse()?;
        let product = self.store.get(id).await?.ok_or(StoreError::NotFound)?;
        product
            .photo()
            .cloned()
            .ok_or(ProductMutationError::Domain(DomainError::NotFound))
    }
}

fn log_outcome<T>(operation: &'static str, result: &Result<T, ProductMutationError>) {
    match result {
        Ok(_) => tracing::debug!(operation, "product operation succeeded"),
        Err(e) if e.is_validation() => {
            tracing::info!(operation, error = %e, "product input rejected")
        }
        Err(e) => tracing::error!(operation, kind = e.kind(), error = %e, "product operation failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryProductStore;

    fn full_form(name: &str) -> ProductForm {
        ProductForm {
            name: Some(name.to_string()),
            description: Some("A sturdy lamp".to_string()),
            price: Some("19.5".to_string()),
            category: Some("lighting".to_string()),
            quantity: Some("3".to_string()),
            shipping: Some("true".to_string()),
        }
    }

    fn photo_of(size: usize) -> PhotoUpload {
        PhotoUpload::new(vec![0u8; size], Some("image/jpeg".to_string()))
    }

    fn service() -> (ProductMutationService, Arc<InMemoryProductStore>) {
        let store = Arc::new(InMemoryProductStore::new());
        let svc = ProductMutationService::new(store.clone(), PhotoPolicy::Optional);
        (svc, store)
    }

    #[tokio::test]
    async fn create_persists_slugged_product_with_photo() {
        let (svc, store) = service();
        let created = svc
            .create(&full_form("Desk Lamp"), Some(photo_of(10)))
            .await
            .unwrap();

        assert_eq!(created.slug(), "desk-lamp");
        assert_eq!(created.price(), 19.5);
        assert_eq!(created.quantity(), 3);
        assert!(created.shipping());
        let photo = created.photo().unwrap();
        assert_eq!(photo.content_type, "image/jpeg");
        assert_eq!(photo.data.len(), 10);

        let stored = store.get(created.id_typed()).await.unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn create_without_photo_is_allowed_by_default() {
        let (svc, _) = service();
        let created = svc.create(&full_form("Chair"), None).await.unwrap();
        assert!(created.photo().is_none());
    }

    #[tokio::test]
    async fn create_reports_first_missing_field_and_persists_nothing() {
        let (svc, store) = service();
        let mut form = full_form("Chair");
        form.description = None;
        form.quantity = Some(String::new());

        let err = svc.create(&form, None).await.unwrap_err();
        assert!(matches!(
            err,
            ProductMutationError::Validation(ValidationError::MissingDescription)
        ));
        assert!(store.list(LIST_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn field_errors_win_over_photo_errors() {
        let (svc, _) = service();
        let mut form = full_form("Chair");
        form.name = None;
        let err = svc.create(&form, Some(photo_of(1_000_001))).await.unwrap_err();
        assert!(matches!(err, ProductMutationError::Validation(ValidationError::MissingName)));
    }

    #[tokio::test]
    async fn oversized_photo_is_rejected() {
        let (svc, _) = service();
        let err = svc
            .create(&full_form("Chair"), Some(photo_of(1_000_001)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "photo is Required and should be less then 1mb");

        svc.create(&full_form("Chair"), Some(photo_of(1_000_000)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn required_policy_rejects_missing_photo() {
        let store = Arc::new(InMemoryProductStore::new());
        let svc = ProductMutationService::new(store, PhotoPolicy::Required);
        let err = svc.create(&full_form("Chair"), None).await.unwrap_err();
        assert!(matches!(err, ProductMutationError::Validation(ValidationError::Photo)));
    }

    #[tokio::test]
    async fn injected_slugifier_is_used() {
        let store = Arc::new(InMemoryProductStore::new());
        let fixed: Arc<dyn Slugifier> = Arc::new(|_: &str| "fixed-slug".to_string());
        let svc = ProductMutationService::with_slugifier(store, PhotoPolicy::Optional, fixed);
        let created = svc.create(&full_form("Anything"), None).await.unwrap();
        assert_eq!(created.slug(), "fixed-slug");
    }

    #[tokio::test]
    async fn unparseable_price_is_operational_failure() {
        let (svc, _) = service();
        let mut form = full_form("Chair");
        form.price = Some("cheap".to_string());
        let err = svc.create(&form, None).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_value");
    }

    #[tokio::test]
    async fn duplicate_name_conflicts_on_slug() {
        let (svc, _) = service();
        svc.create(&full_form("Chair"), None).await.unwrap();
        let err = svc.create(&full_form("chair"), None).await.unwrap_err();
        assert_eq!(err.kind(), "conflict");
    }

    #[tokio::test]
    async fn update_rewrites_fields_and_keeps_photo() {
        let (svc, _) = service();
        let created = svc
            .create(&full_form("Desk Lamp"), Some(photo_of(4)))
            .await
            .unwrap();

        let mut form = full_form("Floor Lamp");
        form.price = Some("42".to_string());
        let updated = svc
            .update(&created.id_typed().to_string(), &form, None)
            .await
            .unwrap();

        assert_eq!(updated.id_typed(), created.id_typed());
        assert_eq!(updated.slug(), "floor-lamp");
        assert_eq!(updated.price(), 42.0);
        assert_eq!(updated.created_at(), created.created_at());
        assert_eq!(updated.photo().unwrap().data.len(), 4);
    }

    #[tokio::test]
    async fn update_validates_before_looking_at_id() {
        let (svc, _) = service();
        let mut form = full_form("Chair");
        form.category = None;
        let err = svc.update("", &form, None).await.unwrap_err();
        assert!(matches!(err, ProductMutationError::Validation(ValidationError::MissingCategory)));
    }

    #[tokio::test]
    async fn update_with_bad_ids_fails() {
        let (svc, _) = service();
        let form = full_form("Chair");

        let empty = svc.update("", &form, None).await.unwrap_err();
        assert_eq!(empty.kind(), "invalid_id");

        let malformed = svc.update("not-an-id", &form, None).await.unwrap_err();
        assert_eq!(malformed.kind(), "invalid_id");

        let unknown = svc
            .update(&ProductId::new().to_string(), &form, None)
            .await
            .unwrap_err();
        assert_eq!(unknown.kind(), "not_found");
    }

    #[tokio::test]
    async fn remove_deletes_once() {
        let (svc, store) = service();
        let created = svc.create(&full_form("Chair"), None).await.unwrap();
        let id = created.id_typed().to_string();

        svc.remove(&id).await.unwrap();
        assert!(store.get(created.id_typed()).await.unwrap().is_none());

        let again = svc.remove(&id).await.unwrap_err();
        assert_eq!(again.kind(), "not_found");
    }

    #[tokio::test]
    async fn remove_with_empty_or_malformed_id_fails() {
        let (svc, _) = service();
        assert_eq!(svc.remove("").await.unwrap_err().kind(), "invalid_id");
        assert_eq!(svc.remove("123").await.unwrap_err().kind(), "invalid_id");
    }

    #[tokio::test]
    async fn reads_hide_photo_bytes_except_photo_endpoint() {
        let (svc, _) = service();
        let created = svc
            .create(&full_form("Red Mug"), Some(photo_of(7)))
            .await
            .unwrap();

        let listed = svc.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].photo().is_none());

        let single = svc.find_by_slug("red-mug").await.unwrap();
        assert!(single.photo().is_none());
        assert_eq!(svc.find_by_slug("blue-mug").await.unwrap_err().kind(), "not_found");

        let photo = svc.photo(&created.id_typed().to_string()).await.unwrap();
        assert_eq!(photo.data.len(), 7);
    }

    #[tokio::test]
    async fn photo_of_product_without_one_is_not_found() {
        let (svc, _) = service();
        let created = svc.create(&full_form("Chair"), None).await.unwrap();
        let err = svc.photo(&created.id_typed().to_string()).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn listing_is_capped() {
        let (svc, _) = service();
        for i in 0..(LIST_LIMIT + 3) {
            svc.create(&full_form(&format!("Item {i}")), None).await.unwrap();
        }
        assert_eq!(svc.list().await.unwrap().len(), LIST_LIMIT);
    }
}
