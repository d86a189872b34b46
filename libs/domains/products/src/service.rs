//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductPage, ProductResponse, now};
use crate::query::ProductQuery;
use crate::repository::ProductRepository;
use crate::validation::{ProductInput, validate_new, validate_update};

/// Product operations on top of a [`ProductRepository`].
///
/// Validates input, stamps identifiers and timestamps, and attaches the
/// derived `availableStock` to every record it returns.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input), fields(code = ?input.code))]
    pub async fn create_product(&self, input: ProductInput) -> ProductResult<ProductResponse> {
        let fields = validate_new(input)?;
        let product = self.repository.create(Product::new(fields, now())).await?;
        Ok(product.into())
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<ProductResponse> {
        self.find(id).await.map(ProductResponse::from)
    }

    /// One page of products plus the filtered total.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: ProductQuery) -> ProductResult<ProductPage> {
        let (products, total) = tokio::try_join!(
            self.repository.list(&query),
            self.repository.count(query.filter())
        )?;

        Ok(ProductPage {
            products: products.into_iter().map(ProductResponse::from).collect(),
            total,
            page: query.page(),
            total_pages: query.total_pages(total),
        })
    }

    /// Merge `input` into the stored record, validate and replace it.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: ProductInput,
    ) -> ProductResult<ProductResponse> {
        let mut product = self.find(id).await?;
        let fields = validate_update(&product, input)?;
        product.apply(fields, now());

        let product = self.repository.update(product).await?;
        Ok(product.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound(id));
        }
        Ok(())
    }

    async fn find(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockProductRepository;
    use crate::validation::{CountInput, ProductFields};

    fn stored(stock: i64, bad_stock: i64) -> Product {
        Product::new(
            ProductFields {
                name: Some("Widget".to_string()),
                code: "WID-1".to_string(),
                size: "M".to_string(),
                manufacturer: "Acme".to_string(),
                stock,
                bad_stock,
                bookings: 0,
                image_url: None,
                description: None,
            },
            now(),
        )
    }

    fn input(code: &str, stock: i64, bad_stock: i64) -> ProductInput {
        ProductInput {
            code: Some(code.to_string()),
            size: Some("M".to_string()),
            manufacturer: Some("Acme".to_string()),
            stock: Some(CountInput::from(stock)),
            bad_stock: Some(CountInput::from(bad_stock)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_returns_derived_stock() {
        let mut repo = MockProductRepository::new();
        repo.expect_create().times(1).returning(Ok);

        let service = ProductService::new(repo);
        let created = service.create_product(input("A-1", 10, 4)).await.unwrap();

        assert_eq!(created.code, "A-1");
        assert_eq!(created.available_stock, 6);
        assert_eq!(created.created_at, created.updated_at);
    }

    #[tokio::test]
    async fn test_create_invalid_never_reaches_store() {
        let mut repo = MockProductRepository::new();
        repo.expect_create().never();

        let service = ProductService::new(repo);
        let result = service.create_product(input("A-1", 1, 2)).await;

        assert!(matches!(result, Err(ProductError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_propagates_duplicate_code() {
        let mut repo = MockProductRepository::new();
        repo.expect_create()
            .returning(|p| Err(ProductError::DuplicateCode(p.code)));

        let service = ProductService::new(repo);
        let result = service.create_product(input("A-1", 1, 0)).await;

        assert!(matches!(result, Err(ProductError::DuplicateCode(code)) if code == "A-1"));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let service = ProductService::new(repo);
        let id = Uuid::now_v7();
        let result = service.get_product(id).await;

        assert!(matches!(result, Err(ProductError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_update_checks_merged_record() {
        let existing = stored(10, 5);
        let id = existing.id;

        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_update().never();

        let service = ProductService::new(repo);
        let result = service
            .update_product(
                id,
                ProductInput {
                    stock: Some(CountInput::from(3)),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(ProductError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_identity_and_refreshes_timestamp() {
        let existing = stored(10, 0);
        let id = existing.id;
        let created_at = existing.created_at;

        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_update().times(1).returning(Ok);

        let service = ProductService::new(repo);
        let updated = service
            .update_product(
                id,
                ProductInput {
                    bookings: Some(CountInput::from(4)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(updated.created_at, created_at);
        assert!(updated.updated_at >= created_at);
        assert_eq!(updated.available_stock, 6);
        assert_eq!(updated.name.as_deref(), Some("Widget"));
    }

    #[tokio::test]
    async fn test_list_builds_page() {
        let mut repo = MockProductRepository::new();
        repo.expect_list()
            .returning(|_| Ok(vec![stored(1, 0), stored(2, 0)]));
        repo.expect_count().returning(|_| Ok(12));

        let service = ProductService::new(repo);
        let page = service.list_products(ProductQuery::default()).await.unwrap();

        assert_eq!(page.products.len(), 2);
        assert_eq!(page.total, 12);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_list_store_unavailable() {
        let mut repo = MockProductRepository::new();
        repo.expect_list()
            .returning(|_| Err(ProductError::StoreUnavailable("no primary".into())));
        repo.expect_count().returning(|_| Ok(0));

        let service = ProductService::new(repo);
        let result = service.list_products(ProductQuery::default()).await;

        assert!(matches!(result, Err(ProductError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut repo = MockProductRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let service = ProductService::new(repo);
        let result = service.delete_product(Uuid::now_v7()).await;

        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }
}
