use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::Product;
use crate::query::{ProductFilter, ProductQuery};

/// Persistent store for product records.
///
/// Implementations enforce code uniqueness and report a clash as
/// [`crate::ProductError::DuplicateCode`]. Records are already validated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new record
    async fn create(&self, product: Product) -> ProductResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// One page of matching records, in query order
    async fn list(&self, query: &ProductQuery) -> ProductResult<Vec<Product>>;

    /// Matching records, ignoring pagination
    async fn count(&self, filter: &ProductFilter) -> ProductResult<u64>;

    /// Replace the whole record; `NotFound` if it no longer exists
    async fn update(&self, product: Product) -> ProductResult<Product>;

    /// Returns whether a record was removed
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;
}
