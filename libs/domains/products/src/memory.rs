use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::Product;
use crate::query::{ProductFilter, ProductQuery};
use crate::repository::ProductRepository;

/// In-memory repository for tests and local runs without MongoDB.
///
/// Applies the same filter, ordering and code uniqueness as the MongoDB
/// binding.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }
}

fn code_taken(products: &HashMap<Uuid, Product>, code: &str, except: Uuid) -> bool {
    products.values().any(|p| p.id != except && p.code == code)
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: Product) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        if code_taken(&products, &product.code, product.id) {
            return Err(ProductError::DuplicateCode(product.code));
        }

        products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn list(&self, query: &ProductQuery) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;

        let mut result: Vec<Product> = products
            .values()
            .filter(|p| query.filter().matches(p))
            .cloned()
            .collect();

        let sort = query.sort();
        result.sort_by(|a, b| sort.compare(a, b));

        let skip = usize::try_from(query.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);
        Ok(result.into_iter().skip(skip).take(limit).collect())
    }

    async fn count(&self, filter: &ProductFilter) -> ProductResult<u64> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn update(&self, product: Product) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        if !products.contains_key(&product.id) {
            return Err(ProductError::NotFound(product.id));
        }
        if code_taken(&products, &product.code, product.id) {
            return Err(ProductError::DuplicateCode(product.code));
        }

        products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Updated product");
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        let removed = products.remove(&id).is_some();
        if removed {
            tracing::info!(product_id = %id, "Deleted product");
        }
        Ok(removed)
    }
}
