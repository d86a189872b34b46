//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::{FindOptions, IndexOptions},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult, is_duplicate_key};
use crate::models::Product;
use crate::query::{ProductFilter, ProductQuery, ProductSort, SortOrder};
use crate::repository::ProductRepository;

pub const COLLECTION_NAME: &str = "products";

pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION_NAME)
    }

    /// Repository over a differently named collection (used by tests)
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Product>(collection_name);
        Self { collection }
    }

    /// Create the unique `code` index and the listing indexes.
    ///
    /// Idempotent; safe to call on every startup.
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "code": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_code_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "manufacturer": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_manufacturer".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "manufacturer": 1, "code": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_manufacturer_code".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = %self.collection.name(), "Product indexes created successfully");
        Ok(())
    }

    pub fn collection(&self) -> &Collection<Product> {
        &self.collection
    }

    /// Translate a listing filter into a query document.
    ///
    /// The search text is escaped so it matches literally.
    pub fn filter_document(filter: &ProductFilter) -> Document {
        let mut doc = doc! {};

        if let Some(search) = filter.search() {
            let pattern = regex::escape(search);
            doc.insert(
                "$or",
                vec![
                    doc! { "name": { "$regex": pattern.as_str(), "$options": "i" } },
                    doc! { "code": { "$regex": pattern.as_str(), "$options": "i" } },
                    doc! { "manufacturer": { "$regex": pattern.as_str(), "$options": "i" } },
                ],
            );
        }

        if let Some(manufacturer) = filter.manufacturer() {
            doc.insert("manufacturer", manufacturer);
        }

        doc
    }

    /// Sort document: the chosen field, then `_id` ascending.
    pub fn sort_document(sort: &ProductSort) -> Document {
        let direction = match sort.order {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        };
        let mut doc = doc! {};
        doc.insert(sort.field.field_name(), direction);
        doc.insert("_id", 1);
        doc
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(product_id = %product.id, code = %product.code))]
    async fn create(&self, product: Product) -> ProductResult<Product> {
        if let Err(err) = self.collection.insert_one(&product).await {
            if is_duplicate_key(&err) {
                return Err(ProductError::DuplicateCode(product.code));
            }
            return Err(err.into());
        }

        tracing::info!("Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one(Self::id_filter(id)).await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &ProductQuery) -> ProductResult<Vec<Product>> {
        let options = FindOptions::builder()
            .sort(Self::sort_document(&query.sort()))
            .skip(query.skip())
            .limit(i64::try_from(query.limit()).unwrap_or(i64::MAX))
            .build();

        let cursor = self
            .collection
            .find(Self::filter_document(query.filter()))
            .with_options(options)
            .await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: &ProductFilter) -> ProductResult<u64> {
        let count = self
            .collection
            .count_documents(Self::filter_document(filter))
            .await?;
        Ok(count)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id, code = %product.code))]
    async fn update(&self, product: Product) -> ProductResult<Product> {
        let result = match self
            .collection
            .replace_one(Self::id_filter(product.id), &product)
            .await
        {
            Ok(result) => result,
            Err(err) if is_duplicate_key(&err) => {
                return Err(ProductError::DuplicateCode(product.code));
            }
            Err(err) => return Err(err.into()),
        };

        if result.matched_count == 0 {
            return Err(ProductError::NotFound(product.id));
        }

        tracing::info!("Product updated successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)).await?;

        let deleted = result.deleted_count > 0;
        if deleted {
            tracing::info!("Product deleted successfully");
        }
        Ok(deleted)
    }
}
