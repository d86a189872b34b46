//! Products Domain
//!
//! Inventory product records stored in MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, multipart/JSON forms, image upload
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, timestamps, derived availableStock
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Store trait + MongoDB and in-memory implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Product document, response view, listing query
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{
//!     handlers,
//!     mongodb::MongoProductRepository,
//!     service::ProductService,
//!     uploads::ImageStorage,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("inventory");
//!
//! let repository = MongoProductRepository::new(&db);
//! repository.init_indexes().await?;
//! let service = ProductService::new(repository);
//!
//! let router = handlers::router(service, ImageStorage::new("uploads"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod query;
pub mod repository;
pub mod service;
pub mod uploads;
pub mod validation;

pub use error::{ProductError, ProductResult};
pub use handlers::{ApiDoc, ProductForm, ProductsState};
pub use memory::InMemoryProductRepository;
pub use models::{Product, ProductPage, ProductResponse, available_stock};
pub use mongodb::MongoProductRepository;
pub use query::{ListProductsParams, ProductFilter, ProductQuery, ProductSort, SortField, SortOrder};
pub use repository::ProductRepository;
pub use service::ProductService;
pub use uploads::ImageStorage;
pub use validation::{CountInput, ProductFields, ProductInput, validate_new, validate_update};
