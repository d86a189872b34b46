//! Database connectors for the inventory workspace.
//!
//! Only MongoDB is used today. The connector verifies connectivity at startup,
//! retries with backoff, and hands back a [`mongodb::MongoHandle`] that owns
//! the client plus a readiness flag kept current by a background ping monitor.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB support
//! - `config` - `core_config::FromEnv` for [`mongodb::MongoConfig`]
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, MongoHandle};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "inventory");
//! let handle = MongoHandle::connect_with_retry(&config, None).await?;
//! assert!(handle.is_ready());
//! let products = handle.database().collection::<bson::Document>("products");
//! handle.shutdown().await;
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
