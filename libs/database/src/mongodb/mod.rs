//! MongoDB connection management
//!
//! [`MongoHandle`] is what applications hold on to. The free functions are the
//! building blocks it uses and stay public for tools and tests.

mod config;
mod connector;
mod handle;
mod health;

pub use config::MongoConfig;
pub use connector::{client_from_config, connect_from_config, connect_from_config_with_retry};
pub use handle::MongoHandle;
pub use health::{HealthStatus, check_health, check_health_detailed, ping};

pub use mongodb::{Client, Collection, Database};
