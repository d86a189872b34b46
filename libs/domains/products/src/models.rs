use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validation::ProductFields;

/// Product document as stored in the `products` collection.
///
/// Timestamps are BSON dates so `createdAt` sorts chronologically. The
/// derived `availableStock` is never stored; see [`ProductResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub code: String,
    pub size: String,
    pub manufacturer: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub bad_stock: i64,
    #[serde(default)]
    pub bookings: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// New record with a time-ordered id; both timestamps set to `now`.
    pub fn new(fields: ProductFields, now: DateTime<Utc>) -> Self {
        let ProductFields {
            name,
            code,
            size,
            manufacturer,
            stock,
            bad_stock,
            bookings,
            image_url,
            description,
        } = fields;

        Self {
            id: Uuid::now_v7(),
            name,
            code,
            size,
            manufacturer,
            stock,
            bad_stock,
            bookings,
            image_url,
            description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every mutable field; id and `created_at` are kept.
    pub fn apply(&mut self, fields: ProductFields, now: DateTime<Utc>) {
        self.name = fields.name;
        self.code = fields.code;
        self.size = fields.size;
        self.manufacturer = fields.manufacturer;
        self.stock = fields.stock;
        self.bad_stock = fields.bad_stock;
        self.bookings = fields.bookings;
        self.image_url = fields.image_url;
        self.description = fields.description;
        self.updated_at = now;
    }

    pub fn available_stock(&self) -> i64 {
        available_stock(self.stock, self.bad_stock, self.bookings)
    }
}

/// Units that can still be sold or booked.
///
/// Negative only when stored data breaks the stock invariants.
pub fn available_stock(stock: i64, bad_stock: i64, bookings: i64) -> i64 {
    stock.saturating_sub(bad_stock).saturating_sub(bookings)
}

/// Current time at the precision the store keeps (milliseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Product as returned by the API, including `availableStock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub code: String,
    pub size: String,
    pub manufacturer: String,
    pub stock: i64,
    pub bad_stock: i64,
    pub bookings: i64,
    /// stock - badStock - bookings
    pub available_stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        let available_stock = product.available_stock();
        if available_stock < 0 {
            tracing::warn!(
                product_id = %product.id,
                code = %product.code,
                stock = product.stock,
                bad_stock = product.bad_stock,
                bookings = product.bookings,
                available_stock,
                "Product has negative available stock"
            );
        }

        Self {
            id: product.id,
            name: product.name,
            code: product.code,
            size: product.size,
            manufacturer: product.manufacturer,
            stock: product.stock,
            bad_stock: product.bad_stock,
            bookings: product.bookings,
            available_stock,
            image_url: product.image_url,
            description: product.description,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<ProductResponse>,
    /// Matching products, ignoring pagination
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}
