//! List-request parameters and the typed query built from them.

use serde::Deserialize;
use std::cmp::Ordering;
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::IntoParams;

use crate::models::Product;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

const MAX_SKIP: u64 = i64::MAX as u64;

/// Raw query string of `GET /products`.
///
/// Values stay strings so a bad value falls back to its default instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListProductsParams {
    /// Page number, starting at 1 (default 1)
    pub page: Option<String>,
    /// Page size (default 10)
    pub limit: Option<String>,
    /// Case-insensitive text matched against name, code and manufacturer
    pub search: Option<String>,
    /// Exact manufacturer
    pub manufacturer: Option<String>,
    /// name, code, manufacturer, stock or createdAt (default createdAt)
    pub sort_by: Option<String>,
    /// asc or desc (default desc)
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum SortField {
    Name,
    Code,
    Manufacturer,
    Stock,
    #[default]
    CreatedAt,
}

impl SortField {
    /// Document field this sort applies to.
    pub fn field_name(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Code => "code",
            SortField::Manufacturer => "manufacturer",
            SortField::Stock => "stock",
            SortField::CreatedAt => "createdAt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Which products a listing includes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    search: Option<String>,
    manufacturer: Option<String>,
}

impl ProductFilter {
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    /// Store-independent form of the filter.
    ///
    /// `search` is a case-insensitive literal substring match on name, code
    /// or manufacturer; `manufacturer` must match exactly.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(manufacturer) = &self.manufacturer {
            if product.manufacturer != *manufacturer {
                return false;
            }
        }

        match &self.search {
            None => true,
            Some(search) => {
                let needle = search.to_lowercase();
                let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
                product.name.as_deref().is_some_and(contains)
                    || contains(&product.code)
                    || contains(&product.manufacturer)
            }
        }
    }
}

/// Listing order: the chosen field, then `_id` ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl ProductSort {
    /// Store-independent comparator. Missing names sort before any name.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let by_field = match self.field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Code => a.code.cmp(&b.code),
            SortField::Manufacturer => a.manufacturer.cmp(&b.manufacturer),
            SortField::Stock => a.stock.cmp(&b.stock),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };

        let by_field = match self.order {
            SortOrder::Asc => by_field,
            SortOrder::Desc => by_field.reverse(),
        };

        by_field.then_with(|| a.id.cmp(&b.id))
    }
}

/// A validated listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    filter: ProductFilter,
    sort: ProductSort,
    page: u64,
    limit: u64,
}

impl ProductQuery {
    /// Lenient parse: bad or non-positive page/limit and unknown sort values
    /// fall back to their defaults; blank search/manufacturer mean no filter.
    pub fn from_params(params: ListProductsParams) -> Self {
        Self {
            filter: ProductFilter {
                search: non_blank(params.search),
                manufacturer: non_blank(params.manufacturer),
            },
            sort: ProductSort {
                field: parse_or_default(params.sort_by.as_deref()),
                order: parse_or_default(params.sort_order.as_deref()),
            },
            page: positive_or(params.page.as_deref(), DEFAULT_PAGE),
            limit: positive_or(params.limit.as_deref(), DEFAULT_LIMIT),
        }
    }

    pub fn filter(&self) -> &ProductFilter {
        &self.filter
    }

    pub fn sort(&self) -> ProductSort {
        self.sort
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Records before this page, capped at what the store accepts as an
    /// `i64` offset.
    pub fn skip(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(MAX_SKIP)
    }

    /// Pages needed for `total` records; 0 when nothing matches.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self::from_params(ListProductsParams::default())
    }
}

impl From<ListProductsParams> for ProductQuery {
    fn from(params: ListProductsParams) -> Self {
        Self::from_params(params)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_or_default<T: FromStr + Default>(value: Option<&str>) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_default()
}

fn positive_or(value: Option<&str>, default: u64) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now;
    use crate::validation::ProductFields;

    fn params(pairs: &[(&str, &str)]) -> ListProductsParams {
        let mut params = ListProductsParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => params.page = value,
                "limit" => params.limit = value,
                "search" => params.search = value,
                "manufacturer" => params.manufacturer = value,
                "sortBy" => params.sort_by = value,
                "sortOrder" => params.sort_order = value,
                other => panic!("unknown parameter {other}"),
            }
        }
        params
    }

    fn product(name: Option<&str>, code: &str, manufacturer: &str, stock: i64) -> Product {
        Product::new(
            ProductFields {
                name: name.map(str::to_string),
                code: code.to_string(),
                size: "M".to_string(),
                manufacturer: manufacturer.to_string(),
                stock,
                bad_stock: 0,
                bookings: 0,
                image_url: None,
                description: None,
            },
            now(),
        )
    }

    #[test]
    fn test_defaults() {
        let query = ProductQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
        assert_eq!(query.skip(), 0);
        assert_eq!(query.sort().field, SortField::CreatedAt);
        assert_eq!(query.sort().order, SortOrder::Desc);
        assert_eq!(query.filter(), &ProductFilter::default());
    }

    #[test]
    fn test_parses_valid_params() {
        let query = ProductQuery::from(params(&[
            ("page", "3"),
            ("limit", "25"),
            ("sortBy", "stock"),
            ("sortOrder", "ASC"),
            ("manufacturer", "Acme"),
        ]));

        assert_eq!(query.skip(), 50);
        assert_eq!(query.sort().field, SortField::Stock);
        assert_eq!(query.sort().order, SortOrder::Asc);
        assert_eq!(query.filter().manufacturer(), Some("Acme"));
    }

    #[test]
    fn test_falls_back_on_bad_values() {
        let query = ProductQuery::from(params(&[
            ("page", "0"),
            ("limit", "-5"),
            ("sortBy", "price"),
            ("sortOrder", "sideways"),
            ("search", "  "),
            ("manufacturer", ""),
        ]));

        assert_eq!(query.page(), DEFAULT_PAGE);
        assert_eq!(query.limit(), DEFAULT_LIMIT);
        assert_eq!(query.sort(), ProductSort::default());
        assert_eq!(query.filter().search(), None);
        assert_eq!(query.filter().manufacturer(), None);
    }

    #[test]
    fn test_total_pages() {
        let query = ProductQuery::default();
        assert_eq!(query.total_pages(0), 0);
        assert_eq!(query.total_pages(10), 1);
        assert_eq!(query.total_pages(25), 3);
    }

    #[test]
    fn test_filter_matches_search_case_insensitively() {
        let query = ProductQuery::from(params(&[("search", "zx")]));
        let filter = query.filter();

        assert!(filter.matches(&product(Some("ZX Spectrum"), "A-1", "Sinclair", 1)));
        assert!(filter.matches(&product(None, "b-zx9", "Acme", 1)));
        assert!(filter.matches(&product(None, "C-1", "ZXco", 1)));
        assert!(!filter.matches(&product(Some("Widget"), "D-1", "Acme", 1)));
    }

    #[test]
    fn test_filter_search_is_literal() {
        let query = ProductQuery::from(params(&[("search", "a.c")]));
        assert!(!query.filter().matches(&product(None, "abc", "Acme", 1)));
        assert!(query.filter().matches(&product(None, "xa.cx", "Acme", 1)));
    }

    #[test]
    fn test_filter_manufacturer_exact() {
        let query = ProductQuery::from(params(&[("manufacturer", "Acme")]));
        assert!(query.filter().matches(&product(None, "A", "Acme", 1)));
        assert!(!query.filter().matches(&product(None, "B", "acme", 1)));
        assert!(!query.filter().matches(&product(None, "C", "Acme Corp", 1)));
    }

    #[test]
    fn test_sort_compare_with_tie_break() {
        let sort = ProductSort {
            field: SortField::Stock,
            order: SortOrder::Desc,
        };
        let low = product(None, "A", "Acme", 1);
        let mut high = product(None, "B", "Acme", 9);
        let mut high_later = product(None, "C", "Acme", 9);
        high.id = uuid::Uuid::from_u128(1);
        high_later.id = uuid::Uuid::from_u128(2);

        let mut products = vec![low, high_later, high];
        products.sort_by(|a, b| sort.compare(a, b));

        let codes: Vec<_> = products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, ["B", "C", "A"]);
    }

    #[test]
    fn test_sort_field_names() {
        assert_eq!("createdAt".parse::<SortField>().unwrap(), SortField::CreatedAt);
        assert_eq!(SortField::CreatedAt.to_string(), "createdAt");
        assert_eq!(SortField::Stock.field_name(), "stock");
        assert_eq!("CREATEDAT".parse::<SortField>().unwrap(), SortField::CreatedAt);
        assert_eq!("Stock".parse::<SortField>().unwrap(), SortField::Stock);
        assert!("price".parse::<SortField>().is_err());
    }

    #[test]
    fn test_skip_fits_store_offset_for_huge_page() {
        let query = ProductQuery::from(ListProductsParams {
            page: Some("1000000000000000000".to_string()),
            ..Default::default()
        });
        assert_eq!(query.page(), 1_000_000_000_000_000_000);
        assert_eq!(query.skip(), i64::MAX as u64);

        let query = ProductQuery::from(ListProductsParams {
            page: Some(u64::MAX.to_string()),
            limit: Some(u64::MAX.to_string()),
            ..Default::default()
        });
        assert!(query.skip() <= i64::MAX as u64);
    }
}
