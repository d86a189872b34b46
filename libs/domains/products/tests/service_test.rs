//! Product service behavior against the in-memory store.

use domain_products::{
    CountInput, InMemoryProductRepository, ListProductsParams, ProductError, ProductInput,
    ProductQuery, ProductService,
};

fn service() -> ProductService<InMemoryProductRepository> {
    ProductService::new(InMemoryProductRepository::new())
}

fn input(code: &str, manufacturer: &str, stock: i64, bad_stock: i64, bookings: i64) -> ProductInput {
    ProductInput {
        code: Some(code.to_string()),
        size: Some("M".to_string()),
        manufacturer: Some(manufacturer.to_string()),
        stock: Some(CountInput::from(stock)),
        bad_stock: Some(CountInput::from(bad_stock)),
        bookings: Some(CountInput::from(bookings)),
        ..Default::default()
    }
}

fn query(pairs: &[(&str, &str)]) -> ProductQuery {
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
    ProductQuery::from(params)
}

#[tokio::test]
async fn test_create_computes_available_stock() {
    let service = service();

    let product = service
        .create_product(input("A-1", "Acme", 10, 2, 3))
        .await
        .unwrap();

    assert_eq!(product.available_stock, 5);
    assert_eq!(product.created_at, product.updated_at);

    let fetched = service.get_product(product.id).await.unwrap();
    assert_eq!(fetched, product);
}

#[tokio::test]
async fn test_create_rejects_counts_above_stock() {
    let service = service();

    let bad = service.create_product(input("A-1", "Acme", 5, 6, 0)).await;
    assert!(matches!(bad, Err(ProductError::Validation(_))));

    let booked = service.create_product(input("A-2", "Acme", 5, 0, 6)).await;
    assert!(matches!(booked, Err(ProductError::Validation(_))));

    let page = service.list_products(ProductQuery::default()).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_duplicate_code_keeps_single_record() {
    let service = service();
    service
        .create_product(input("DUP", "Acme", 1, 0, 0))
        .await
        .unwrap();

    let second = service.create_product(input("DUP", "Other", 2, 0, 0)).await;
    assert!(matches!(second, Err(ProductError::DuplicateCode(code)) if code == "DUP"));

    let page = service
        .list_products(query(&[("search", "DUP")]))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.products[0].manufacturer, "Acme");
}

#[tokio::test]
async fn test_update_onto_existing_code_conflicts() {
    let service = service();
    service
        .create_product(input("A-1", "Acme", 1, 0, 0))
        .await
        .unwrap();
    let other = service
        .create_product(input("B-1", "Acme", 1, 0, 0))
        .await
        .unwrap();

    let result = service
        .update_product(
            other.id,
            ProductInput {
                code: Some("A-1".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(ProductError::DuplicateCode(_))));
    assert_eq!(service.get_product(other.id).await.unwrap().code, "B-1");
}

#[tokio::test]
async fn test_manufacturer_filter_is_exact() {
    let service = service();
    for (code, manufacturer) in [("A", "Acme"), ("B", "acme"), ("C", "Acme Corp"), ("D", "Acme")] {
        service
            .create_product(input(code, manufacturer, 1, 0, 0))
            .await
            .unwrap();
    }

    let page = service
        .list_products(query(&[("manufacturer", "Acme")]))
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert!(page.products.iter().all(|p| p.manufacturer == "Acme"));
}

#[tokio::test]
async fn test_search_matches_any_text_field() {
    let service = service();
    let mut named = input("N-1", "Acme", 1, 0, 0);
    named.name = Some("ZX Spectrum".to_string());
    service.create_product(named).await.unwrap();
    service
        .create_product(input("zx-2", "Acme", 1, 0, 0))
        .await
        .unwrap();
    service
        .create_product(input("M-3", "Zxtronics", 1, 0, 0))
        .await
        .unwrap();
    service
        .create_product(input("Q-4", "Acme", 1, 0, 0))
        .await
        .unwrap();

    let page = service
        .list_products(query(&[("search", "zx")]))
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert!(page.products.iter().all(|p| p.code != "Q-4"));
}

#[tokio::test]
async fn test_pagination_of_last_page() {
    let service = service();
    for i in 0..25 {
        service
            .create_product(input(&format!("P-{i:02}"), "Acme", 1, 0, 0))
            .await
            .unwrap();
    }

    let page = service
        .list_products(query(&[("limit", "10"), ("page", "3")]))
        .await
        .unwrap();

    assert_eq!(page.products.len(), 5);
    assert_eq!(page.total, 25);
    assert_eq!(page.page, 3);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn test_empty_listing_has_no_pages() {
    let page = service()
        .list_products(ProductQuery::default())
        .await
        .unwrap();

    assert!(page.products.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 0);
}

#[tokio::test]
async fn test_sort_by_stock_descending() {
    let service = service();
    for (code, stock) in [("A", 4), ("B", 9), ("C", 1), ("D", 9), ("E", 0)] {
        service
            .create_product(input(code, "Acme", stock, 0, 0))
            .await
            .unwrap();
    }

    let page = service
        .list_products(query(&[("sortBy", "stock"), ("sortOrder", "desc")]))
        .await
        .unwrap();

    let stocks: Vec<i64> = page.products.iter().map(|p| p.stock).collect();
    assert_eq!(stocks, [9, 9, 4, 1, 0]);
}

#[tokio::test]
async fn test_invalid_update_leaves_record_unchanged() {
    let service = service();
    let product = service
        .create_product(input("A-1", "Acme", 10, 5, 0))
        .await
        .unwrap();

    let result = service
        .update_product(
            product.id,
            ProductInput {
                stock: Some(CountInput::from(3)),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(ProductError::Validation(_))));
    assert_eq!(service.get_product(product.id).await.unwrap(), product);
}

#[tokio::test]
async fn test_update_rejects_bookings_above_stock() {
    let service = service();
    let product = service
        .create_product(input("A-1", "Acme", 10, 0, 8))
        .await
        .unwrap();

    let result = service
        .update_product(
            product.id,
            ProductInput {
                stock: Some(CountInput::from(5)),
                ..Default::default()
            },
        )
        .await;

    match result {
        Err(ProductError::Validation(errors)) => {
            let bookings = &errors.field_errors()["bookings"];
            assert_eq!(
                bookings[0].message.as_deref(),
                Some("Bookings cannot exceed total stock")
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(service.get_product(product.id).await.unwrap(), product);
}

#[tokio::test]
async fn test_huge_page_is_empty() {
    let service = service();
    service
        .create_product(input("A-1", "Acme", 1, 0, 0))
        .await
        .unwrap();

    let page = service
        .list_products(query(&[("page", "1000000000000000000")]))
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert!(page.products.is_empty());
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let service = service();
    let mut created = input("A-1", "Acme", 10, 1, 1);
    created.description = Some("Blue".to_string());
    let product = service.create_product(created).await.unwrap();

    let updated = service
        .update_product(
            product.id,
            ProductInput {
                bookings: Some(CountInput::from(4)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, product.id);
    assert_eq!(updated.description.as_deref(), Some("Blue"));
    assert_eq!(updated.available_stock, 5);
    assert_eq!(updated.created_at, product.created_at);
    assert!(updated.updated_at >= product.updated_at);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let service = service();
    let product = service
        .create_product(input("A-1", "Acme", 1, 0, 0))
        .await
        .unwrap();

    service.delete_product(product.id).await.unwrap();

    let fetched = service.get_product(product.id).await;
    assert!(matches!(fetched, Err(ProductError::NotFound(_))));

    let again = service.delete_product(product.id).await;
    assert!(matches!(again, Err(ProductError::NotFound(_))));
}
