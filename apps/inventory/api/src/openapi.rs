use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Inventory API",
        version = "0.1.0",
        description = "Inventory product catalogue with stock, bad stock and bookings"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/products", api = domain_products::ApiDoc)
    )
)]
pub struct ApiDoc;
