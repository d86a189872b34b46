//! HTTP handlers for Products API

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Query, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, UuidPath,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
    },
};
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{ProductPage, ProductResponse};
use crate::query::{ListProductsParams, ProductQuery};
use crate::repository::ProductRepository;
use crate::service::ProductService;
use crate::uploads::ImageStorage;
use crate::validation::{CountInput, ProductInput};

/// Request bodies up to this size are accepted (images included).
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(ProductResponse, ProductInput, ProductPage),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Inventory product endpoints")
    )
)]
pub struct ApiDoc;

pub struct ProductsState<R: ProductRepository> {
    pub service: ProductService<R>,
    pub images: ImageStorage,
}

impl<R: ProductRepository> Clone for ProductsState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            images: self.images.clone(),
        }
    }
}

/// Products router, to be nested at `/products`.
pub fn router<R: ProductRepository + 'static>(
    service: ProductService<R>,
    images: ImageStorage,
) -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(ProductsState { service, images })
}

/// An uploaded file part.
#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Product fields from either a `multipart/form-data` or a JSON body.
///
/// Multipart text parts map onto the camelCase field names; counts are
/// parsed by the validator so bad numbers show up as violations. An
/// `image` file part is carried separately. Blank count parts are ignored.
#[derive(Debug)]
pub struct ProductForm {
    pub input: ProductInput,
    pub image: Option<ImageUpload>,
}

impl<S: Send + Sync> FromRequest<S> for ProductForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(input) = Json::<ProductInput>::from_request(req, state).await?;
            return Ok(Self { input, image: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let mut input = ProductInput::default();
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    image = Some(ImageUpload { file_name, bytes });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;

            match name.as_str() {
                "name" => input.name = Some(value),
                "code" => input.code = Some(value),
                "size" => input.size = Some(value),
                "manufacturer" => input.manufacturer = Some(value),
                "stock" => input.stock = count_part(value),
                "badStock" => input.bad_stock = count_part(value),
                "bookings" => input.bookings = count_part(value),
                "imageUrl" => input.image_url = Some(value),
                "description" => input.description = Some(value),
                other => tracing::debug!(field = %other, "Ignoring unknown form field"),
            }
        }

        Ok(Self { input, image })
    }
}

fn count_part(value: String) -> Option<CountInput> {
    (!value.trim().is_empty()).then_some(CountInput::Text(value))
}

/// Stores the uploaded image, if any, and points `imageUrl` at it.
async fn store_image(
    images: &ImageStorage,
    input: &mut ProductInput,
    image: Option<ImageUpload>,
) -> ProductResult<Option<String>> {
    let Some(image) = image else {
        return Ok(None);
    };
    let url = images.save(&image.file_name, &image.bytes).await?;
    input.image_url = Some(url.clone());
    Ok(Some(url))
}

/// List products with filtering, sorting and pagination
///
/// Unknown or malformed parameter values fall back to their defaults.
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(ListProductsParams),
    responses(
        (status = 200, description = "One page of products", body = ProductPage),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(state): State<ProductsState<R>>,
    Query(params): Query<ListProductsParams>,
) -> ProductResult<Json<ProductPage>> {
    let page = state.service.list_products(params.into()).await?;
    Ok(Json(page))
}

/// Create a product
///
/// Accepts JSON or `multipart/form-data` with an optional `image` file part.
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(state): State<ProductsState<R>>,
    form: ProductForm,
) -> ProductResult<impl IntoResponse> {
    let ProductForm { mut input, image } = form;
    let stored = store_image(&state.images, &mut input, image).await?;

    match state.service.create_product(input).await {
        Ok(product) => Ok((StatusCode::CREATED, Json(product))),
        Err(e) => {
            if let Some(url) = stored {
                state.images.discard(&url).await;
            }
            Err(e)
        }
    }
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(state): State<ProductsState<R>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<ProductResponse>> {
    let product = state.service.get_product(id).await?;
    Ok(Json(product))
}

/// Update a product
///
/// Only the fields present are changed; the merged record must still pass
/// validation.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(state): State<ProductsState<R>>,
    UuidPath(id): UuidPath,
    form: ProductForm,
) -> ProductResult<Json<ProductResponse>> {
    let ProductForm { mut input, image } = form;
    let stored = store_image(&state.images, &mut input, image).await?;

    match state.service.update_product(id, input).await {
        Ok(product) => Ok(Json(product)),
        Err(e) => {
            if let Some(url) = stored {
                state.images.discard(&url).await;
            }
            Err(e)
        }
    }
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(state): State<ProductsState<R>>,
    UuidPath(id): UuidPath,
) -> ProductResult<impl IntoResponse> {
    state.service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
