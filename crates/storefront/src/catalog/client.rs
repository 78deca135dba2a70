//! HTTP client for the apparel and electronics APIs.

use std::sync::Arc;

use eleegon_core::{ProductId, UserId};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::CatalogError;
use super::types::{
    ApparelListing, ApparelProduct, CategoriesBody, ElectronicsProduct, Envelope, NewProduct,
    ProductBody, ProductPage, ProductsBody, RegistrationRequest, Submitted, User, UserBody,
    UsersBody,
};
use crate::config::CatalogConfig;

/// Characters of a response body kept in logs and errors.
const BODY_PREVIEW_CHARS: usize = 200;

/// Client for the public catalog APIs.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    apparel_url: Url,
    electronics_url: Url,
    page_limit: u32,
}

impl CatalogClient {
    /// Create a client for the configured APIs.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the HTTP client cannot be built
    /// (e.g., no TLS backend).
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("eleegon/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                apparel_url: config.apparel_url.clone(),
                electronics_url: config.electronics_url.clone(),
                page_limit: config.page_limit,
            }),
        })
    }

    /// Default page size for electronics listings.
    #[must_use]
    pub fn page_limit(&self) -> u32 {
        self.inner.page_limit
    }

    /// All apparel products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON. A body
    /// that is not a list is an empty catalog, and malformed elements are
    /// skipped.
    #[instrument(skip(self))]
    pub async fn apparel_products(&self) -> Result<Vec<ApparelProduct>, CatalogError> {
        let url = endpoint(&self.inner.apparel_url, "products")?;
        let ApparelListing(products) = self.get::<ApparelListing>(url).await?;
        debug!(count = products.len(), "Fetched apparel products");
        Ok(products)
    }

    /// A single apparel product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the API has no such product.
    #[instrument(skip(self))]
    pub async fn apparel_product(&self, id: ProductId) -> Result<ApparelProduct, CatalogError> {
        let url = endpoint(&self.inner.apparel_url, &format!("products/{id}"))?;
        // Unknown IDs come back as 200 with an empty body.
        self.get::<Option<ApparelProduct>>(url)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("apparel product {id}")))
    }

    /// One page of electronics products.
    ///
    /// `limit` falls back to the configured page size.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    #[instrument(skip(self))]
    pub async fn electronics_products(
        &self,
        page: u32,
        limit: Option<u32>,
    ) -> Result<ProductPage, CatalogError> {
        let mut url = endpoint(&self.inner.electronics_url, "products")?;
        url.query_pairs_mut()
            .append_pair("page", &page.max(1).to_string())
            .append_pair("limit", &limit.unwrap_or(self.inner.page_limit).to_string());

        let body: ProductsBody = open(self.get(url).await?)?;
        let page = ProductPage {
            total_pages: body.total_pages.unwrap_or(1).max(1),
            products: body.products,
        };
        debug!(
            count = page.products.len(),
            total_pages = page.total_pages,
            "Fetched electronics page"
        );
        Ok(page)
    }

    /// A single electronics product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the API has no such product.
    #[instrument(skip(self))]
    pub async fn electronics_product(
        &self,
        id: ProductId,
    ) -> Result<ElectronicsProduct, CatalogError> {
        let url = endpoint(&self.inner.electronics_url, &format!("products/{id}"))?;
        let body: ProductBody = open(self.get(url).await?)?;
        body.product
            .ok_or_else(|| CatalogError::NotFound(format!("electronics product {id}")))
    }

    /// Electronics category names.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, CatalogError> {
        let url = endpoint(&self.inner.electronics_url, "products/category")?;
        let body: CategoriesBody = open(self.get(url).await?)?;
        Ok(body.categories)
    }

    /// All users.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<Vec<User>, CatalogError> {
        let url = endpoint(&self.inner.electronics_url, "users")?;
        let body: UsersBody = open(self.get(url).await?)?;
        debug!(count = body.users.len(), "Fetched users");
        Ok(body.users)
    }

    /// A single user.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the API has no such user.
    #[instrument(skip(self))]
    pub async fn user(&self, id: UserId) -> Result<User, CatalogError> {
        let url = endpoint(&self.inner.electronics_url, &format!("users/{id}"))?;
        let body: UserBody = open(self.get(url).await?)?;
        body.user
            .ok_or_else(|| CatalogError::NotFound(format!("user {id}")))
    }

    /// Create a user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers with a
    /// non-success status.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegistrationRequest) -> Result<Submitted, CatalogError> {
        let url = endpoint(&self.inner.electronics_url, "users")?;
        self.post(url, request).await
    }

    /// Create a product in the electronics catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers with a
    /// non-success status.
    #[instrument(skip(self, product), fields(title = %product.title))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Submitted, CatalogError> {
        let url = endpoint(&self.inner.electronics_url, "products")?;
        self.post(url, product).await
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        debug!(%url, "GET");
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode(&url, status, &body)
    }

    async fn post<B: Serialize + ?Sized>(&self, url: Url, payload: &B) -> Result<Submitted, CatalogError> {
        debug!(%url, "POST");
        let response = self
            .inner
            .client
            .post(url.clone())
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        check_status(&url, status, &body)?;

        // Create endpoints are acknowledged by status alone; the body is informational.
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }
}

/// Append `path` to a base URL, keeping any path the base already has.
fn endpoint(base: &Url, path: &str) -> Result<Url, CatalogError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Ok(Url::parse(&joined)?)
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

fn check_status(url: &Url, status: StatusCode, body: &str) -> Result<(), CatalogError> {
    if status == StatusCode::NOT_FOUND {
        return Err(CatalogError::NotFound(url.path().to_owned()));
    }
    if !status.is_success() {
        tracing::error!(
            %url,
            status = %status,
            body = %preview(body),
            "Catalog API returned non-success status"
        );
        return Err(CatalogError::Status {
            status: status.as_u16(),
            body: preview(body),
        });
    }
    Ok(())
}

/// Check the status and parse the body. An empty body decodes as JSON `null`.
fn decode<T: DeserializeOwned>(url: &Url, status: StatusCode, body: &str) -> Result<T, CatalogError> {
    check_status(url, status, body)?;
    let text = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(text).map_err(|e| {
        tracing::error!(
            %url,
            error = %e,
            body = %preview(body),
            "Failed to parse catalog response"
        );
        CatalogError::Parse(e)
    })
}

/// Unwrap an electronics envelope, turning `status: false` into an error.
fn open<T>(envelope: Envelope<T>) -> Result<T, CatalogError> {
    if envelope.status {
        Ok(envelope.body)
    } else {
        let message = envelope
            .message
            .unwrap_or_else(|| "request was not successful".to_string());
        tracing::warn!(message = %message, "Catalog API rejected request");
        Err(CatalogError::Rejected(message))
    }
}
