//! HTTP transport for the POS API.
//!
//! One stateless client serves every configuration; the base URL and bearer
//! token travel with each call because different stores talk to different
//! POS installations.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use posbridge_core::errors::{AuthError, Error, NetworkError, Result};

use crate::models::{
    AuthResponse, CreateOrderRequest, CreateOrderResponse, Nomenclature, OrganizationInfo,
    OrganizationsResponse, StopListItem, StopListResponse, TerminalGroupInfo,
    TerminalGroupsResponse,
};

/// Default timeout for POS requests.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Error body some POS builds send alongside a failure status.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Transport contract for the POS API.
///
/// Implementations map transport failures onto the auth/network error
/// taxonomy; callers decide the retry policy.
#[async_trait]
pub trait PosApi: Send + Sync {
    /// Exchanges the configured login for a bearer token.
    async fn authenticate(&self, base_url: &str, login: &str) -> Result<AuthResponse>;

    /// Lists the organizations visible to the token.
    async fn list_organizations(&self, base_url: &str, token: &str)
        -> Result<Vec<OrganizationInfo>>;

    /// Lists the terminal groups of an organization.
    async fn list_terminal_groups(
        &self,
        base_url: &str,
        token: &str,
        organization_id: &str,
    ) -> Result<Vec<TerminalGroupInfo>>;

    /// Fetches the full catalog snapshot of an organization.
    async fn fetch_nomenclature(
        &self,
        base_url: &str,
        token: &str,
        organization_id: &str,
    ) -> Result<Nomenclature>;

    /// Fetches the stop list (currently unavailable products).
    async fn fetch_stop_list(
        &self,
        base_url: &str,
        token: &str,
        organization_id: &str,
        terminal_group_id: Option<&str>,
    ) -> Result<Vec<StopListItem>>;

    /// Pushes an order for fulfillment.
    async fn create_order(
        &self,
        base_url: &str,
        token: &str,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse>;
}

/// Production [`PosApi`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct PosApiClient {
    client: reqwest::Client,
}

impl PosApiClient {
    /// Creates the client with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Default headers, with the bearer token when the endpoint wants one.
    fn headers(&self, token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::Unexpected(format!("Invalid token format: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Make a POST request and parse the response.
    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T> {
        debug!("[PosApi] POST {}", url);

        let response = self
            .client
            .post(url)
            .headers(self.headers(token)?)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        parse_response(response).await
    }

    /// Make a GET request and parse the response.
    async fn get<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        debug!("[PosApi] GET {}", url);

        let response = self
            .client
            .get(url)
            .headers(self.headers(Some(token))?)
            .send()
            .await
            .map_err(transport_error)?;

        parse_response(response).await
    }
}

#[async_trait]
impl PosApi for PosApiClient {
    async fn authenticate(&self, base_url: &str, login: &str) -> Result<AuthResponse> {
        let url = format!("{}/auth/token", base_url);
        let body = serde_json::json!({ "login": login });

        // Every failure of the token exchange lands in the auth taxonomy so
        // callers can tell credential problems from a flaky network.
        let response: AuthResponse = self.post(&url, None, &body).await.map_err(|e| match e {
            Error::Auth(auth) => Error::Auth(auth),
            Error::Network(NetworkError::UnexpectedStatus { status, message })
                if status == 400 || status == 403 =>
            {
                AuthError::CredentialsRejected(message).into()
            }
            Error::Network(NetworkError::InvalidResponse(message)) => {
                AuthError::InvalidTokenResponse(message).into()
            }
            Error::Network(network) => AuthError::TokenRequestFailed {
                url: url.clone(),
                message: network.to_string(),
            }
            .into(),
            other => other,
        })?;

        if response.token.trim().is_empty() {
            return Err(AuthError::InvalidTokenResponse("empty token field".to_string()).into());
        }
        Ok(response)
    }

    async fn list_organizations(
        &self,
        base_url: &str,
        token: &str,
    ) -> Result<Vec<OrganizationInfo>> {
        let url = format!("{}/organizations", base_url);
        let response: OrganizationsResponse = self.get(&url, token).await?;
        Ok(response.organizations)
    }

    async fn list_terminal_groups(
        &self,
        base_url: &str,
        token: &str,
        organization_id: &str,
    ) -> Result<Vec<TerminalGroupInfo>> {
        let url = format!("{}/terminal_groups", base_url);
        let body = serde_json::json!({ "organization_id": organization_id });
        let response: TerminalGroupsResponse = self.post(&url, Some(token), &body).await?;
        Ok(response.terminal_groups)
    }

    async fn fetch_nomenclature(
        &self,
        base_url: &str,
        token: &str,
        organization_id: &str,
    ) -> Result<Nomenclature> {
        let url = format!("{}/nomenclature", base_url);
        let body = serde_json::json!({ "organization_id": organization_id });
        self.post(&url, Some(token), &body).await
    }

    async fn fetch_stop_list(
        &self,
        base_url: &str,
        token: &str,
        organization_id: &str,
        terminal_group_id: Option<&str>,
    ) -> Result<Vec<StopListItem>> {
        let url = format!("{}/stop_lists", base_url);
        let body = serde_json::json!({
            "organization_id": organization_id,
            "terminal_group_id": terminal_group_id,
        });
        let response: StopListResponse = self.post(&url, Some(token), &body).await?;
        Ok(response.items)
    }

    async fn create_order(
        &self,
        base_url: &str,
        token: &str,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse> {
        let url = format!("{}/orders", base_url);
        self.post(&url, Some(token), request).await
    }
}

/// Maps a reqwest transport failure onto the network taxonomy.
fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        NetworkError::Timeout(DEFAULT_TIMEOUT_SECS).into()
    } else {
        NetworkError::Unreachable(err.to_string()).into()
    }
}

/// Parses a POS response, mapping failure statuses onto the error taxonomy.
///
/// A 401 anywhere means the token (or login) was rejected; callers react by
/// dropping the cached token.
async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| -> Error {
            NetworkError::InvalidResponse(format!("Failed to read response: {}", e)).into()
        })?;

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(AuthError::CredentialsRejected(extract_message(&body, status)).into());
    }
    if !status.is_success() {
        return Err(NetworkError::UnexpectedStatus {
            status: status.as_u16(),
            message: extract_message(&body, status),
        }
        .into());
    }

    serde_json::from_str(&body).map_err(|e| {
        NetworkError::InvalidResponse(format!(
            "{} - {}",
            e,
            body.chars().take(200).collect::<String>()
        ))
        .into()
    })
}

/// Best error message available: the structured body when the POS sends one,
/// the truncated raw body otherwise.
fn extract_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(body) {
        if let Some(message) = err.message.or(err.error) {
            return message;
        }
    }
    let truncated: String = body.chars().take(200).collect();
    if truncated.is_empty() {
        format!("HTTP {}", status)
    } else {
        truncated
    }
}
