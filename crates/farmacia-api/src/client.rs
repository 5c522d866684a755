// Async HTTP client for the farmacia REST backend.
//
// Base path: configurable, `http://localhost:8080/api` by default.
// Every CRUD collection follows the same verb layout; the lifecycle
// endpoint `POST /{resource}/{id}/efetivar` carries no body.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{LoginRequest, LoginResponse, PaymentRequest, RegisterRequest, TransmitRequest};
use crate::resource::Resource;
use crate::transport::TransportConfig;

/// Default backend location used by the original deployment.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default, alias = "error")]
    message: Option<String>,
}

/// First 200 characters of a body, for error messages.
fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the stock-management backend.
///
/// Stateless apart from the pooled `reqwest::Client`: no session token is
/// kept, the backend is trusted to scope requests itself.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport settings.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let mut url = Url::parse(base_url)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(Self {
            http,
            base_url: url,
        })
    }

    /// The normalized base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T, Error> {
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await?;
        Self::handle_response(resp).await
    }

    async fn send_empty(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<(), Error> {
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await?;
        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = preview(&body);
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    preview(&raw)
                }
            });

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication { message };
        }

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── CRUD collections ─────────────────────────────────────────────

    /// `GET /{resource}`: every record, in backend order.
    pub async fn list<T: DeserializeOwned>(&self, resource: Resource) -> Result<Vec<T>, Error> {
        let url = self.url(&[resource.as_ref()])?;
        self.send_json(Method::GET, url, None::<&()>).await
    }

    /// `POST /{resource}`: returns the record as stored by the backend.
    pub async fn create<T, B>(&self, resource: Resource, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = self.url(&[resource.as_ref()])?;
        self.send_json(Method::POST, url, Some(body)).await
    }

    /// `PUT /{resource}/{id}`: returns the updated record.
    pub async fn update<T, B>(&self, resource: Resource, id: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = self.url(&[resource.as_ref(), id])?;
        self.send_json(Method::PUT, url, Some(body)).await
    }

    /// `DELETE /{resource}/{id}`.
    pub async fn delete(&self, resource: Resource, id: &str) -> Result<(), Error> {
        let url = self.url(&[resource.as_ref(), id])?;
        self.send_empty(Method::DELETE, url, None::<&()>).await
    }

    /// `POST /{resource}/{id}/efetivar`: server-side finalize, no body.
    pub async fn finalize(&self, resource: Resource, id: &str) -> Result<(), Error> {
        let url = self.url(&[resource.as_ref(), id, "efetivar"])?;
        self.send_empty(Method::POST, url, None::<&()>).await
    }

    // ── Session ──────────────────────────────────────────────────────

    /// `POST /login`, unwrapping the `{ user }` envelope.
    pub async fn login<U: DeserializeOwned>(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<U, Error> {
        let url = self.url(&["login"])?;
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let resp: LoginResponse<U> = self.send_json(Method::POST, url, Some(&body)).await?;
        Ok(resp.user)
    }

    /// `POST /register`.
    pub async fn register(
        &self,
        nome: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<(), Error> {
        let url = self.url(&["register"])?;
        let body = RegisterRequest {
            nome,
            email,
            password: password.expose_secret(),
        };
        self.send_empty(Method::POST, url, Some(&body)).await
    }

    // ── Reports and filings ──────────────────────────────────────────

    /// `GET /estoque`: current stock positions.
    pub async fn stock<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        let url = self.url(&["estoque"])?;
        self.send_json(Method::GET, url, None::<&()>).await
    }

    /// `POST /transmitir`: send the regulatory file for a date range.
    pub async fn transmit(&self, request: &TransmitRequest) -> Result<(), Error> {
        let url = self.url(&["transmitir"])?;
        self.send_empty(Method::POST, url, Some(request)).await
    }

    /// `POST /pagamentos`.
    pub async fn pay(&self, request: &PaymentRequest) -> Result<(), Error> {
        let url = self.url(&["pagamentos"])?;
        self.send_empty(Method::POST, url, Some(request)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = ApiClient::from_reqwest(DEFAULT_BASE_URL, reqwest::Client::new()).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/api/");
    }

    #[test]
    fn url_appends_encoded_segments() {
        let client = ApiClient::from_reqwest("http://host/api/", reqwest::Client::new()).unwrap();
        let url = client.url(&["entradas", "a b", "efetivar"]).unwrap();
        assert_eq!(url.as_str(), "http://host/api/entradas/a%20b/efetivar");
    }

    #[test]
    fn rejects_garbage_base_url() {
        assert!(matches!(
            ApiClient::from_reqwest("not a url", reqwest::Client::new()),
            Err(Error::InvalidUrl(_))
        ));
    }
}
