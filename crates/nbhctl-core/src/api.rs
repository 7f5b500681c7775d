//! Conductor REST API client.
//!
//! Wraps the conductor's candidate-configuration tree behind typed calls:
//! one list method per tree level, plus the two mutations (add, clone) on a
//! network-interface's neighborhood collection. Every response object must
//! carry a `name` field; a body without one is a fetch failure, never a
//! silent default.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::types::ResourcePath;

/// Root of the candidate configuration tree.
const CONFIG_BASE: &str = "/api/v1/config/candidate/authority";

/// Statuses the conductor returns for accepted mutations.
const MUTATION_OK: [u16; 4] = [200, 201, 202, 204];

/// Authenticated client for one conductor.
///
/// All calls are sequential request/response pairs; the client holds no
/// state beyond the bearer token.
pub struct ConductorClient {
    base_url: String,
    http: Client,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

impl ConductorClient {
    /// Create an unauthenticated client; call [`login`](Self::login) before
    /// touching the tree.
    ///
    /// `endpoint` is a bare FQDN/IP or an `https://` URL. `insecure` accepts
    /// self-signed conductor certificates.
    pub fn new(endpoint: &str, insecure: bool) -> Result<Self> {
        let base_url = normalize_endpoint(endpoint)?;
        let http = Client::builder()
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(|e| Error::Endpoint(e.to_string()))?;
        Ok(Self {
            base_url,
            http,
            token: None,
        })
    }

    /// Create a client around a pre-acquired bearer token.
    pub fn with_token(endpoint: &str, token: impl Into<String>, insecure: bool) -> Result<Self> {
        let mut client = Self::new(endpoint, insecure)?;
        client.token = Some(token.into());
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for a bearer token via `POST /api/v1/login`.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let url = format!("{}/api/v1/login", self.base_url);
        debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(|e| Error::Auth(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Auth(format!("login rejected: {}", response.status())));
        }
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("malformed login response: {e}")))?;
        self.token = Some(body.token);
        info!(username, "authenticated with conductor");
        Ok(())
    }

    /// List all router names in the authority.
    pub async fn routers(&self) -> Result<Vec<String>> {
        self.get_names(&format!("{CONFIG_BASE}/router"), "router").await
    }

    pub async fn nodes(&self, router: &str) -> Result<Vec<String>> {
        self.get_names(&format!("{CONFIG_BASE}/router/{router}/node"), router)
            .await
    }

    pub async fn device_interfaces(&self, router: &str, node: &str) -> Result<Vec<String>> {
        self.get_names(
            &format!("{CONFIG_BASE}/router/{router}/node/{node}/device-interface"),
            &format!("{router}/{node}"),
        )
        .await
    }

    pub async fn network_interfaces(
        &self,
        router: &str,
        node: &str,
        device_interface: &str,
    ) -> Result<Vec<String>> {
        self.get_names(
            &format!(
                "{CONFIG_BASE}/router/{router}/node/{node}/device-interface/{device_interface}/network-interface"
            ),
            &format!("{router}/{node}/{device_interface}"),
        )
        .await
    }

    /// Neighborhood names attached to one network-interface.
    pub async fn neighborhoods(&self, path: &ResourcePath) -> Result<Vec<String>> {
        self.get_names(&neighborhood_collection(path), &path.to_string())
            .await
    }

    /// Add `name` to the neighborhood collection at `path`.
    pub async fn add_neighborhood(&self, path: &ResourcePath, name: &str) -> Result<()> {
        let status = self
            .post_name(&neighborhood_collection(path), name)
            .await
            .map_err(|detail| Error::Apply {
                path: path.to_string(),
                name: name.to_string(),
                detail,
            })?;
        if !MUTATION_OK.contains(&status.as_u16()) {
            return Err(Error::Apply {
                path: path.to_string(),
                name: name.to_string(),
                detail: format!("status {status}"),
            });
        }
        info!(%path, name, "added neighborhood");
        Ok(())
    }

    /// Clone the neighborhood `existing` at `path` under the name `new_name`.
    pub async fn clone_neighborhood(
        &self,
        path: &ResourcePath,
        existing: &str,
        new_name: &str,
    ) -> Result<()> {
        let url_path = format!("{}/{existing}/clone", neighborhood_collection(path));
        let clone_error = |detail: String| Error::Clone {
            path: path.to_string(),
            existing: existing.to_string(),
            new_name: new_name.to_string(),
            detail,
        };
        let status = self
            .post_name(&url_path, new_name)
            .await
            .map_err(|detail| clone_error(detail))?;
        if !MUTATION_OK.contains(&status.as_u16()) {
            return Err(clone_error(format!("status {status}")));
        }
        info!(%path, existing, new_name, "cloned neighborhood");
        Ok(())
    }

    /// GET a collection and project it to its `name` fields.
    ///
    /// `at` is the tree prefix reached so far, carried into fetch errors.
    async fn get_names(&self, path: &str, at: &str) -> Result<Vec<String>> {
        let url = format!("{}{path}", self.base_url);
        debug!("GET {url}");
        let fetch_error = |detail: String| Error::Fetch {
            path: at.to_string(),
            detail,
        };
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| fetch_error(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(fetch_error(format!("{status}: {body}")));
        }
        let objects: Vec<Named> = response
            .json()
            .await
            .map_err(|e| fetch_error(format!("malformed body: {e}")))?;
        Ok(objects.into_iter().map(|o| o.name).collect())
    }

    /// POST `{"name": …}` and hand the status back for the caller to judge.
    async fn post_name(
        &self,
        path: &str,
        name: &str,
    ) -> std::result::Result<StatusCode, String> {
        let url = format!("{}{path}", self.base_url);
        debug!("POST {url}");
        let mut request = self.http.post(&url).json(&serde_json::json!({ "name": name }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| e.to_string())?;
        Ok(response.status())
    }
}

/// Collection path for the neighborhoods under one network-interface.
fn neighborhood_collection(path: &ResourcePath) -> String {
    format!(
        "{CONFIG_BASE}/router/{}/node/{}/device-interface/{}/network-interface/{}/neighborhood",
        path.router, path.node, path.device_interface, path.network_interface
    )
}

/// Accept a bare FQDN/IP or a full URL; reject anything that does not parse.
fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let candidate = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    };
    let url = Url::parse(&candidate).map_err(|e| Error::Endpoint(format!("{endpoint}: {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(Error::Endpoint(format!("unsupported scheme: {other}"))),
    }
    Ok(candidate.trim_end_matches('/').to_string())
}
