//! Content store holding the medical record files, addressed by content identifier.

use core::fmt;

use attohttpc::{body::Body as _, MultipartBuilder, MultipartFile};
use healthchain_config::client::ContentStoreConfig;
use healthchain_data_model::{record::FileHash, ParseError};
use healthchain_logger::prelude::*;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    http::{Headers, Method, RequestBuilder, StatusCode},
    http_default::{DefaultRequest, DefaultRequestBuilder},
};

/// Content identifier returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(String);

impl Cid {
    /// Wrap a content identifier in text form.
    pub fn new(cid: impl Into<String>) -> Self {
        Self(cid.into())
    }

    /// Text form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// On-chain reference to this content.
    ///
    /// # Errors
    /// If the identifier does not fit into a [`FileHash`].
    pub fn to_file_hash(&self) -> Result<FileHash, ParseError> {
        FileHash::from_cid(&self.0)
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure of the content store.
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display, thiserror::Error)]
pub enum ContentError {
    /// Content store request failed: {0}
    Request(String),
    /// Content store answered {status}: {body}
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, lossily decoded
        body: String,
    },
    /// Malformed content store response: {0}
    Malformed(String),
}

/// Storage of record files outside the chain.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `bytes`, returning their identifier.
    async fn add(&self, bytes: Vec<u8>) -> Result<Cid, ContentError>;

    /// Fetch the content identified by `cid`.
    async fn retrieve(&self, cid: &Cid) -> Result<Vec<u8>, ContentError>;
}

/// Public URL of `cid` on `gateway`: `<gateway>/ipfs/<cid>`.
///
/// # Errors
/// If `gateway` cannot have path segments.
pub fn gateway_url(gateway: &Url, cid: &Cid) -> Result<Url, ContentError> {
    let mut url = gateway.clone();
    url.path_segments_mut()
        .map_err(|()| ContentError::Request(format!("`{gateway}` is not a base URL")))?
        .pop_if_empty()
        .push("ipfs")
        .push(cid.as_str());
    Ok(url)
}

/// [`ContentStore`] backed by the HTTP API and gateway of an IPFS node.
#[derive(Debug, Clone)]
pub struct IpfsHttpStore {
    api_url: Url,
    gateway_url: Url,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddResponse {
    hash: String,
}

const ADD_ENDPOINT: &str = "api/v0/add";

impl IpfsHttpStore {
    /// Store using the configured endpoints.
    pub fn new(config: &ContentStoreConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            gateway_url: config.gateway_url.clone(),
        }
    }

    /// Public URL of `cid` on the configured gateway.
    ///
    /// # Errors
    /// See [`gateway_url`].
    pub fn url_of(&self, cid: &Cid) -> Result<Url, ContentError> {
        gateway_url(&self.gateway_url, cid)
    }

    fn add_request(&self, bytes: &[u8]) -> Result<DefaultRequest, ContentError> {
        let url = self
            .api_url
            .join(ADD_ENDPOINT)
            .map_err(|err| ContentError::Request(err.to_string()))?;
        let (content_type, body) = file_form(bytes)?;
        Ok(DefaultRequestBuilder::new(Method::POST, url)
            .params([("pin", "true")])
            .headers(Headers::from([("Content-Type".to_owned(), content_type)]))
            .body(body))
    }
}

#[async_trait::async_trait]
impl ContentStore for IpfsHttpStore {
    async fn add(&self, bytes: Vec<u8>) -> Result<Cid, ContentError> {
        let request = self.add_request(&bytes)?;
        let response = blocking(move || request.send()).await?;
        let cid = parse_add_response(&ok_body(response)?)?;
        debug!(%cid, size = bytes.len(), "Stored content");
        Ok(cid)
    }

    async fn retrieve(&self, cid: &Cid) -> Result<Vec<u8>, ContentError> {
        let request = DefaultRequestBuilder::new(Method::GET, self.url_of(cid)?).body_empty();
        let response = blocking(move || request.send()).await?;
        ok_body(response)
    }
}

async fn blocking<F>(send: F) -> Result<http::Response<Vec<u8>>, ContentError>
where
    F: FnOnce() -> eyre::Result<http::Response<Vec<u8>>> + Send + 'static,
{
    tokio::task::spawn_blocking(send)
        .await
        .map_err(|err| ContentError::Request(err.to_string()))?
        .map_err(|err| ContentError::Request(format!("{err:#}")))
}

fn ok_body(response: http::Response<Vec<u8>>) -> Result<Vec<u8>, ContentError> {
    if response.status() == StatusCode::OK {
        return Ok(response.into_body());
    }
    Err(ContentError::Status {
        status: response.status().as_u16(),
        body: String::from_utf8_lossy(response.body()).into_owned(),
    })
}

/// Reply of the add endpoint: `{"Name": .., "Hash": .., "Size": ..}`.
fn parse_add_response(body: &[u8]) -> Result<Cid, ContentError> {
    serde_json::from_slice::<AddResponse>(body)
        .map(|AddResponse { hash }| Cid(hash))
        .map_err(|err| ContentError::Malformed(err.to_string()))
}

/// Single-file form upload, as content type and encoded body.
fn file_form(bytes: &[u8]) -> Result<(String, Vec<u8>), ContentError> {
    let mut form = MultipartBuilder::new()
        .with_file(MultipartFile::new("file", bytes).with_filename("file"))
        .build()
        .map_err(|err| ContentError::Request(err.to_string()))?;
    let content_type = form
        .content_type()
        .map_err(|err| ContentError::Request(err.to_string()))?
        .ok_or_else(|| ContentError::Request("form has no content type".to_owned()))?;
    let mut body = Vec::with_capacity(bytes.len() + 256);
    form.write(&mut body).map_err(|err| ContentError::Request(err.to_string()))?;
    Ok((content_type, body))
}
