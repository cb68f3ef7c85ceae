use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;

pub const DEFAULT_USER_AGENT: &str = concat!("batchfetch/", env!("CARGO_PKG_VERSION"));

/// What a capability reports for one identifier.
///
/// `succeeded == false` is an ordinary failure (a 404, say). Raising an
/// `Err` from [`Capability::fetch`] is reserved for faults such as transport
/// errors; the engine records both as failed outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    pub succeeded: bool,
    pub status_code: Option<u16>,
    pub payload: Option<Vec<u8>>,
    pub error: Option<String>,
    pub final_url: Option<String>,
}

impl FetchResponse {
    pub fn success(status_code: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            succeeded: true,
            status_code: Some(status_code),
            payload: Some(payload.into()),
            ..Self::default()
        }
    }

    pub fn failure(status_code: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            status_code,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// The pluggable fetch function the engine invokes once per item.
#[async_trait]
pub trait Capability: Send + Sync {
    async fn fetch(&self, identifier: &str) -> Result<FetchResponse>;
}

/// Fetches identifiers as URLs with a plain HTTP GET.
pub struct HttpCapability {
    client: Client,
}

impl HttpCapability {
    /// No request timeout on the client; the per-item deadline in
    /// [`TimeoutGuard`](crate::guard::TimeoutGuard) is the only clock.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Capability for HttpCapability {
    async fn fetch(&self, identifier: &str) -> Result<FetchResponse> {
        log::info!("Fetching: {}", identifier);

        let res = self.client.get(identifier).send().await?;
        let status = res.status();
        let final_url = res.url().to_string();

        if !status.is_success() {
            return Ok(FetchResponse {
                final_url: Some(final_url),
                ..FetchResponse::failure(Some(status.as_u16()), format!("HTTP {}", status))
            });
        }

        let body = res.bytes().await?;
        log::debug!("{}: {} bytes", identifier, body.len());

        Ok(FetchResponse {
            final_url: Some(final_url),
            ..FetchResponse::success(status.as_u16(), body.to_vec())
        })
    }
}
