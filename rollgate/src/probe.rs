//! The seam between the driver and the service under test.
use crate::error::{DriverError, ProbeError};
use reqwest::{header::USER_AGENT, Client};
use rollgate_core::USER_AGENT_PREFIX;
use std::future::Future;
use url::Url;

/// Issues one synthetic request on behalf of a logical client.
///
/// `Ok` carries the response status, whatever it is; `Err` means no response arrived. The
/// driver applies the per-request timeout around this call, and records 4xx/5xx statuses as
/// errors.
pub trait Probe: Send + Sync + 'static {
    fn probe(&self, client: usize) -> impl Future<Output = Result<u16, ProbeError>> + Send;
}

/// HTTP GET probe against a fixed target.
///
/// The `reqwest::Client` is injected so callers can share a connection pool or tune TLS.
#[derive(Clone, Debug)]
pub struct HttpProbe {
    client: Client,
    target: Url,
}

impl HttpProbe {
    pub fn new(client: Client, target: &str) -> Result<Self, DriverError> {
        Ok(Self {
            client,
            target: parse_target(target)?,
        })
    }

    /// Build a probe with a default client.
    pub fn for_target(target: &str) -> Result<Self, DriverError> {
        let client = Client::builder().build()?;
        Self::new(client, target)
    }

    pub fn target(&self) -> &Url {
        &self.target
    }
}

impl Probe for HttpProbe {
    async fn probe(&self, client: usize) -> Result<u16, ProbeError> {
        let res = self
            .client
            .get(self.target.clone())
            .header(USER_AGENT, format!("{USER_AGENT_PREFIX}{client}"))
            .send()
            .await?;

        Ok(res.status().as_u16())
    }
}

pub(crate) fn parse_target(target: &str) -> Result<Url, DriverError> {
    let url = Url::parse(target.trim()).map_err(|source| DriverError::InvalidUrl {
        url: target.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(DriverError::UnsupportedScheme(scheme.to_string())),
    }
}
