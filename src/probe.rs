//! Best-effort network probes used during challenge diagnosis.
//!
//! Both probes degrade to issue text on failure; they never abort a run.
//! Each site performs its lookup at most once.

use async_trait::async_trait;
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("dns lookup failed: {0}")]
    Dns(String),

    #[error("http request failed: {0}")]
    Http(String),

    #[error("unexpected ACME response: {0}")]
    Malformed(String),
}

/// External lookups the diagnosis engine may perform while inspecting a
/// stuck order. Trait seam so tests can substitute canned answers.
#[async_trait]
pub trait AcmeProbe {
    /// Whether a CNAME record exists for the given fully qualified name.
    /// `Ok(false)` means the name resolved cleanly to no records.
    async fn delegation_exists(&self, fqdn: &str) -> Result<bool, ProbeError>;

    /// Remote state of an ACME order, fetched from its status URL.
    async fn order_status(&self, url: &str) -> Result<String, ProbeError>;
}

/// Production probe: system-configured DNS resolver plus a plain HTTP client.
pub struct NetProbe {
    resolver: TokioAsyncResolver,
    http: reqwest::Client,
}

impl NetProbe {
    pub fn from_system() -> anyhow::Result<Self> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("kubectl-listcerts/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { resolver, http })
    }
}

#[async_trait]
impl AcmeProbe for NetProbe {
    async fn delegation_exists(&self, fqdn: &str) -> Result<bool, ProbeError> {
        match self.resolver.lookup(fqdn, RecordType::CNAME).await {
            Ok(lookup) => Ok(lookup.iter().next().is_some()),
            Err(err) => match err.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => Ok(false),
                _ => Err(ProbeError::Dns(err.to_string())),
            },
        }
    }

    async fn order_status(&self, url: &str) -> Result<String, ProbeError> {
        let body = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ProbeError::Http(e.to_string()))?
            .text()
            .await
            .map_err(|e| ProbeError::Http(e.to_string()))?;

        let doc: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ProbeError::Malformed(e.to_string()))?;
        doc.get("status")
            .and_then(|s| s.as_str())
            .map(str::to_owned)
            .ok_or_else(|| ProbeError::Malformed("order document has no status field".into()))
    }
}
