use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A cert-manager Certificate, the root of every diagnosis.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "cert-manager.io",
    version = "v1",
    kind = "Certificate",
    namespaced
)]
#[kube(status = "CertificateStatus")]
pub struct CertificateSpec {
    #[serde(rename = "dnsNames", default, skip_serializing_if = "Vec::is_empty")]
    pub dns_names: Vec<String>,

    #[serde(rename = "issuerRef")]
    pub issuer_ref: IssuerRef,

    #[serde(rename = "secretName")]
    pub secret_name: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct IssuerRef {
    pub kind: String,
    pub name: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct CertificateStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(rename = "notAfter", skip_serializing_if = "Option::is_none")]
    pub not_after: Option<Time>,

    #[serde(rename = "notBefore", skip_serializing_if = "Option::is_none")]
    pub not_before: Option<Time>,

    #[serde(rename = "renewalTime", skip_serializing_if = "Option::is_none")]
    pub renewal_time: Option<Time>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct Condition {
    #[serde(rename = "lastTransitionTime", skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub reason: String,

    pub status: String,

    #[serde(rename = "type")]
    pub condition_type: String,
}

/// Namespace-scoped issuing backend. The backend configuration itself is
/// irrelevant to chain diagnosis, so the spec is kept as an opaque map.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[kube(group = "cert-manager.io", version = "v1", kind = "Issuer", namespaced)]
pub struct IssuerSpec {
    #[serde(flatten)]
    pub config: BTreeMap<String, serde_json::Value>,
}

/// Cluster-scoped variant of [`IssuerSpec`]; looked up by name only.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[kube(group = "cert-manager.io", version = "v1", kind = "ClusterIssuer")]
pub struct ClusterIssuerSpec {
    #[serde(flatten)]
    pub config: BTreeMap<String, serde_json::Value>,
}

/// One-shot signing request, created per issuance or renewal attempt and
/// owned by its Certificate.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "cert-manager.io",
    version = "v1",
    kind = "CertificateRequest",
    namespaced
)]
#[kube(status = "CertificateRequestStatus")]
pub struct CertificateRequestSpec {
    #[serde(rename = "issuerRef")]
    pub issuer_ref: IssuerRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct CertificateRequestStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

/// ACME order tracking a CertificateRequest's progress with the CA.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "acme.cert-manager.io",
    version = "v1",
    kind = "Order",
    namespaced
)]
#[kube(status = "OrderStatus")]
pub struct OrderSpec {
    #[serde(rename = "dnsNames", default, skip_serializing_if = "Vec::is_empty")]
    pub dns_names: Vec<String>,

    #[serde(rename = "issuerRef")]
    pub issuer_ref: IssuerRef,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct OrderStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorizations: Vec<OrderAuthorization>,

    /// Issued certificate, base64 PEM. Presence means the order completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct OrderAuthorization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub wildcard: bool,
}

/// Single ACME authorization proof, owned by its Order.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "acme.cert-manager.io",
    version = "v1",
    kind = "Challenge",
    namespaced
)]
#[kube(status = "ChallengeStatus")]
pub struct ChallengeSpec {
    #[serde(rename = "dnsName")]
    pub dns_name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub challenge_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub wildcard: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<AcmeSolver>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct AcmeSolver {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns01: Option<Dns01Solver>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http01: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<serde_json::Value>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct Dns01Solver {
    #[serde(
        rename = "cnameStrategy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cname_strategy: Option<String>,

    /// Provider-specific configuration (route53, cloudflare, webhook, ...).
    #[serde(flatten)]
    pub provider: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct ChallengeStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default)]
    pub presented: bool,

    #[serde(default)]
    pub processing: bool,
}

pub const CONDITION_READY: &str = "Ready";

pub fn ready_condition(conditions: &[Condition]) -> Option<&Condition> {
    conditions.iter().find(|c| c.condition_type == CONDITION_READY)
}

/// Readiness status string of a Certificate, or "" when no Ready condition
/// has been reported yet.
pub fn ready_status(cert: &Certificate) -> &str {
    cert.status
        .as_ref()
        .and_then(|s| ready_condition(&s.conditions))
        .map(|c| c.status.as_str())
        .unwrap_or("")
}
