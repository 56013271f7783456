//! Shared test object builders.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{OwnerReference, Time};
use kube::Resource;

use crate::crd::{
    AcmeSolver, Certificate, CertificateRequest, CertificateRequestSpec, CertificateSpec,
    Challenge, ChallengeSpec, ChallengeStatus, ClusterIssuer, ClusterIssuerSpec, Condition,
    Dns01Solver, Issuer, IssuerRef, IssuerSpec, Order, OrderAuthorization, OrderSpec,
};
use crate::probe::{AcmeProbe, ProbeError};

pub fn time_days_ago(days: i64) -> Time {
    Time(Utc::now() - Duration::days(days))
}

fn issuer_ref(kind: &str, name: &str) -> IssuerRef {
    IssuerRef {
        kind: kind.into(),
        name: name.into(),
    }
}

pub fn certificate(ns: &str, name: &str, uid: &str, kind: &str, issuer: &str) -> Certificate {
    let mut cert = Certificate::new(
        name,
        CertificateSpec {
            dns_names: vec![],
            issuer_ref: issuer_ref(kind, issuer),
            secret_name: format!("{name}-tls"),
        },
    );
    cert.metadata.namespace = Some(ns.into());
    cert.metadata.uid = Some(uid.into());
    cert
}

pub fn issuer(ns: &str, name: &str) -> Issuer {
    let mut issuer = Issuer::new(name, IssuerSpec::default());
    issuer.metadata.namespace = Some(ns.into());
    issuer
}

pub fn cluster_issuer(name: &str) -> ClusterIssuer {
    ClusterIssuer::new(name, ClusterIssuerSpec::default())
}

/// Owner reference pointing at `parent`, as the controller would stamp it.
pub fn owner_of<K>(parent: &K, kind: &str) -> OwnerReference
where
    K: Resource<DynamicType = ()>,
{
    OwnerReference {
        api_version: "cert-manager.io/v1".into(),
        kind: kind.into(),
        name: parent.meta().name.clone().unwrap_or_default(),
        uid: parent.meta().uid.clone().unwrap_or_default(),
        ..OwnerReference::default()
    }
}

pub fn request(ns: &str, name: &str, owner: &OwnerReference) -> CertificateRequest {
    let mut req = CertificateRequest::new(
        name,
        CertificateRequestSpec {
            issuer_ref: issuer_ref("ClusterIssuer", "le"),
            request: None,
        },
    );
    req.metadata.namespace = Some(ns.into());
    req.metadata.uid = Some(format!("{name}-uid"));
    req.metadata.owner_references = Some(vec![owner.clone()]);
    req.metadata.creation_timestamp = Some(time_days_ago(1));
    req
}

pub fn order(ns: &str, name: &str, owner: &OwnerReference) -> Order {
    let mut ord = Order::new(
        name,
        OrderSpec {
            dns_names: vec![],
            issuer_ref: issuer_ref("ClusterIssuer", "le"),
        },
    );
    ord.metadata.namespace = Some(ns.into());
    ord.metadata.uid = Some(format!("{name}-uid"));
    ord.metadata.owner_references = Some(vec![owner.clone()]);
    ord.metadata.creation_timestamp = Some(time_days_ago(1));
    ord
}

pub fn challenge(ns: &str, name: &str, owner: &OwnerReference, dns_name: &str) -> Challenge {
    let mut ch = Challenge::new(
        name,
        ChallengeSpec {
            dns_name: dns_name.into(),
            challenge_type: None,
            url: None,
            wildcard: false,
            solver: None,
        },
    );
    ch.metadata.namespace = Some(ns.into());
    ch.metadata.uid = Some(format!("{name}-uid"));
    ch.metadata.owner_references = Some(vec![owner.clone()]);
    ch.metadata.creation_timestamp = Some(time_days_ago(1));
    ch
}

pub fn pending_challenge(
    ns: &str,
    name: &str,
    owner: &OwnerReference,
    dns_name: &str,
    reason: &str,
    dns01: bool,
) -> Challenge {
    let mut ch = challenge(ns, name, owner, dns_name);
    if dns01 {
        ch.spec.challenge_type = Some("DNS-01".into());
        ch.spec.solver = Some(AcmeSolver {
            dns01: Some(Dns01Solver::default()),
            http01: None,
            selector: None,
        });
    } else {
        ch.spec.challenge_type = Some("HTTP-01".into());
        ch.spec.solver = Some(AcmeSolver {
            dns01: None,
            http01: Some(serde_json::json!({})),
            selector: None,
        });
    }
    ch.status = Some(ChallengeStatus {
        state: Some("pending".into()),
        reason: Some(reason.into()),
        presented: false,
        processing: true,
    });
    ch
}

pub fn authorization(identifier: &str) -> OrderAuthorization {
    OrderAuthorization {
        identifier: Some(identifier.into()),
        url: None,
        wildcard: false,
    }
}

pub fn ready_cond(status: &str, message: &str) -> Condition {
    Condition {
        last_transition_time: None,
        message: message.into(),
        reason: String::new(),
        status: status.into(),
        condition_type: "Ready".into(),
    }
}

/// Probe with canned answers; `Err` strings are wrapped in the matching
/// [`ProbeError`] variant.
#[derive(Clone, Debug)]
pub struct StubProbe {
    pub delegation: Result<bool, String>,
    pub order_state: Result<String, String>,
}

impl Default for StubProbe {
    fn default() -> Self {
        Self {
            delegation: Ok(true),
            order_state: Err("unreachable".into()),
        }
    }
}

#[async_trait]
impl AcmeProbe for StubProbe {
    async fn delegation_exists(&self, _fqdn: &str) -> Result<bool, ProbeError> {
        self.delegation.clone().map_err(ProbeError::Dns)
    }

    async fn order_status(&self, _url: &str) -> Result<String, ProbeError> {
        self.order_state.clone().map_err(ProbeError::Http)
    }
}
