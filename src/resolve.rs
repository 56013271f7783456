//! Owner-reference chain resolution.
//!
//! Certificate → CertificateRequest → Order → Challenges, each hop matched
//! by `(kind, name, uid)` against `metadata.ownerReferences` and scoped to
//! the parent's namespace. Pure lookups over the snapshot, linear per call;
//! fine for the tens-to-low-thousands of resources a namespace holds.

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{Resource, ResourceExt};

use crate::crd::{Certificate, CertificateRequest, Challenge, Order};

fn owned_by(owners: &[OwnerReference], kind: &str, name: &str, uid: Option<&str>) -> bool {
    let Some(uid) = uid else { return false };
    owners
        .iter()
        .any(|o| o.kind == kind && o.name == name && o.uid == uid)
}

fn created_at<K: Resource>(resource: &K) -> Option<DateTime<Utc>> {
    resource.meta().creation_timestamp.as_ref().map(|t| t.0)
}

/// Latest resource in `candidates` owned by `(kind, name, uid)` within
/// `namespace`. Strictly-greater comparison on the creation timestamp, so
/// equal timestamps keep the first match in input order.
fn latest_owned<'a, K: Resource>(
    candidates: &'a [K],
    namespace: Option<String>,
    kind: &str,
    name: &str,
    uid: Option<&str>,
) -> Option<&'a K> {
    let mut found: Option<&K> = None;
    for candidate in candidates {
        if candidate.meta().namespace != namespace {
            continue;
        }
        let owners = candidate.meta().owner_references.as_deref().unwrap_or(&[]);
        if !owned_by(owners, kind, name, uid) {
            continue;
        }
        if found.map_or(true, |cur| created_at(candidate) > created_at(cur)) {
            found = Some(candidate);
        }
    }
    found
}

/// Most recently created CertificateRequest owned by the certificate, if any.
/// Re-issuance creates a new request each time; only the newest one reflects
/// the current attempt.
pub fn latest_request<'a>(
    cert: &Certificate,
    requests: &'a [CertificateRequest],
) -> Option<&'a CertificateRequest> {
    latest_owned(
        requests,
        cert.namespace(),
        Certificate::kind(&()).as_ref(),
        &cert.name_any(),
        cert.uid().as_deref(),
    )
}

/// Most recently created Order owned by the request, if any. Non-ACME
/// issuers never create orders.
pub fn latest_order<'a>(request: &CertificateRequest, orders: &'a [Order]) -> Option<&'a Order> {
    latest_owned(
        orders,
        request.namespace(),
        CertificateRequest::kind(&()).as_ref(),
        &request.name_any(),
        request.uid().as_deref(),
    )
}

/// ALL challenges owned by the order, in input order. Several can be
/// concurrently pending, one per DNS name being authorized.
pub fn challenges<'a>(order: &Order, challenges: &'a [Challenge]) -> Vec<&'a Challenge> {
    let ns = order.namespace();
    let name = order.name_any();
    let uid = order.uid();
    challenges
        .iter()
        .filter(|c| c.meta().namespace == ns)
        .filter(|c| {
            let owners = c.meta().owner_references.as_deref().unwrap_or(&[]);
            owned_by(owners, Order::kind(&()).as_ref(), &name, uid.as_deref())
        })
        .collect()
}
