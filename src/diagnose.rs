//! Issuance-chain diagnosis.
//!
//! For each Certificate the engine accumulates every applicable issue; it
//! never short-circuits on the first finding. Configuration problems
//! (issuer reference) are orthogonal to issuance progress and are always
//! reported; the chain walk then surfaces the deepest known failure point
//! instead of every intermediate non-terminal state.

use kube::ResourceExt;

use crate::crd::{ready_condition, Certificate, Challenge, ClusterIssuer, Issuer, Order};
use crate::probe::AcmeProbe;
use crate::resolve;
use crate::snapshot::Snapshot;

pub const UNKNOWN_ISSUER: &str = "unknown issuer";
pub const UNKNOWN_CLUSTER_ISSUER: &str = "unknown cluster issuer";

/// A Certificate plus everything wrong with it. Derived fresh per run.
#[derive(Clone, Debug)]
pub struct Diagnosis {
    pub certificate: Certificate,
    pub issues: Vec<String>,
}

/// Check that the certificate's declared issuer actually exists. Issuers
/// are namespace-scoped and NOT visible across namespaces; ClusterIssuers
/// are matched by name alone. Unrecognized kinds (external issuers) are
/// not validated.
pub fn validate_issuer_ref(
    cert: &Certificate,
    cluster_issuers: &[ClusterIssuer],
    issuers: &[Issuer],
) -> Option<&'static str> {
    let issuer_ref = &cert.spec.issuer_ref;
    match issuer_ref.kind.as_str() {
        "ClusterIssuer" => {
            if cluster_issuers.iter().any(|ci| ci.name_any() == issuer_ref.name) {
                None
            } else {
                Some(UNKNOWN_CLUSTER_ISSUER)
            }
        }
        "Issuer" => {
            let ns = cert.namespace();
            if issuers
                .iter()
                .any(|i| i.namespace() == ns && i.name_any() == issuer_ref.name)
            {
                None
            } else {
                Some(UNKNOWN_ISSUER)
            }
        }
        _ => None,
    }
}

/// Diagnose every certificate in the snapshot, in snapshot order. Each
/// diagnosis is independent of every other; re-running over an unchanged
/// snapshot yields identical results.
pub async fn diagnose_all(snapshot: &Snapshot, probe: &dyn AcmeProbe) -> Vec<Diagnosis> {
    let mut out = Vec::with_capacity(snapshot.certificates.len());
    for certificate in &snapshot.certificates {
        let issues = diagnose(certificate, snapshot, probe).await;
        out.push(Diagnosis {
            certificate: certificate.clone(),
            issues,
        });
    }
    out
}

/// Diagnose a single certificate against the snapshot.
pub async fn diagnose(cert: &Certificate, snap: &Snapshot, probe: &dyn AcmeProbe) -> Vec<String> {
    let mut issues = Vec::new();

    if let Some(issue) = validate_issuer_ref(cert, &snap.cluster_issuers, &snap.issuers) {
        issues.push(issue.to_string());
    }

    // No request at all: either fully issued and stable, or never requested.
    // Nothing further to say about issuance progress either way.
    let Some(request) = resolve::latest_request(cert, &snap.requests) else {
        return issues;
    };

    let Some(order) = resolve::latest_order(request, &snap.orders) else {
        // Request failed or is still processing without reaching the ACME
        // layer; its own Ready condition is the best signal we have.
        let ready = request
            .status
            .as_ref()
            .and_then(|s| ready_condition(&s.conditions));
        match ready {
            Some(cond) if cond.status.eq_ignore_ascii_case("true") => {}
            Some(cond) => issues.push(format!(
                "Certificate request status: {}: {}.",
                cond.status, cond.message
            )),
            None => issues.push(
                "Certificate request status: unknown: no Ready condition reported.".to_string(),
            ),
        }
        return issues;
    };

    if order_issued(order) {
        return issues;
    }

    let state = order_state(order);
    let challenges = resolve::challenges(order, &snap.challenges);

    if challenges.is_empty() {
        diagnose_stalled_order(order, state, probe, &mut issues).await;
        return issues;
    }

    issues.push(format!("Order status: {state}."));
    for challenge in challenges {
        diagnose_challenge(challenge, probe, &mut issues).await;
    }
    issues
}

fn order_issued(order: &Order) -> bool {
    order
        .status
        .as_ref()
        .and_then(|s| s.certificate.as_deref())
        .is_some_and(|c| !c.is_empty())
}

fn order_state(order: &Order) -> &str {
    order
        .status
        .as_ref()
        .and_then(|s| s.state.as_deref())
        .unwrap_or("unknown")
}

/// An order with no challenges is stuck before challenge creation. Report
/// its state and authorization identifiers, and enrich with the ACME
/// server's own view of the order when the status URL is fetchable.
async fn diagnose_stalled_order(
    order: &Order,
    state: &str,
    probe: &dyn AcmeProbe,
    issues: &mut Vec<String>,
) {
    let identifiers: Vec<&str> = order
        .status
        .iter()
        .flat_map(|s| &s.authorizations)
        .filter_map(|a| a.identifier.as_deref())
        .collect();

    let mut summary = if identifiers.is_empty() {
        format!("Order status: {state}. No challenges created yet.")
    } else {
        format!(
            "Order status: {state}. No challenges created yet for authorizations: {}.",
            identifiers.join(", ")
        )
    };

    let mut fetch_failure = None;
    if let Some(url) = order.status.as_ref().and_then(|s| s.url.as_deref()) {
        match probe.order_status(url).await {
            Ok(remote) => summary.push_str(&format!(" ACME server reports: {remote}.")),
            Err(err) => fetch_failure = Some(format!("unable to fetch order status: {err}")),
        }
    }

    issues.push(summary);
    issues.extend(fetch_failure);
}

async fn diagnose_challenge(challenge: &Challenge, probe: &dyn AcmeProbe, issues: &mut Vec<String>) {
    let Some(status) = challenge.status.as_ref() else {
        return;
    };
    if status.state.as_deref() != Some("pending") {
        return;
    }
    let reason = status.reason.as_deref().unwrap_or("");

    // Propagation delays on DNS-01 solvers are usually transient noise, but
    // a missing _acme-challenge CNAME means the delegation was never set up
    // and the challenge will wait forever. Only that case is actionable.
    if is_propagation_reason(reason) && has_dns01_solver(challenge) {
        let fqdn = format!("_acme-challenge.{}", challenge.spec.dns_name);
        match probe.delegation_exists(&fqdn).await {
            Ok(true) => {}
            Ok(false) => issues.push(format!(
                "missing delegation record: no CNAME found for {fqdn}"
            )),
            Err(err) => issues.push(format!(
                "unable to verify delegation record for {fqdn}: {err}"
            )),
        }
        return;
    }

    issues.push(format!(
        "Challenge for {} pending: {reason}",
        challenge.spec.dns_name
    ));
}

fn is_propagation_reason(reason: &str) -> bool {
    let reason = reason.to_ascii_lowercase();
    reason.contains("propagat") || reason.contains("no txt record")
}

fn has_dns01_solver(challenge: &Challenge) -> bool {
    challenge
        .spec
        .solver
        .as_ref()
        .is_some_and(|s| s.dns01.is_some())
}
