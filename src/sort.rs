//! Presentation ordering.
//!
//! Exactly one sort key is active per run; modelling it as an enum makes
//! "no key selected" unrepresentable. Sorting uses the standard library's
//! stable sort, so ties keep their snapshot order and output stays
//! deterministic across runs.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use kube::ResourceExt;

use crate::crd::{ready_status, Certificate};
use crate::diagnose::Diagnosis;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    /// Certificate name
    Name,
    /// Ready-state ("" sorts before any reported condition)
    Ready,
    /// Validity start (missing sorts first)
    From,
    /// Validity end (missing sorts first)
    To,
    /// Issuer name
    Issuer,
}

/// Total order over certificates for the given key, ascending.
pub fn compare(key: SortKey, a: &Certificate, b: &Certificate) -> Ordering {
    match key {
        SortKey::Name => a.name_any().cmp(&b.name_any()),
        SortKey::Ready => ready_status(a).cmp(ready_status(b)),
        SortKey::From => not_before(a).cmp(&not_before(b)),
        SortKey::To => not_after(a).cmp(&not_after(b)),
        SortKey::Issuer => a.spec.issuer_ref.name.cmp(&b.spec.issuer_ref.name),
    }
}

pub fn sort_diagnoses(diagnoses: &mut [Diagnosis], key: SortKey) {
    diagnoses.sort_by(|a, b| compare(key, &a.certificate, &b.certificate));
}

fn not_before(cert: &Certificate) -> Option<DateTime<Utc>> {
    cert.status.as_ref()?.not_before.as_ref().map(|t| t.0)
}

fn not_after(cert: &Certificate) -> Option<DateTime<Utc>> {
    cert.status.as_ref()?.not_after.as_ref().map(|t| t.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{CertificateStatus, Condition};
    use crate::fixtures::{certificate, time_days_ago};

    fn diag(cert: Certificate) -> Diagnosis {
        Diagnosis {
            certificate: cert,
            issues: Vec::new(),
        }
    }

    fn names(diagnoses: &[Diagnosis]) -> Vec<String> {
        diagnoses.iter().map(|d| d.certificate.name_any()).collect()
    }

    #[test]
    fn sorts_by_name() {
        let mut list = vec![
            diag(certificate("ns1", "b", "u1", "Issuer", "issuerb")),
            diag(certificate("ns1", "a", "u2", "Issuer", "issuera")),
            diag(certificate("ns1", "c", "u3", "Issuer", "issuerc")),
        ];
        sort_diagnoses(&mut list, SortKey::Name);
        assert_eq!(names(&list), vec!["a", "b", "c"]);
    }

    #[test]
    fn sorts_by_issuer_name() {
        let mut list = vec![
            diag(certificate("ns1", "c", "u1", "Issuer", "issuerc")),
            diag(certificate("ns1", "a", "u2", "Issuer", "issuera")),
            diag(certificate("ns1", "b", "u3", "Issuer", "issuerb")),
        ];
        sort_diagnoses(&mut list, SortKey::Issuer);
        assert_eq!(names(&list), vec!["a", "b", "c"]);
    }

    #[test]
    fn sorts_not_before_chronologically_ascending() {
        let with_start = |name: &str, days_ago: i64| {
            let mut cert = certificate("ns1", name, name, "Issuer", "le");
            cert.status = Some(CertificateStatus {
                not_before: Some(time_days_ago(days_ago)),
                ..Default::default()
            });
            diag(cert)
        };
        // Earliest notBefore (-3 days) must come first.
        let mut list = vec![with_start("b", 2), with_start("a", 3), with_start("c", 1)];
        sort_diagnoses(&mut list, SortKey::From);
        assert_eq!(names(&list), vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_timestamp_sorts_before_any_present_one() {
        let mut dated = certificate("ns1", "dated", "u1", "Issuer", "le");
        dated.status = Some(CertificateStatus {
            not_after: Some(time_days_ago(1)),
            ..Default::default()
        });
        let undated = certificate("ns1", "undated", "u2", "Issuer", "le");

        let mut list = vec![diag(dated), diag(undated)];
        sort_diagnoses(&mut list, SortKey::To);
        assert_eq!(names(&list), vec!["undated", "dated"]);
    }

    #[test]
    fn empty_readiness_sorts_before_any_condition_value() {
        let mut ready = certificate("ns1", "ready", "u1", "Issuer", "le");
        ready.status = Some(CertificateStatus {
            conditions: vec![Condition {
                last_transition_time: None,
                message: String::new(),
                reason: String::new(),
                status: "True".into(),
                condition_type: "Ready".into(),
            }],
            ..Default::default()
        });
        let unreported = certificate("ns1", "unreported", "u2", "Issuer", "le");

        let mut list = vec![diag(ready), diag(unreported)];
        sort_diagnoses(&mut list, SortKey::Ready);
        assert_eq!(names(&list), vec!["unreported", "ready"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut list = vec![
            diag(certificate("ns2", "same", "u1", "Issuer", "le")),
            diag(certificate("ns1", "same", "u2", "Issuer", "le")),
        ];
        sort_diagnoses(&mut list, SortKey::Name);
        let namespaces: Vec<_> = list
            .iter()
            .map(|d| d.certificate.metadata.namespace.clone().unwrap())
            .collect();
        assert_eq!(namespaces, vec!["ns2", "ns1"]);
    }
}
