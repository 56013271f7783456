use crate::crd::{Certificate, CertificateRequest, Challenge, ClusterIssuer, Issuer, Order};

/// Immutable, in-memory view of all diagnosis-relevant resources for one
/// scope. Built once, eagerly, before any diagnosis runs; resolvers only
/// ever borrow from it. ClusterIssuers are always cluster-wide regardless
/// of the scope the rest was listed under.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub certificates: Vec<Certificate>,
    pub issuers: Vec<Issuer>,
    pub cluster_issuers: Vec<ClusterIssuer>,
    pub requests: Vec<CertificateRequest>,
    pub orders: Vec<Order>,
    pub challenges: Vec<Challenge>,
}
