use anyhow::{Context, Result};
use futures::try_join;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams};
use kube::Client;
use serde::de::DeserializeOwned;

use crate::crd::{Certificate, CertificateRequest, Challenge, ClusterIssuer, Issuer, Order};
use crate::snapshot::Snapshot;

/// Resource scope for a run: one namespace or the whole cluster.
#[derive(Clone, Debug)]
pub enum Scope {
    Cluster,
    Namespace(String),
}

/// Read-only resource provider backed by the Kubernetes API. Everything is
/// listed eagerly, once; a failed list aborts the run since a partial
/// snapshot would produce false diagnoses.
pub struct ClusterSource {
    client: Client,
}

impl ClusterSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn snapshot(&self, scope: &Scope) -> Result<Snapshot> {
        let (certificates, issuers, requests, orders, challenges, cluster_issuers) = try_join!(
            self.list::<Certificate>(scope, "certificates"),
            self.list::<Issuer>(scope, "issuers"),
            self.list::<CertificateRequest>(scope, "certificaterequests"),
            self.list::<Order>(scope, "orders"),
            self.list::<Challenge>(scope, "challenges"),
            self.list_cluster::<ClusterIssuer>("clusterissuers"),
        )?;

        Ok(Snapshot {
            certificates,
            issuers,
            cluster_issuers,
            requests,
            orders,
            challenges,
        })
    }

    async fn list<K>(&self, scope: &Scope, what: &str) -> Result<Vec<K>>
    where
        K: kube::Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + std::fmt::Debug,
    {
        let api: Api<K> = match scope {
            Scope::Cluster => Api::all(self.client.clone()),
            Scope::Namespace(ns) => Api::namespaced(self.client.clone(), ns),
        };
        let list = api
            .list(&ListParams::default())
            .await
            .with_context(|| format!("listing {what}"))?;
        Ok(list.items)
    }

    async fn list_cluster<K>(&self, what: &str) -> Result<Vec<K>>
    where
        K: kube::Resource<DynamicType = ()> + Clone + DeserializeOwned + std::fmt::Debug,
    {
        let api: Api<K> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .with_context(|| format!("listing {what}"))?;
        Ok(list.items)
    }
}
