// Copyright 2024 the kubectl-listcerts authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

#[macro_use]
extern crate log;

mod client;
mod crd;
mod diagnose;
#[cfg(test)]
mod fixtures;
mod probe;
mod report;
mod resolve;
mod snapshot;
mod sort;

use clap::Parser;
use kube::{Client, Config};

use crate::client::{ClusterSource, Scope};
use crate::probe::NetProbe;
use crate::sort::SortKey;

/// List cert-manager certificates and diagnose stuck issuance chains
#[derive(Parser, Debug)]
#[command(name = "kubectl-listcerts", version)]
struct Opt {
    /// Namespace to inspect (defaults to the kubeconfig current namespace)
    #[arg(short, long, conflicts_with = "all")]
    namespace: Option<String>,

    /// Inspect certificates across all namespaces
    #[arg(short = 'A', long)]
    all: bool,

    /// Sort key for the report
    #[arg(long, value_enum, default_value = "name")]
    sort: SortKey,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Opt::parse();
    debug!("options: {:?}", opt);

    let config = Config::infer().await?;
    let scope = if opt.all {
        Scope::Cluster
    } else {
        let ns = opt
            .namespace
            .clone()
            .unwrap_or_else(|| config.default_namespace.clone());
        Scope::Namespace(ns)
    };
    debug!("scope: {:?}", scope);

    let client = Client::try_from(config)?;
    let source = ClusterSource::new(client);
    let snap = source.snapshot(&scope).await?;
    info!(
        "snapshot: {} certificates, {} requests, {} orders, {} challenges",
        snap.certificates.len(),
        snap.requests.len(),
        snap.orders.len(),
        snap.challenges.len()
    );

    let probe = NetProbe::from_system()?;
    let mut diagnoses = diagnose::diagnose_all(&snap, &probe).await;
    sort::sort_diagnoses(&mut diagnoses, opt.sort);

    let rows = report::project(&diagnoses);
    report::render(&mut std::io::stdout().lock(), &rows)?;
    Ok(())
}
