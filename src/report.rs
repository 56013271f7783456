//! Projection of diagnosed certificates into display rows, plus a padded
//! column renderer in the style of Go's tabwriter.

use std::io::{self, Write};

use chrono::SecondsFormat;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::ResourceExt;

use crate::crd::ready_status;
use crate::diagnose::Diagnosis;

const HEADERS: [&str; 7] = [
    "NAMESPACE",
    "NAME",
    "READY",
    "VALID FROM",
    "VALID TO",
    "ISSUER",
    "ISSUES",
];

/// Gutter between columns, matching the original tabwriter padding.
const GUTTER: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub namespace: String,
    pub name: String,
    pub ready: String,
    pub not_before: String,
    pub not_after: String,
    pub issuer: String,
    pub issues: String,
}

pub fn project(diagnoses: &[Diagnosis]) -> Vec<Row> {
    diagnoses
        .iter()
        .map(|d| {
            let cert = &d.certificate;
            let status = cert.status.as_ref();
            Row {
                namespace: cert.namespace().unwrap_or_default(),
                name: cert.name_any(),
                ready: ready_status(cert).to_string(),
                not_before: format_time(status.and_then(|s| s.not_before.as_ref())),
                not_after: format_time(status.and_then(|s| s.not_after.as_ref())),
                issuer: cert.spec.issuer_ref.name.clone(),
                issues: d.issues.join("; "),
            }
        })
        .collect()
}

pub fn format_time(t: Option<&Time>) -> String {
    t.map(|t| t.0.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

pub fn render<W: Write>(w: &mut W, rows: &[Row]) -> io::Result<()> {
    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in cells(row).iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    write_line(w, &widths, &HEADERS.map(String::from))?;
    for row in rows {
        write_line(w, &widths, &cells(row))?;
    }
    Ok(())
}

fn cells(row: &Row) -> [String; 7] {
    [
        row.namespace.clone(),
        row.name.clone(),
        row.ready.clone(),
        row.not_before.clone(),
        row.not_after.clone(),
        row.issuer.clone(),
        row.issues.clone(),
    ]
}

fn write_line<W: Write>(w: &mut W, widths: &[usize], cells: &[String; 7]) -> io::Result<()> {
    for (i, cell) in cells.iter().enumerate() {
        if i + 1 == cells.len() {
            writeln!(w, "{cell}")?;
        } else {
            write!(w, "{cell:<width$}", width = widths[i] + GUTTER)?;
        }
    }
    Ok(())
}
