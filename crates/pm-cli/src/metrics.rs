//! Measurement export for `export-metrics` and `snapshot`
//!
//! Every host contributes its own measurement document plus one per disk
//! partition and one per database. Documents are tagged with the host name
//! and stripped of their `links` before they are written out.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pm_rest_api_contract::{is_error_document, results, ApiDocument, MeasurementQuery};
use pm_rest_client::OpsManagerClient;
use serde_json::{json, Map};
use tracing::{info, warn};

use crate::inventory::{all_pages, describe_error, require_id, resolve_group};

#[derive(Args)]
pub struct MeasurementArgs {
    /// ISO-8601 duration between data points
    #[arg(long, default_value = "PT1M")]
    pub granularity: String,

    /// ISO-8601 duration of history to fetch
    #[arg(long, default_value = "P3D")]
    pub period: String,
}

impl MeasurementArgs {
    pub fn query(&self) -> Result<MeasurementQuery> {
        let query = MeasurementQuery::for_period(&self.granularity, &self.period);
        query.validate()?;
        Ok(query)
    }
}

#[derive(Args)]
pub struct ExportArgs {
    /// Group name
    #[arg(long)]
    pub group: String,

    #[command(flatten)]
    pub measurements: MeasurementArgs,
}

impl ExportArgs {
    /// Write one JSON line per measurement document; returns the line count.
    pub fn run(self, client: &OpsManagerClient, out: &mut dyn Write) -> Result<usize> {
        let query = self.measurements.query()?;
        let group = resolve_group(client, &self.group)?;
        let group_id = require_id(&group, "group")?;
        let hosts = all_pages("hosts", |page| client.get_hosts(group_id, page))?;

        let mut written = 0;
        for host in &hosts {
            for document in host_measurements(client, group_id, host, &query)? {
                serde_json::to_writer(&mut *out, &document)?;
                writeln!(out)?;
                written += 1;
            }
        }
        out.flush()?;

        info!(group = %self.group, hosts = hosts.len(), documents = written, "export finished");
        Ok(written)
    }
}

#[derive(Args)]
pub struct SnapshotArgs {
    /// File the snapshot is written to
    #[arg(long, short, default_value = "data.json")]
    pub output: PathBuf,

    #[command(flatten)]
    pub measurements: MeasurementArgs,
}

impl SnapshotArgs {
    pub fn run(self, client: &OpsManagerClient, server: &str) -> Result<()> {
        let query = self.measurements.query()?;
        let snapshot = collect_snapshot(client, server, &query)?;

        let file = File::create(&self.output)
            .with_context(|| format!("cannot create {}", self.output.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writer.flush()?;

        info!(output = %self.output.display(), "snapshot written");
        Ok(())
    }
}

/// `{username, server, groups: {name: {id, hosts: {host: {id, metrics}}}}}` for every group.
pub fn collect_snapshot(
    client: &OpsManagerClient,
    server: &str,
    query: &MeasurementQuery,
) -> Result<ApiDocument> {
    let mut groups = Map::new();
    for group in all_pages("groups", |page| client.get_groups(page))? {
        let group_id = require_id(&group, "group")?;
        let name = group
            .get("name")
            .and_then(ApiDocument::as_str)
            .unwrap_or(group_id)
            .to_string();

        let mut hosts = Map::new();
        for host in all_pages("hosts", |page| client.get_hosts(group_id, page))? {
            let host_id = require_id(&host, "host")?;
            let metrics = host_measurements(client, group_id, &host, query)?;
            hosts.insert(host_label(&host), json!({ "id": host_id, "metrics": metrics }));
        }
        info!(group = %name, hosts = hosts.len(), "collected group");
        groups.insert(name, json!({ "id": group_id, "hosts": hosts }));
    }

    Ok(json!({
        "username": client.credentials().principal(),
        "server": server,
        "groups": groups,
    }))
}

/// Host, disk and database measurements of one host, error documents skipped.
pub fn host_measurements(
    client: &OpsManagerClient,
    group_id: &str,
    host: &ApiDocument,
    query: &MeasurementQuery,
) -> Result<Vec<ApiDocument>> {
    let host_id = require_id(host, "host")?;
    let hostname = host
        .get("hostname")
        .and_then(ApiDocument::as_str)
        .unwrap_or(host_id);

    let mut documents = vec![client.get_host_measurements(group_id, host_id, query)?];

    let disks = client.get_disks(group_id, host_id)?;
    for partition in names(&disks, "partitionName", hostname) {
        documents.push(client.get_disk_measurements(group_id, host_id, &partition, query)?);
    }

    let databases = client.get_databases(group_id, host_id)?;
    for database in names(&databases, "databaseName", hostname) {
        documents.push(client.get_database_measurements(group_id, host_id, &database, query)?);
    }

    Ok(documents
        .into_iter()
        .filter_map(|document| tag_document(document, hostname))
        .collect())
}

/// `hostname:port`, so several processes on one machine stay apart.
fn host_label(host: &ApiDocument) -> String {
    let hostname = host
        .get("hostname")
        .and_then(ApiDocument::as_str)
        .or_else(|| host.get("id").and_then(ApiDocument::as_str))
        .unwrap_or_default();
    match host.get("port").and_then(ApiDocument::as_u64) {
        Some(port) => format!("{hostname}:{port}"),
        None => hostname.to_string(),
    }
}

fn names(listing: &ApiDocument, field: &str, hostname: &str) -> Vec<String> {
    let Some(items) = results(listing) else {
        warn!(hostname, field, error = %describe_error(listing), "cannot list sub-resources");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| item.get(field).and_then(ApiDocument::as_str))
        .map(str::to_string)
        .collect()
}

fn tag_document(mut document: ApiDocument, hostname: &str) -> Option<ApiDocument> {
    if is_error_document(&document) {
        warn!(hostname, error = %describe_error(&document), "skipping measurement");
        return None;
    }
    if let Some(fields) = document.as_object_mut() {
        fields.remove("links");
        fields.insert("hostname".to_string(), json!(hostname));
    }
    Some(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_label_includes_port() {
        let host = json!({"id": "h1", "hostname": "db1.example.com", "port": 27017});
        assert_eq!(host_label(&host), "db1.example.com:27017");
        assert_eq!(host_label(&json!({"id": "h2"})), "h2");
    }

    #[test]
    fn test_tag_document_strips_links() {
        let tagged = tag_document(
            json!({"hostId": "h1", "measurements": [], "links": [{"rel": "self"}]}),
            "db1.example.com",
        )
        .unwrap();
        assert_eq!(
            tagged,
            json!({"hostId": "h1", "measurements": [], "hostname": "db1.example.com"})
        );
    }

    #[test]
    fn test_tag_document_skips_errors() {
        let error = json!({"error": 404, "errorCode": "RESOURCE_NOT_FOUND", "detail": "gone"});
        assert!(tag_document(error, "db1.example.com").is_none());
    }

    #[test]
    fn test_names_of_error_listing_is_empty() {
        let listing = json!({"error": 500, "detail": "unavailable"});
        assert!(names(&listing, "partitionName", "db1").is_empty());

        let listing = json!({"results": [{"partitionName": "sda1"}, {"other": 1}]});
        assert_eq!(names(&listing, "partitionName", "db1"), vec!["sda1".to_string()]);
    }

    #[test]
    fn test_invalid_period_is_rejected() {
        let args = MeasurementArgs {
            granularity: "PT1M".to_string(),
            period: "three days".to_string(),
        };
        assert!(args.query().is_err());
    }
}
