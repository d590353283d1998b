use std::sync::Arc;

use pm_cli::connection::ConnectionArgs;
use pm_cli::{Cli, Commands, Parser};
use pm_client_api::Credentials;
use pm_rest_client::OpsManagerClient;
use pm_rest_client_mock::{error_document, page_of, RecordingTransport};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const SERVER: &str = "https://opsmanager.example.com";

fn setup(responses: Vec<Value>) -> (Arc<RecordingTransport>, OpsManagerClient) {
    let transport = Arc::new(RecordingTransport::with_responses(responses));
    let client = OpsManagerClient::with_transport(
        Credentials::new("ops@example.com", "api-key").unwrap(),
        SERVER,
        transport.clone(),
    )
    .unwrap();
    (transport, client)
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args.iter().copied()).unwrap()
}

fn run(args: &[&str], client: &OpsManagerClient) -> (anyhow::Result<()>, String) {
    let cli = parse(args);
    let mut out = Vec::new();
    let result = cli.command.run(client, &cli.connection.server_url, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn paths(transport: &RecordingTransport) -> Vec<String> {
    transport
        .requests()
        .iter()
        .map(|r| r.path().trim_start_matches("/api/public/v1.0/").to_string())
        .collect()
}

#[test]
fn test_cli_parsing_connection_flags() {
    let cli = parse(&[
        "pingme",
        "--username",
        "ops@example.com",
        "--api-key",
        "secret",
        "--server-url",
        "http://opsmanager.internal:8080",
        "groups",
    ]);

    assert_eq!(cli.connection.username.as_deref(), Some("ops@example.com"));
    assert_eq!(cli.connection.api_key.as_deref(), Some("secret"));
    assert_eq!(cli.connection.server_url, "http://opsmanager.internal:8080");
    assert_eq!(cli.connection.timeout, 30);
    assert!(matches!(cli.command, Commands::Groups(_)));
}

#[test]
fn test_cli_parsing_flags_after_subcommand() {
    let cli = parse(&["pingme", "hosts", "--group", "Ops", "--username", "ops@example.com", "-v"]);

    assert!(cli.verbose);
    assert_eq!(cli.connection.username.as_deref(), Some("ops@example.com"));
    assert!(matches!(cli.command, Commands::Hosts(_)));
}

#[test]
fn test_cli_parsing_export_defaults() {
    let cli = parse(&["pingme", "export-metrics", "--group", "Ops"]);

    let Commands::ExportMetrics(args) = cli.command else {
        panic!("expected export-metrics");
    };
    assert_eq!(args.group, "Ops");
    assert_eq!(args.measurements.granularity, "PT1M");
    assert_eq!(args.measurements.period, "P3D");
}

#[test]
fn test_cli_parsing_snapshot_output() {
    let cli = parse(&["pingme", "snapshot", "--output", "/tmp/out.json", "--period", "P1D"]);

    let Commands::Snapshot(args) = cli.command else {
        panic!("expected snapshot");
    };
    assert_eq!(args.output.to_str(), Some("/tmp/out.json"));
    assert_eq!(args.measurements.period, "P1D");
}

#[test]
fn test_cli_requires_group_for_hosts() {
    assert!(Cli::try_parse_from(["pingme", "hosts"]).is_err());
    assert!(Cli::try_parse_from(["pingme", "export-metrics"]).is_err());
}

#[test]
fn test_groups_prints_page() {
    let page = page_of([json!({"id": "g1", "name": "Ops"})]);
    let (transport, client) = setup(vec![page.clone()]);

    let (result, out) = run(&["pingme", "groups", "--page", "2"], &client);

    result.unwrap();
    assert_eq!(serde_json::from_str::<Value>(&out).unwrap(), page);
    assert_eq!(transport.last_request().unwrap().query_values("pageNum"), vec!["2".to_string()]);
}

#[test]
fn test_hosts_resolves_group_by_name() {
    let (transport, client) = setup(vec![
        json!({"id": "g1", "name": "App Servers"}),
        page_of([json!({"id": "h1", "hostname": "db1.example.com", "port": 27017})]),
    ]);

    let (result, out) = run(&["pingme", "hosts", "--group", "App Servers"], &client);

    result.unwrap();
    assert!(out.contains("db1.example.com"));
    assert_eq!(
        paths(&transport),
        vec!["groups/byName/App%20Servers".to_string(), "groups/g1/hosts".to_string()]
    );
}

#[test]
fn test_unknown_group_fails_after_one_request() {
    let (transport, client) = setup(vec![error_document(404, "NOT_IN_GROUP", "No group named Nope.")]);

    let (result, out) = run(&["pingme", "agents", "--group", "Nope"], &client);

    let message = result.unwrap_err().to_string();
    assert!(message.contains("No group named Nope."), "{message}");
    assert!(out.is_empty());
    assert_eq!(transport.request_count(), 1);
}

#[test]
fn test_agents_prints_combined_listing() {
    let (_, client) = setup(vec![
        json!({"id": "g1", "name": "Ops"}),
        page_of([json!({"typeName": "MONITORING", "hostname": "mon1"})]),
        page_of([json!({"typeName": "BACKUP", "hostname": "bak1"})]),
        page_of(Vec::<Value>::new()),
    ]);

    let (result, out) = run(&["pingme", "agents", "--group", "Ops"], &client);

    result.unwrap();
    let printed: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        printed,
        json!([
            {"typeName": "MONITORING", "hostname": "mon1"},
            {"typeName": "BACKUP", "hostname": "bak1"},
        ])
    );
}

#[test]
fn test_export_metrics_writes_one_line_per_series() {
    let (transport, client) = setup(vec![
        json!({"id": "g1", "name": "Ops"}),
        page_of([json!({"id": "h1", "hostname": "db1.example.com", "port": 27017})]),
        json!({"hostId": "h1", "measurements": [{"name": "OPCOUNTER_CMD"}], "links": [{"rel": "self"}]}),
        page_of([json!({"partitionName": "sda1"})]),
        json!({"partitionName": "sda1", "measurements": [], "links": []}),
        page_of([json!({"databaseName": "admin"}), json!({"databaseName": "local"})]),
        json!({"databaseName": "admin", "measurements": []}),
        error_document(404, "DATABASE_NOT_FOUND", "No database named local."),
    ]);

    let (result, out) = run(
        &["pingme", "export-metrics", "--group", "Ops", "--granularity", "PT5M", "--period", "P1D"],
        &client,
    );

    result.unwrap();
    let lines: Vec<Value> = out
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(
        lines,
        vec![
            json!({"hostId": "h1", "measurements": [{"name": "OPCOUNTER_CMD"}], "hostname": "db1.example.com"}),
            json!({"partitionName": "sda1", "measurements": [], "hostname": "db1.example.com"}),
            json!({"databaseName": "admin", "measurements": [], "hostname": "db1.example.com"}),
        ]
    );

    assert_eq!(
        paths(&transport),
        vec![
            "groups/byName/Ops",
            "groups/g1/hosts",
            "groups/g1/hosts/h1/measurements",
            "groups/g1/hosts/h1/disks",
            "groups/g1/hosts/h1/disks/sda1/measurements",
            "groups/g1/hosts/h1/databases",
            "groups/g1/hosts/h1/databases/admin/measurements",
            "groups/g1/hosts/h1/databases/local/measurements",
        ]
    );
    let measurement = &transport.requests()[2];
    assert_eq!(measurement.query_values("granularity"), vec!["PT5M".to_string()]);
    assert_eq!(measurement.query_values("period"), vec!["P1D".to_string()]);
    assert_eq!(transport.pending_responses(), 0);
}

#[test]
fn test_export_metrics_rejects_bad_period_before_any_request() {
    let (transport, client) = setup(Vec::new());

    let (result, _) = run(&["pingme", "export-metrics", "--group", "Ops", "--period", "3 days"], &client);

    assert!(result.is_err());
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn test_export_metrics_follows_host_pages() {
    let (transport, client) = setup(vec![
        json!({"id": "g1", "name": "Ops"}),
        json!({"results": [{"id": "h1", "hostname": "db1"}], "totalCount": 2}),
        json!({"results": [{"id": "h2", "hostname": "db2"}], "totalCount": 2}),
        json!({"measurements": []}),
        page_of(Vec::<Value>::new()),
        page_of(Vec::<Value>::new()),
        json!({"measurements": []}),
        page_of(Vec::<Value>::new()),
        page_of(Vec::<Value>::new()),
    ]);

    let (result, out) = run(&["pingme", "export-metrics", "--group", "Ops"], &client);

    result.unwrap();
    assert_eq!(out.lines().count(), 2);
    let requests = transport.requests();
    assert_eq!(requests[1].query_values("pageNum"), vec!["1".to_string()]);
    assert_eq!(requests[2].query_values("pageNum"), vec!["2".to_string()]);
    assert!(out.lines().nth(1).unwrap().contains("\"hostname\":\"db2\""));
}

#[test]
fn test_snapshot_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("data.json");
    let (_, client) = setup(vec![
        page_of([json!({"id": "g1", "name": "Ops"})]),
        page_of([json!({"id": "h1", "hostname": "db1.example.com", "port": 27017})]),
        json!({"hostId": "h1", "measurements": []}),
        page_of(Vec::<Value>::new()),
        page_of(Vec::<Value>::new()),
    ]);

    let (result, out) = run(
        &["pingme", "--server-url", SERVER, "snapshot", "--output", output.to_str().unwrap()],
        &client,
    );

    result.unwrap();
    assert!(out.is_empty());
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        written,
        json!({
            "username": "ops@example.com",
            "server": SERVER,
            "groups": {
                "Ops": {
                    "id": "g1",
                    "hosts": {
                        "db1.example.com:27017": {
                            "id": "h1",
                            "metrics": [{"hostId": "h1", "measurements": [], "hostname": "db1.example.com"}]
                        }
                    }
                }
            }
        })
    );
}

#[test]
fn test_missing_credentials_are_reported() {
    let connection = |username: Option<&str>, api_key: Option<&str>| ConnectionArgs {
        username: username.map(str::to_string),
        api_key: api_key.map(str::to_string),
        server_url: SERVER.to_string(),
        timeout: 30,
    };

    let message = connection(None, Some("secret")).connect().unwrap_err().to_string();
    assert!(message.contains("--username"), "{message}");

    let message = connection(Some("ops@example.com"), None).connect().unwrap_err().to_string();
    assert!(message.contains("--api-key"), "{message}");

    let credentials = connection(Some("ops@example.com"), Some("secret")).credentials().unwrap();
    assert_eq!(credentials.principal(), "ops@example.com");
}
