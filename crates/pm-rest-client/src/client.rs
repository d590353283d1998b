//! Main REST API client implementation

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use pm_client_api::{Credentials, Transport};
use pm_rest_api_contract::validation::{
    require_compound_key, require_identifier, require_object, require_object_array,
    validate_alert_config, validate_backup_config, validate_cluster_restore_job,
    validate_config_server_restore_job, validate_host_update, validate_maintenance_window,
    validate_new_host,
};
use pm_rest_api_contract::*;
use serde_json::json;
use tracing::instrument;
use url::Url;

use crate::config::ClientConfig;
use crate::deprecation;
use crate::error::{RestClientError, RestClientResult};
use crate::transport::ReqwestTransport;

/// Client for the Ops Manager / Cloud Manager public API.
///
/// Every operation validates its input, builds one [`RequestDescriptor`] and
/// sends it through the configured [`Transport`]. Responses are returned as
/// decoded JSON, error documents included.
pub struct OpsManagerClient {
    transport: Arc<dyn Transport>,
    credentials: Credentials,
    base_url: Url,
    profile: Mutex<Option<ApiDocument>>,
}

impl fmt::Debug for OpsManagerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpsManagerClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl OpsManagerClient {
    /// Create a client that talks HTTP through [`ReqwestTransport`].
    pub fn new(credentials: Credentials, config: &ClientConfig) -> RestClientResult<Self> {
        let transport = ReqwestTransport::new(config)?;
        Self::with_transport(credentials, &config.endpoint, Arc::new(transport))
    }

    /// Create a client over any transport.
    pub fn with_transport(
        credentials: Credentials,
        endpoint: &str,
        transport: Arc<dyn Transport>,
    ) -> RestClientResult<Self> {
        let base_url = api_base_url(endpoint)?;
        Ok(Self {
            transport,
            credentials,
            base_url,
            profile: Mutex::new(None),
        })
    }

    /// Versioned API base URL, ending in `api/public/v1.0/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Credentials every request is authenticated with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// List one page of the groups visible to the caller.
    pub fn get_groups(&self, page: &PageQuery) -> RestClientResult<ApiDocument> {
        page.validate()?;
        self.execute(RequestDescriptor::get(["groups"]).with_page(page))
    }

    /// Get a group by id.
    pub fn get_group(&self, group_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        self.execute(RequestDescriptor::get(["groups", group_id]))
    }

    /// Get a group by its name.
    pub fn get_group_by_name(&self, group_name: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_name, "group_name")?;
        self.execute(RequestDescriptor::get(["groups", "byName", group_name]))
    }

    /// Create a group with the given name.
    #[instrument(skip(self))]
    pub fn create_group(&self, group_name: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_name, "group_name")?;
        self.execute(RequestDescriptor::post(["groups"], json!({ "name": group_name })))
    }

    /// Delete a group.
    #[instrument(skip(self))]
    pub fn delete_group(&self, group_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        self.execute(RequestDescriptor::delete(["groups", group_id]))
    }

    /// List one page of the users of a group.
    pub fn get_group_users(&self, group_id: &str, page: &PageQuery) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        page.validate()?;
        self.execute(RequestDescriptor::get(["groups", group_id, "users"]).with_page(page))
    }

    /// Add existing users to a group; `users` is an array of `{"id": ..., "roles": [...]}`.
    #[instrument(skip(self, users))]
    pub fn add_users_to_group(
        &self,
        group_id: &str,
        users: &ApiDocument,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_object_array(users, "users")?;
        self.execute(RequestDescriptor::post(["groups", group_id, "users"], users.clone()))
    }

    /// Remove a user from a group.
    #[instrument(skip(self))]
    pub fn remove_user_from_group(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(user_id, "user_id")?;
        self.execute(RequestDescriptor::delete(["groups", group_id, "users", user_id]))
    }

    // ========================================================================
    // Hosts
    // ========================================================================

    /// List one page of the hosts of a group.
    pub fn get_hosts(&self, group_id: &str, page: &PageQuery) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        page.validate()?;
        self.execute(RequestDescriptor::get(["groups", group_id, "hosts"]).with_page(page))
    }

    /// Get a host by id.
    pub fn get_host(&self, group_id: &str, host_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        self.execute(RequestDescriptor::get(["groups", group_id, "hosts", host_id]))
    }

    /// Look a host up by its `hostname:port` key.
    pub fn get_host_by_name(&self, group_id: &str, host_name: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_compound_key(host_name, "host_name", ':')?;
        self.execute(RequestDescriptor::get([
            "groups", group_id, "hosts", "byName", host_name,
        ]))
    }

    /// Get a host by hostname and port.
    pub fn get_host_by_hostname_and_port(
        &self,
        group_id: &str,
        hostname: &str,
        port: u16,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(hostname, "hostname")?;
        if port == 0 {
            return Err(ApiContractError::invalid_argument(
                "port",
                "must be a port between 1 and 65535",
            )
            .into());
        }
        self.get_host_by_name(group_id, &format!("{hostname}:{port}"))
    }

    /// Start monitoring a new host.
    #[instrument(skip(self, host))]
    pub fn create_host(&self, group_id: &str, host: &ApiDocument) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        validate_new_host(host, "host")?;
        self.execute(RequestDescriptor::post(["groups", group_id, "hosts"], host.clone()))
    }

    /// Partial update; only the fields present in `host` are checked and changed.
    #[instrument(skip(self, host))]
    pub fn update_host(
        &self,
        group_id: &str,
        host_id: &str,
        host: &ApiDocument,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        validate_host_update(host, "host")?;
        self.execute(RequestDescriptor::patch(
            ["groups", group_id, "hosts", host_id],
            host.clone(),
        ))
    }

    /// Stop monitoring a host.
    #[instrument(skip(self))]
    pub fn delete_host(&self, group_id: &str, host_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        self.execute(RequestDescriptor::delete(["groups", group_id, "hosts", host_id]))
    }

    /// Last ping the monitoring agent sent for a host.
    pub fn get_last_ping(&self, group_id: &str, host_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        self.execute(RequestDescriptor::get([
            "groups", group_id, "hosts", host_id, "lastPing",
        ]))
    }

    // ========================================================================
    // Agents
    // ========================================================================

    /// First page of monitoring agents of a group.
    pub fn get_monitoring_agents(&self, group_id: &str) -> RestClientResult<ApiDocument> {
        self.agents_of_type(group_id, AgentType::Monitoring, None)
    }

    /// First page of backup agents of a group.
    pub fn get_backup_agents(&self, group_id: &str) -> RestClientResult<ApiDocument> {
        self.agents_of_type(group_id, AgentType::Backup, None)
    }

    /// First page of automation agents of a group.
    pub fn get_automation_agents(&self, group_id: &str) -> RestClientResult<ApiDocument> {
        self.agents_of_type(group_id, AgentType::Automation, None)
    }

    /// One page of agents of the given type.
    pub fn get_agents_by_type(
        &self,
        group_id: &str,
        agent_type: AgentType,
        page: &PageQuery,
    ) -> RestClientResult<ApiDocument> {
        self.agents_of_type(group_id, agent_type, Some(page))
    }

    /// Every agent in the group, in the order monitoring, backup, automation.
    ///
    /// Fails as a whole if any of the three listings fails or comes back
    /// without a `results` array.
    #[instrument(skip(self))]
    pub fn get_agents(&self, group_id: &str) -> RestClientResult<Vec<ApiDocument>> {
        require_identifier(group_id, "group_id")?;

        let mut agents = Vec::new();
        for agent_type in AgentType::ALL {
            let listing = self.agents_of_type(group_id, agent_type, None)?;
            let items = results(&listing).ok_or_else(|| {
                RestClientError::UnexpectedDocument(format!(
                    "{agent_type} agent listing has no results array"
                ))
            })?;
            agents.extend(items.iter().cloned());
        }
        Ok(agents)
    }

    fn agents_of_type(
        &self,
        group_id: &str,
        agent_type: AgentType,
        page: Option<&PageQuery>,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        let mut descriptor =
            RequestDescriptor::get(["groups", group_id, "agents", agent_type.as_str()]);
        if let Some(page) = page {
            page.validate()?;
            descriptor = descriptor.with_page(page);
        }
        self.execute(descriptor)
    }

    // ========================================================================
    // Metrics (retired)
    // ========================================================================

    /// List the metrics available for a host.
    #[deprecated(note = "use get_host_measurements")]
    pub fn get_metrics(&self, group_id: &str, host_id: &str) -> RestClientResult<ApiDocument> {
        deprecation::GET_METRICS.wrap(|| {
            require_identifier(group_id, "group_id")?;
            require_identifier(host_id, "host_id")?;
            self.execute(RequestDescriptor::get([
                "groups", group_id, "hosts", host_id, "metrics",
            ]))
        })
    }

    /// One metric series of a host.
    #[deprecated(note = "use get_host_measurements")]
    pub fn get_metric(
        &self,
        group_id: &str,
        host_id: &str,
        metric_id: &str,
        window: &LegacyMetricWindow,
    ) -> RestClientResult<ApiDocument> {
        deprecation::GET_METRIC.wrap(|| {
            self.legacy_metric(group_id, host_id, metric_id, None, window)
        })
    }

    /// One metric series of a host device.
    #[deprecated(note = "use get_disk_measurements")]
    pub fn get_device_metric(
        &self,
        group_id: &str,
        host_id: &str,
        metric_id: &str,
        device_name: &str,
        window: &LegacyMetricWindow,
    ) -> RestClientResult<ApiDocument> {
        deprecation::GET_DEVICE_METRIC.wrap(|| {
            require_identifier(device_name, "device_name")?;
            self.legacy_metric(group_id, host_id, metric_id, Some(device_name), window)
        })
    }

    /// One metric series of a database on a host.
    #[deprecated(note = "use get_database_measurements")]
    pub fn get_database_metric(
        &self,
        group_id: &str,
        host_id: &str,
        metric_id: &str,
        database_name: &str,
        window: &LegacyMetricWindow,
    ) -> RestClientResult<ApiDocument> {
        deprecation::GET_DATABASE_METRIC.wrap(|| {
            require_identifier(database_name, "database_name")?;
            self.legacy_metric(group_id, host_id, metric_id, Some(database_name), window)
        })
    }

    fn legacy_metric(
        &self,
        group_id: &str,
        host_id: &str,
        metric_id: &str,
        qualifier: Option<&str>,
        window: &LegacyMetricWindow,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        require_identifier(metric_id, "metric_id")?;
        window.validate()?;

        let mut segments = vec!["groups", group_id, "hosts", host_id, "metrics", metric_id];
        segments.extend(qualifier);
        self.execute(
            RequestDescriptor::get(segments)
                .with_query("granularity", &window.granularity)
                .with_query("period", &window.period),
        )
    }

    // ========================================================================
    // Measurements
    // ========================================================================

    /// Process measurements of a host.
    #[instrument(skip(self))]
    pub fn get_host_measurements(
        &self,
        group_id: &str,
        host_id: &str,
        query: &MeasurementQuery,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        query.validate()?;
        self.execute(
            RequestDescriptor::get(["groups", group_id, "hosts", host_id, "measurements"])
                .with_measurements(query),
        )
    }

    /// List the disk partitions of a host.
    pub fn get_disks(&self, group_id: &str, host_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        self.execute(RequestDescriptor::get(["groups", group_id, "hosts", host_id, "disks"]))
    }

    /// Measurements of one disk partition.
    #[instrument(skip(self))]
    pub fn get_disk_measurements(
        &self,
        group_id: &str,
        host_id: &str,
        partition_name: &str,
        query: &MeasurementQuery,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        require_identifier(partition_name, "partition_name")?;
        query.validate()?;
        self.execute(
            RequestDescriptor::get([
                "groups",
                group_id,
                "hosts",
                host_id,
                "disks",
                partition_name,
                "measurements",
            ])
            .with_measurements(query),
        )
    }

    /// List the databases of a host.
    pub fn get_databases(&self, group_id: &str, host_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        self.execute(RequestDescriptor::get([
            "groups", group_id, "hosts", host_id, "databases",
        ]))
    }

    /// Measurements of one database.
    #[instrument(skip(self))]
    pub fn get_database_measurements(
        &self,
        group_id: &str,
        host_id: &str,
        database_name: &str,
        query: &MeasurementQuery,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        require_identifier(database_name, "database_name")?;
        query.validate()?;
        self.execute(
            RequestDescriptor::get([
                "groups",
                group_id,
                "hosts",
                host_id,
                "databases",
                database_name,
                "measurements",
            ])
            .with_measurements(query),
        )
    }

    // ========================================================================
    // Clusters
    // ========================================================================

    /// List one page of the clusters of a group.
    pub fn get_clusters(&self, group_id: &str, page: &PageQuery) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        page.validate()?;
        self.execute(RequestDescriptor::get(["groups", group_id, "clusters"]).with_page(page))
    }

    /// Get a cluster by id.
    pub fn get_cluster(&self, group_id: &str, cluster_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        self.execute(RequestDescriptor::get(["groups", group_id, "clusters", cluster_id]))
    }

    /// Rename a cluster.
    #[instrument(skip(self))]
    pub fn update_cluster(
        &self,
        group_id: &str,
        cluster_id: &str,
        cluster_name: &str,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        validation::require_text(cluster_name, "cluster_name")?;
        self.execute(RequestDescriptor::patch(
            ["groups", group_id, "clusters", cluster_id],
            json!({ "clusterName": cluster_name }),
        ))
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Get a user by id.
    pub fn get_user(&self, user_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(user_id, "user_id")?;
        self.execute(RequestDescriptor::get(["users", user_id]))
    }

    /// Get a user by username.
    pub fn get_user_by_name(&self, user_name: &str) -> RestClientResult<ApiDocument> {
        require_identifier(user_name, "user_name")?;
        self.execute(RequestDescriptor::get(["users", "byName", user_name]))
    }

    /// Create a user.
    #[instrument(skip(self, user))]
    pub fn create_user(&self, user: &ApiDocument) -> RestClientResult<ApiDocument> {
        require_object(user, "user")?;
        self.execute(RequestDescriptor::post(["users"], user.clone()))
    }

    /// Create the first user of a fresh Ops Manager install (no authentication required).
    #[instrument(skip(self, user))]
    pub fn create_first_user(&self, user: &ApiDocument) -> RestClientResult<ApiDocument> {
        require_object(user, "user")?;
        self.execute(RequestDescriptor::post(["unauth", "users"], user.clone()))
    }

    /// Apply a partial update to a user.
    #[instrument(skip(self, user))]
    pub fn update_user(&self, user_id: &str, user: &ApiDocument) -> RestClientResult<ApiDocument> {
        require_identifier(user_id, "user_id")?;
        require_object(user, "user")?;
        self.execute(RequestDescriptor::patch(["users", user_id], user.clone()))
    }

    /// Profile of the authenticated principal.
    ///
    /// Looked up on first use and kept for the life of the client. The lock is
    /// held across the lookup so concurrent first callers share one request.
    /// Failures and error documents are not kept.
    pub fn current_user(&self) -> RestClientResult<ApiDocument> {
        let mut profile = self.profile.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(document) = profile.as_ref() {
            return Ok(document.clone());
        }

        let document = self.get_user_by_name(self.credentials.principal())?;
        if !is_error_document(&document) {
            *profile = Some(document.clone());
        }
        Ok(document)
    }

    fn current_user_id(&self) -> RestClientResult<String> {
        let profile = self.current_user()?;
        document_id(&profile).map(str::to_owned).ok_or_else(|| {
            RestClientError::UnexpectedDocument(format!(
                "profile for {} has no id",
                self.credentials.principal()
            ))
        })
    }

    // ========================================================================
    // Alerts
    // ========================================================================

    /// List one page of alerts, optionally filtered by status.
    pub fn get_alerts(
        &self,
        group_id: &str,
        status: Option<AlertStatus>,
        page: &PageQuery,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        page.validate()?;
        let mut descriptor = RequestDescriptor::get(["groups", group_id, "alerts"]);
        if let Some(status) = status {
            descriptor = descriptor.with_query("status", status.as_str());
        }
        self.execute(descriptor.with_page(page))
    }

    /// Get an alert by id.
    pub fn get_alert(&self, group_id: &str, alert_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(alert_id, "alert_id")?;
        self.execute(RequestDescriptor::get(["groups", group_id, "alerts", alert_id]))
    }

    /// Acknowledge an alert until the given time.
    #[instrument(skip(self))]
    pub fn acknowledge_alert(
        &self,
        group_id: &str,
        alert_id: &str,
        until: &AcknowledgeUntil,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(alert_id, "alert_id")?;
        self.execute(RequestDescriptor::patch(
            ["groups", group_id, "alerts", alert_id],
            json!({ "acknowledgedUntil": until.to_iso8601() }),
        ))
    }

    /// Alert configurations that triggered an alert.
    pub fn get_alert_configs_for_alert(
        &self,
        group_id: &str,
        alert_id: &str,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(alert_id, "alert_id")?;
        self.execute(RequestDescriptor::get([
            "groups",
            group_id,
            "alerts",
            alert_id,
            "alertConfigs",
        ]))
    }

    // ========================================================================
    // Alert configurations
    // ========================================================================

    /// List one page of alert configurations.
    pub fn get_alert_configs(&self, group_id: &str, page: &PageQuery) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        page.validate()?;
        self.execute(RequestDescriptor::get(["groups", group_id, "alertConfigs"]).with_page(page))
    }

    /// Get an alert configuration by id.
    pub fn get_alert_config(&self, group_id: &str, config_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(config_id, "alert_config_id")?;
        self.execute(RequestDescriptor::get([
            "groups",
            group_id,
            "alertConfigs",
            config_id,
        ]))
    }

    /// Open alerts raised by an alert configuration.
    pub fn get_open_alerts_for_alert_config(
        &self,
        group_id: &str,
        config_id: &str,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(config_id, "alert_config_id")?;
        self.execute(RequestDescriptor::get([
            "groups",
            group_id,
            "alertConfigs",
            config_id,
            "alerts",
        ]))
    }

    /// Create an alert configuration.
    #[instrument(skip(self, config))]
    pub fn create_alert_config(
        &self,
        group_id: &str,
        config: &ApiDocument,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        validate_alert_config(config, "alert_config")?;
        self.execute(RequestDescriptor::post(
            ["groups", group_id, "alertConfigs"],
            config.clone(),
        ))
    }

    /// Replace an alert configuration.
    #[instrument(skip(self, config))]
    pub fn update_alert_config(
        &self,
        group_id: &str,
        config_id: &str,
        config: &ApiDocument,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(config_id, "alert_config_id")?;
        validate_alert_config(config, "alert_config")?;
        self.execute(RequestDescriptor::put(
            ["groups", group_id, "alertConfigs", config_id],
            config.clone(),
        ))
    }

    /// Enable or disable an alert configuration.
    #[instrument(skip(self))]
    pub fn set_alert_config_state(
        &self,
        group_id: &str,
        config_id: &str,
        state: AlertConfigState,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(config_id, "alert_config_id")?;
        self.execute(RequestDescriptor::patch(
            ["groups", group_id, "alertConfigs", config_id],
            json!({ "enabled": state.is_enabled() }),
        ))
    }

    /// Delete an alert configuration.
    #[instrument(skip(self))]
    pub fn delete_alert_config(&self, group_id: &str, config_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(config_id, "alert_config_id")?;
        self.execute(RequestDescriptor::delete([
            "groups",
            group_id,
            "alertConfigs",
            config_id,
        ]))
    }

    // ========================================================================
    // Maintenance windows
    // ========================================================================

    /// List the maintenance windows of a group.
    pub fn get_maintenance_windows(&self, group_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        self.execute(RequestDescriptor::get(["groups", group_id, "maintenanceWindows"]))
    }

    /// Get a maintenance window by id.
    pub fn get_maintenance_window(
        &self,
        group_id: &str,
        window_id: &str,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(window_id, "maintenance_window_id")?;
        self.execute(RequestDescriptor::get([
            "groups",
            group_id,
            "maintenanceWindows",
            window_id,
        ]))
    }

    /// Create a maintenance window.
    #[instrument(skip(self, window))]
    pub fn create_maintenance_window(
        &self,
        group_id: &str,
        window: &ApiDocument,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        validate_maintenance_window(window, "maintenance_window", false)?;
        self.execute(RequestDescriptor::post(
            ["groups", group_id, "maintenanceWindows"],
            window.clone(),
        ))
    }

    /// Update the window identified by the body's `id` field.
    #[instrument(skip(self, window))]
    pub fn update_maintenance_window(
        &self,
        group_id: &str,
        window: &ApiDocument,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        let window_id = validate_maintenance_window(window, "maintenance_window", true)?
            .unwrap_or_default();
        require_identifier(window_id, "maintenance_window.id")?;
        self.execute(RequestDescriptor::patch(
            ["groups", group_id, "maintenanceWindows", window_id],
            window.clone(),
        ))
    }

    /// Delete a maintenance window.
    #[instrument(skip(self))]
    pub fn delete_maintenance_window(
        &self,
        group_id: &str,
        window_id: &str,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(window_id, "maintenance_window_id")?;
        self.execute(RequestDescriptor::delete([
            "groups",
            group_id,
            "maintenanceWindows",
            window_id,
        ]))
    }

    // ========================================================================
    // Backup configurations and snapshot schedules
    // ========================================================================

    /// List one page of backup configurations.
    pub fn get_backup_configs(&self, group_id: &str, page: &PageQuery) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        page.validate()?;
        self.execute(RequestDescriptor::get(["groups", group_id, "backupConfigs"]).with_page(page))
    }

    /// Backup configuration of a cluster.
    pub fn get_backup_config(&self, group_id: &str, cluster_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        self.execute(RequestDescriptor::get([
            "groups",
            group_id,
            "backupConfigs",
            cluster_id,
        ]))
    }

    /// Update the backup configuration of the cluster named by the body's `clusterId`.
    #[instrument(skip(self, config))]
    pub fn update_backup_config(
        &self,
        group_id: &str,
        config: &ApiDocument,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        let cluster_id = validate_backup_config(config, "backup_config", true)?.unwrap_or_default();
        require_identifier(cluster_id, "backup_config.clusterId")?;
        self.execute(RequestDescriptor::patch(
            ["groups", group_id, "backupConfigs", cluster_id],
            config.clone(),
        ))
    }

    /// Update the backup configuration of the given cluster.
    #[instrument(skip(self, config))]
    pub fn update_backup_config_for_cluster(
        &self,
        group_id: &str,
        cluster_id: &str,
        config: &ApiDocument,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        validate_backup_config(config, "backup_config", false)?;
        self.execute(RequestDescriptor::patch(
            ["groups", group_id, "backupConfigs", cluster_id],
            config.clone(),
        ))
    }

    /// Snapshot schedule of a cluster.
    pub fn get_snapshot_schedule(&self, group_id: &str, cluster_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        self.execute(RequestDescriptor::get([
            "groups",
            group_id,
            "backupConfigs",
            cluster_id,
            "snapshotSchedule",
        ]))
    }

    /// Apply a partial update to a snapshot schedule.
    #[instrument(skip(self, schedule))]
    pub fn update_snapshot_schedule(
        &self,
        group_id: &str,
        cluster_id: &str,
        schedule: &ApiDocument,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        require_object(schedule, "snapshot_schedule")?;
        self.execute(RequestDescriptor::patch(
            ["groups", group_id, "backupConfigs", cluster_id, "snapshotSchedule"],
            schedule.clone(),
        ))
    }

    // ========================================================================
    // Snapshots and checkpoints
    // ========================================================================

    /// List one page of snapshots of a cluster.
    pub fn get_snapshots(
        &self,
        group_id: &str,
        cluster_id: &str,
        page: &PageQuery,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        page.validate()?;
        self.execute(
            RequestDescriptor::get(["groups", group_id, "clusters", cluster_id, "snapshots"])
                .with_page(page),
        )
    }

    /// Get a snapshot by id.
    pub fn get_snapshot(
        &self,
        group_id: &str,
        cluster_id: &str,
        snapshot_id: &str,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        require_identifier(snapshot_id, "snapshot_id")?;
        self.execute(RequestDescriptor::get([
            "groups",
            group_id,
            "clusters",
            cluster_id,
            "snapshots",
            snapshot_id,
        ]))
    }

    /// Change when a snapshot expires.
    #[instrument(skip(self))]
    pub fn update_snapshot_expiry(
        &self,
        group_id: &str,
        cluster_id: &str,
        snapshot_id: &str,
        expires: DateTime<Utc>,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        require_identifier(snapshot_id, "snapshot_id")?;
        self.execute(RequestDescriptor::patch(
            ["groups", group_id, "clusters", cluster_id, "snapshots", snapshot_id],
            json!({ "expires": expires.to_rfc3339_opts(SecondsFormat::Secs, true) }),
        ))
    }

    /// Delete a snapshot.
    #[instrument(skip(self))]
    pub fn delete_snapshot(
        &self,
        group_id: &str,
        cluster_id: &str,
        snapshot_id: &str,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        require_identifier(snapshot_id, "snapshot_id")?;
        self.execute(RequestDescriptor::delete([
            "groups",
            group_id,
            "clusters",
            cluster_id,
            "snapshots",
            snapshot_id,
        ]))
    }

    /// List one page of checkpoints of a cluster.
    pub fn get_checkpoints(
        &self,
        group_id: &str,
        cluster_id: &str,
        page: &PageQuery,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        page.validate()?;
        self.execute(
            RequestDescriptor::get(["groups", group_id, "clusters", cluster_id, "checkpoints"])
                .with_page(page),
        )
    }

    /// Get a checkpoint by id.
    pub fn get_checkpoint(
        &self,
        group_id: &str,
        cluster_id: &str,
        checkpoint_id: &str,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        require_identifier(checkpoint_id, "checkpoint_id")?;
        self.execute(RequestDescriptor::get([
            "groups",
            group_id,
            "clusters",
            cluster_id,
            "checkpoints",
            checkpoint_id,
        ]))
    }

    // ========================================================================
    // Restore jobs
    // ========================================================================

    /// List restore jobs of a cluster, optionally for one batch.
    pub fn get_restore_jobs_for_cluster(
        &self,
        group_id: &str,
        cluster_id: &str,
        batch_id: Option<&str>,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        let mut descriptor =
            RequestDescriptor::get(["groups", group_id, "clusters", cluster_id, "restoreJobs"]);
        if let Some(batch_id) = batch_id {
            require_identifier(batch_id, "batch_id")?;
            descriptor = descriptor.with_query("batchId", batch_id);
        }
        self.execute(descriptor)
    }

    /// Get a cluster restore job by id.
    pub fn get_restore_job_for_cluster(
        &self,
        group_id: &str,
        cluster_id: &str,
        job_id: &str,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        require_identifier(job_id, "job_id")?;
        self.execute(RequestDescriptor::get([
            "groups",
            group_id,
            "clusters",
            cluster_id,
            "restoreJobs",
            job_id,
        ]))
    }

    /// Start a restore of a cluster.
    #[instrument(skip(self, job))]
    pub fn create_restore_job_for_cluster(
        &self,
        group_id: &str,
        cluster_id: &str,
        job: &ApiDocument,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(cluster_id, "cluster_id")?;
        validate_cluster_restore_job(job, "restore_job")?;
        self.execute(RequestDescriptor::post(
            ["groups", group_id, "clusters", cluster_id, "restoreJobs"],
            job.clone(),
        ))
    }

    /// Restore jobs of a legacy mirrored config server.
    pub fn get_restore_jobs_for_config_server(
        &self,
        group_id: &str,
        host_id: &str,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        self.execute(RequestDescriptor::get([
            "groups",
            group_id,
            "hosts",
            host_id,
            "restoreJobs",
        ]))
    }

    /// Get a config server restore job by id.
    pub fn get_restore_job_for_config_server(
        &self,
        group_id: &str,
        host_id: &str,
        job_id: &str,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        require_identifier(job_id, "job_id")?;
        self.execute(RequestDescriptor::get([
            "groups",
            group_id,
            "hosts",
            host_id,
            "restoreJobs",
            job_id,
        ]))
    }

    /// Start a restore of a config server.
    #[instrument(skip(self, job))]
    pub fn create_restore_job_for_config_server(
        &self,
        group_id: &str,
        host_id: &str,
        job: &ApiDocument,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_identifier(host_id, "host_id")?;
        validate_config_server_restore_job(job, "restore_job")?;
        self.execute(RequestDescriptor::post(
            ["groups", group_id, "hosts", host_id, "restoreJobs"],
            job.clone(),
        ))
    }

    // ========================================================================
    // Whitelist of the authenticated user
    // ========================================================================

    /// IP whitelist of the authenticated user.
    pub fn get_whitelist(&self) -> RestClientResult<ApiDocument> {
        let user_id = self.current_user_id()?;
        self.execute(RequestDescriptor::get(["users", user_id.as_str(), "whitelist"]))
    }

    /// One entry of the authenticated user's IP whitelist.
    pub fn get_whitelist_entry(&self, ip_address: &str) -> RestClientResult<ApiDocument> {
        require_identifier(ip_address, "ip_address")?;
        let user_id = self.current_user_id()?;
        self.execute(RequestDescriptor::get([
            "users",
            user_id.as_str(),
            "whitelist",
            ip_address,
        ]))
    }

    /// Add entries such as `[{"ipAddress": "10.0.0.1"}, {"cidrBlock": "10.1.0.0/16"}]`.
    #[instrument(skip(self, entries))]
    pub fn add_whitelist_entries(&self, entries: &ApiDocument) -> RestClientResult<ApiDocument> {
        require_object_array(entries, "whitelist_entries")?;
        let user_id = self.current_user_id()?;
        self.execute(RequestDescriptor::post(
            ["users", user_id.as_str(), "whitelist"],
            entries.clone(),
        ))
    }

    /// Remove an address from the authenticated user's IP whitelist.
    #[instrument(skip(self))]
    pub fn delete_whitelist_entry(&self, ip_address: &str) -> RestClientResult<ApiDocument> {
        require_identifier(ip_address, "ip_address")?;
        let user_id = self.current_user_id()?;
        self.execute(RequestDescriptor::delete([
            "users",
            user_id.as_str(),
            "whitelist",
            ip_address,
        ]))
    }

    // ========================================================================
    // Automation
    // ========================================================================

    /// Automation configuration of a group.
    pub fn get_automation_config(&self, group_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        self.execute(RequestDescriptor::get(["groups", group_id, "automationConfig"]))
    }

    /// Replace the group's automation configuration.
    #[instrument(skip(self, config))]
    pub fn update_automation_config(
        &self,
        group_id: &str,
        config: &ApiDocument,
    ) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        require_object(config, "automation_config")?;
        self.execute(RequestDescriptor::put(
            ["groups", group_id, "automationConfig"],
            config.clone(),
        ))
    }

    /// Goal state progress of the automation agents.
    pub fn get_automation_status(&self, group_id: &str) -> RestClientResult<ApiDocument> {
        require_identifier(group_id, "group_id")?;
        self.execute(RequestDescriptor::get(["groups", group_id, "automationStatus"]))
    }

    // Private helper methods

    /// The one path every operation takes once its input is valid.
    fn execute(&self, descriptor: RequestDescriptor) -> RestClientResult<ApiDocument> {
        let request = descriptor.prepare(&self.base_url)?;
        tracing::debug!(method = %request.method, url = %request.url, "executing operation");
        Ok(self.transport.send(&request, &self.credentials)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm_rest_client_mock::RecordingTransport;

    fn client() -> OpsManagerClient {
        OpsManagerClient::with_transport(
            Credentials::new("ops@example.com", "key").unwrap(),
            "http://ops.example.com:8080",
            Arc::new(RecordingTransport::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(
            client.base_url().as_str(),
            "http://ops.example.com:8080/api/public/v1.0/"
        );
    }

    #[test]
    fn test_debug_hides_api_key() {
        let rendered = format!("{:?}", client());
        assert!(rendered.contains("ops@example.com"));
        assert!(!rendered.contains("\"key\""));
    }

    #[test]
    fn test_rejects_unusable_endpoint() {
        let err = OpsManagerClient::with_transport(
            Credentials::new("ops@example.com", "key").unwrap(),
            "   ",
            Arc::new(RecordingTransport::new()),
        )
        .unwrap_err();
        assert_eq!(err.parameter(), Some("endpoint"));
    }

    #[test]
    fn test_malformed_endpoint_is_invalid_url() {
        let err = OpsManagerClient::with_transport(
            Credentials::new("ops@example.com", "key").unwrap(),
            "not a url",
            Arc::new(RecordingTransport::new()),
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(matches!(
            err,
            RestClientError::InvalidArgument(ApiContractError::InvalidUrl { .. })
        ));
    }
}
