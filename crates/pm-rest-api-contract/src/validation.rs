//! Local input validation
//!
//! Pure functions taking a value and the parameter name used in error
//! messages. They run before a request is built, so a failure here means no
//! network access happened.

use serde_json::{Map, Value};
use validator::ValidationError;

use crate::error::{ApiContractError, ApiContractResult};
use crate::types::{json_kind, ApiDocument};

/// Mechanisms that authenticate a monitored host with a username and password.
pub const PASSWORD_AUTH_MECHANISMS: &[&str] = &["MONGODB_CR", "SCRAM-SHA-1", "SCRAM-SHA-256"];

pub const X509_AUTH_MECHANISM: &str = "MONGODB_X509";

/// Text must be non-empty and not only whitespace.
pub fn require_text(value: &str, parameter: &str) -> ApiContractResult<()> {
    if value.trim().is_empty() {
        return Err(ApiContractError::invalid_argument(
            parameter,
            "must be non-empty text",
        ));
    }
    Ok(())
}

/// Identifier placed in a URL path.
///
/// `.` and `..` are rejected as they would be dropped from the path.
pub fn require_identifier(value: &str, parameter: &str) -> ApiContractResult<()> {
    require_text(value, parameter)?;
    if value == "." || value == ".." {
        return Err(ApiContractError::invalid_argument(
            parameter,
            "must not be a relative path segment",
        ));
    }
    Ok(())
}

/// Compound key such as `hostname:port`; returns both halves.
pub fn require_compound_key<'a>(
    value: &'a str,
    parameter: &str,
    separator: char,
) -> ApiContractResult<(&'a str, &'a str)> {
    require_identifier(value, parameter)?;
    match value.rsplit_once(separator) {
        Some((left, right)) if !left.trim().is_empty() && !right.trim().is_empty() => {
            Ok((left, right))
        }
        _ => Err(ApiContractError::invalid_argument(
            parameter,
            format!("must have the form `<left>{separator}<right>`"),
        )),
    }
}

/// ISO-8601 duration such as `P2D`, `PT1M` or `P1DT12H`.
pub fn require_iso8601_duration(value: &str, parameter: &str) -> ApiContractResult<()> {
    require_text(value, parameter)?;
    if !is_iso8601_duration(value) {
        return Err(ApiContractError::invalid_argument(
            parameter,
            format!("must be an ISO-8601 duration, got `{value}`"),
        ));
    }
    Ok(())
}

/// Field check for `#[validate(custom)]` on duration fields.
pub(crate) fn iso8601_duration(value: &str) -> Result<(), ValidationError> {
    if is_iso8601_duration(value) {
        return Ok(());
    }
    Err(validation_error(
        "iso8601_duration",
        format!("must be an ISO-8601 duration, got `{value}`"),
    ))
}

/// Field check for `#[validate(custom)]` on selected measurement series.
pub(crate) fn metric_names(metrics: &[String]) -> Result<(), ValidationError> {
    if metrics.iter().any(|metric| metric.trim().is_empty()) {
        return Err(validation_error("metric_name", "must be non-empty text".to_string()));
    }
    Ok(())
}

fn validation_error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn is_iso8601_duration(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('P') else {
        return false;
    };
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let date_ok = duration_fields(date_part, &['Y', 'M', 'W', 'D']);
    let time_ok = match time_part {
        Some(time) => !time.is_empty() && duration_fields(time, &['H', 'M', 'S']),
        None => true,
    };
    let any_field = !date_part.is_empty() || time_part.is_some_and(|t| !t.is_empty());

    date_ok && time_ok && any_field
}

/// Sequence of `<number><designator>` with designators in the given order.
fn duration_fields(mut input: &str, designators: &[char]) -> bool {
    let mut next = 0;
    while !input.is_empty() {
        let digits = input
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(input.len());
        if digits == 0 || digits == input.len() {
            return false;
        }
        let number = &input[..digits];
        if number.starts_with('.') || number.ends_with('.') || number.matches('.').count() > 1 {
            return false;
        }
        let designator = input[digits..].chars().next().unwrap_or_default();
        match designators[next..].iter().position(|d| *d == designator) {
            Some(offset) => next += offset + 1,
            None => return false,
        }
        input = &input[digits + designator.len_utf8()..];
    }
    true
}

/// Structured body must be a non-empty key/value mapping.
pub fn require_object<'a>(
    value: &'a ApiDocument,
    parameter: &str,
) -> ApiContractResult<&'a Map<String, Value>> {
    match value {
        Value::Object(map) if !map.is_empty() => Ok(map),
        Value::Object(_) => Err(ApiContractError::invalid_argument(
            parameter,
            "must be a non-empty object",
        )),
        other => Err(ApiContractError::invalid_argument(
            parameter,
            format!("must be an object, got {}", json_kind(other)),
        )),
    }
}

/// Body must be a non-empty array of objects.
pub fn require_object_array<'a>(
    value: &'a ApiDocument,
    parameter: &str,
) -> ApiContractResult<&'a Vec<Value>> {
    match value {
        Value::Array(items) if !items.is_empty() => {
            for (index, item) in items.iter().enumerate() {
                require_object(item, &format!("{parameter}[{index}]"))?;
            }
            Ok(items)
        }
        Value::Array(_) => Err(ApiContractError::invalid_argument(
            parameter,
            "must be a non-empty array",
        )),
        other => Err(ApiContractError::invalid_argument(
            parameter,
            format!("must be an array, got {}", json_kind(other)),
        )),
    }
}

/// Key must be present (any value, including null).
pub fn require_key<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    parameter: &str,
) -> ApiContractResult<&'a Value> {
    map.get(key).ok_or_else(|| {
        ApiContractError::invalid_argument(format!("{parameter}.{key}"), "is required")
    })
}

/// Field must hold non-empty text; returns it.
pub fn require_text_field<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    parameter: &str,
) -> ApiContractResult<&'a str> {
    let name = format!("{parameter}.{key}");
    match map.get(key) {
        Some(Value::String(text)) => {
            require_text(text, &name)?;
            Ok(text.as_str())
        }
        Some(other) => Err(ApiContractError::invalid_argument(
            name,
            format!("must be non-empty text, got {}", json_kind(other)),
        )),
        None => Err(ApiContractError::invalid_argument(name, "is required")),
    }
}

/// Field must hold an integer; returns it.
pub fn require_integer_field(
    map: &Map<String, Value>,
    key: &str,
    parameter: &str,
) -> ApiContractResult<i64> {
    let name = format!("{parameter}.{key}");
    match map.get(key) {
        Some(Value::Number(number)) => number.as_i64().ok_or_else(|| {
            ApiContractError::invalid_argument(name, "must be an integer")
        }),
        Some(other) => Err(ApiContractError::invalid_argument(
            name,
            format!("must be an integer, got {}", json_kind(other)),
        )),
        None => Err(ApiContractError::invalid_argument(name, "is required")),
    }
}

/// Field must hold a TCP port number.
pub fn require_port_field(
    map: &Map<String, Value>,
    key: &str,
    parameter: &str,
) -> ApiContractResult<u16> {
    let port = require_integer_field(map, key, parameter)?;
    u16::try_from(port)
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| {
            ApiContractError::invalid_argument(
                format!("{parameter}.{key}"),
                format!("must be a port between 1 and 65535, got {port}"),
            )
        })
}

/// Field must be missing or null.
pub fn require_absent(map: &Map<String, Value>, key: &str, parameter: &str) -> ApiContractResult<()> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(()),
        Some(_) => Err(ApiContractError::invalid_argument(
            format!("{parameter}.{key}"),
            "must be absent",
        )),
    }
}

/// Field must be the boolean `true`.
pub fn require_true(map: &Map<String, Value>, key: &str, parameter: &str) -> ApiContractResult<()> {
    match map.get(key) {
        Some(Value::Bool(true)) => Ok(()),
        _ => Err(ApiContractError::invalid_argument(
            format!("{parameter}.{key}"),
            "must be true",
        )),
    }
}

// ============================================================================
// Resource bodies
// ============================================================================

/// Host descriptor for creation: `hostname` and `port` are mandatory.
pub fn validate_new_host(host: &ApiDocument, parameter: &str) -> ApiContractResult<()> {
    let map = require_object(host, parameter)?;
    require_text_field(map, "hostname", parameter)?;
    require_port_field(map, "port", parameter)?;
    validate_host_auth(map, parameter)
}

/// Partial host descriptor: fields are checked only when present.
pub fn validate_host_update(host: &ApiDocument, parameter: &str) -> ApiContractResult<()> {
    let map = require_object(host, parameter)?;
    if map.contains_key("hostname") {
        require_text_field(map, "hostname", parameter)?;
    }
    if map.contains_key("port") {
        require_port_field(map, "port", parameter)?;
    }
    validate_host_auth(map, parameter)
}

/// Cross-field rules keyed on `authMechanismName`.
///
/// Unknown mechanisms pass through unchecked.
fn validate_host_auth(map: &Map<String, Value>, parameter: &str) -> ApiContractResult<()> {
    let Some(mechanism) = map.get("authMechanismName").and_then(Value::as_str) else {
        return Ok(());
    };

    if PASSWORD_AUTH_MECHANISMS.contains(&mechanism) {
        require_text_field(map, "username", parameter)?;
        require_text_field(map, "password", parameter)?;
    } else if mechanism == X509_AUTH_MECHANISM {
        require_absent(map, "username", parameter)?;
        require_absent(map, "password", parameter)?;
        require_true(map, "sslEnabled", parameter)?;
    }
    Ok(())
}

pub fn validate_alert_config(config: &ApiDocument, parameter: &str) -> ApiContractResult<()> {
    let map = require_object(config, parameter)?;
    require_text_field(map, "eventTypeName", parameter)?;
    Ok(())
}

/// Maintenance window body; returns the window id when `require_id` is set.
pub fn validate_maintenance_window<'a>(
    window: &'a ApiDocument,
    parameter: &str,
    require_id: bool,
) -> ApiContractResult<Option<&'a str>> {
    let map = require_object(window, parameter)?;
    let id = if require_id {
        Some(require_text_field(map, "id", parameter)?)
    } else {
        None
    };
    for key in ["startDate", "endDate", "description", "alertTypeNames"] {
        require_key(map, key, parameter)?;
    }
    Ok(id)
}

/// Backup configuration body; returns `clusterId` when `require_cluster_id` is set.
pub fn validate_backup_config<'a>(
    config: &'a ApiDocument,
    parameter: &str,
    require_cluster_id: bool,
) -> ApiContractResult<Option<&'a str>> {
    let map = require_object(config, parameter)?;
    let cluster_id = if require_cluster_id {
        Some(require_text_field(map, "clusterId", parameter)?)
    } else {
        None
    };
    require_key(map, "statusName", parameter)?;
    Ok(cluster_id)
}

/// Restore job for a cluster: one restore point plus an optional SCP delivery.
pub fn validate_cluster_restore_job(job: &ApiDocument, parameter: &str) -> ApiContractResult<()> {
    let map = require_object(job, parameter)?;

    let has_point = ["snapshotId", "timestamp", "checkpointId"]
        .iter()
        .any(|key| map.get(*key).is_some_and(|v| !v.is_null()));
    if !has_point {
        return Err(ApiContractError::invalid_argument(
            parameter,
            "one of snapshotId, timestamp or checkpointId is required",
        ));
    }

    if let Some(timestamp) = map.get("timestamp").filter(|v| !v.is_null()) {
        let name = format!("{parameter}.timestamp");
        let timestamp = require_object(timestamp, &name)?;
        require_key(timestamp, "date", &name)?;
        require_key(timestamp, "increment", &name)?;
    }

    if let Some(delivery) = map.get("delivery").filter(|v| !v.is_null()) {
        let name = format!("{parameter}.delivery");
        let delivery = require_object(delivery, &name)?;
        if delivery.get("methodName").and_then(Value::as_str) == Some("SCP") {
            require_text_field(delivery, "hostname", &name)?;
            require_integer_field(delivery, "port", &name)?;
            require_text_field(delivery, "targetDirectory", &name)?;
        }
    }
    Ok(())
}

/// Restore job for a legacy mirrored config server: `snapshotId` is required.
pub fn validate_config_server_restore_job(
    job: &ApiDocument,
    parameter: &str,
) -> ApiContractResult<()> {
    let map = require_object(job, parameter)?;
    require_text_field(map, "snapshotId", parameter)?;
    Ok(())
}
