//! Listing commands and the paging helpers the exports build on

use std::io::Write;

use anyhow::{anyhow, bail, Result};
use clap::Args;
use pm_rest_api_contract::{document_id, error_code, is_error_document, results, ApiDocument, PageQuery};
use pm_rest_client::{OpsManagerClient, RestClientResult};

#[derive(Args)]
pub struct GroupsArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = 100)]
    items_per_page: u32,
}

impl GroupsArgs {
    pub fn run(self, client: &OpsManagerClient, out: &mut dyn Write) -> Result<()> {
        let page = client.get_groups(&PageQuery::new(self.page, self.items_per_page))?;
        print_document(out, &page)
    }
}

#[derive(Args)]
pub struct HostsArgs {
    /// Group name
    #[arg(long)]
    group: String,

    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = 100)]
    items_per_page: u32,
}

impl HostsArgs {
    pub fn run(self, client: &OpsManagerClient, out: &mut dyn Write) -> Result<()> {
        let group = resolve_group(client, &self.group)?;
        let group_id = require_id(&group, "group")?;
        let page = client.get_hosts(group_id, &PageQuery::new(self.page, self.items_per_page))?;
        print_document(out, &page)
    }
}

#[derive(Args)]
pub struct AgentsArgs {
    /// Group name
    #[arg(long)]
    group: String,
}

impl AgentsArgs {
    pub fn run(self, client: &OpsManagerClient, out: &mut dyn Write) -> Result<()> {
        let group = resolve_group(client, &self.group)?;
        let group_id = require_id(&group, "group")?;
        let agents = client.get_agents(group_id)?;
        print_document(out, &ApiDocument::Array(agents))
    }
}

/// Pretty-print a document. Error documents are printed, then reported as a failure.
fn print_document(out: &mut dyn Write, document: &ApiDocument) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, document)?;
    writeln!(out)?;
    if is_error_document(document) {
        bail!("request failed: {}", describe_error(document));
    }
    Ok(())
}

/// Look a group up by name, failing when the service answers with an error document.
pub fn resolve_group(client: &OpsManagerClient, name: &str) -> Result<ApiDocument> {
    let group = client.get_group_by_name(name)?;
    if is_error_document(&group) {
        bail!("group `{name}` not found: {}", describe_error(&group));
    }
    Ok(group)
}

pub fn require_id<'a>(document: &'a ApiDocument, kind: &str) -> Result<&'a str> {
    document_id(document).ok_or_else(|| anyhow!("{kind} document has no id: {document}"))
}

/// `detail` of an error document, falling back to its code or raw text.
pub fn describe_error(document: &ApiDocument) -> String {
    document
        .get("detail")
        .and_then(ApiDocument::as_str)
        .or_else(|| error_code(document))
        .map(str::to_string)
        .unwrap_or_else(|| document.to_string())
}

/// Fetch every page of a collection.
///
/// Stops once `totalCount` items are collected, or on a short or empty page
/// when the service omits the count.
pub fn all_pages<F>(kind: &str, mut fetch: F) -> Result<Vec<ApiDocument>>
where
    F: FnMut(&PageQuery) -> RestClientResult<ApiDocument>,
{
    let mut items = Vec::new();
    let mut page = PageQuery::default();
    loop {
        let document = fetch(&page)?;
        let Some(batch) = results(&document) else {
            bail!("cannot list {kind}: {}", describe_error(&document));
        };
        let fetched = batch.len();
        items.extend(batch.iter().cloned());

        let total = document.get("totalCount").and_then(ApiDocument::as_u64);
        let done = match total {
            Some(total) => fetched == 0 || items.len() as u64 >= total,
            None => fetched < page.items_per_page as usize,
        };
        if done {
            tracing::debug!(kind, count = items.len(), pages = page.page_num, "listed collection");
            return Ok(items);
        }
        page.page_num += 1;
    }
}
