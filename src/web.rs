// PageGate - Hosted Backend Client
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// PostgREST-style table client: the remote implementation of the table
// store seam. Same contract as the LMDB backend; pages cannot tell them
// apart. Base URL is validated once at construction, not per request.

use crate::store::{parse_resource, TableStore};
use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Validate the backend base URL: http/https only, loopback allowed for
/// dev stacks but logged, private ranges rejected outright.
fn validate_base_url(url: &str) -> Result<()> {
    let without_scheme = if let Some(rest) = url.strip_prefix("https://") {
        rest
    } else if let Some(rest) = url.strip_prefix("http://") {
        rest
    } else {
        return Err(anyhow!("only http/https backend URLs allowed: {}", url));
    };

    let host = without_scheme
        .split('/')
        .next()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("")
        .to_lowercase();

    if host.is_empty() {
        return Err(anyhow!("backend URL has no host: {}", url));
    }

    if host == "localhost" {
        log::warn!("backend URL points at loopback: {}", url);
        return Ok(());
    }

    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        if addr.is_loopback() {
            log::warn!("backend URL points at loopback: {}", url);
        } else if addr.is_private() || addr.is_link_local() {
            return Err(anyhow!("backend URL in private range: {}", host));
        }
        let octets = addr.octets();
        if octets[0] == 169 && octets[1] == 254 {
            return Err(anyhow!("backend URL is a metadata endpoint: {}", host));
        }
    }

    Ok(())
}

/// Table store over a hosted PostgREST endpoint
pub struct RemoteTableStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RemoteTableStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        validate_base_url(base_url)?;
        let client = Client::builder()
            .user_agent("PageGate/1.0")
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// REST endpoint for a resource, translating the filter suffix into
    /// PostgREST query syntax
    fn endpoint(&self, resource: &str) -> String {
        let key = parse_resource(resource);
        match key.filter {
            Some((field, value)) => format!(
                "{}/rest/v1/{}?{}=eq.{}",
                self.base_url, key.table, field, value
            ),
            None => format!("{}/rest/v1/{}", self.base_url, key.table),
        }
    }

    fn by_id(&self, resource: &str, id: &str) -> String {
        let key = parse_resource(resource);
        format!("{}/rest/v1/{}?id=eq.{}", self.base_url, key.table, id)
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<Vec<Value>> {
        let resp = request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "return=representation")
            .send()
            .context("backend request failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("backend error: HTTP {}", status.as_u16()));
        }
        let body: Value = resp.json().context("backend returned invalid JSON")?;
        match body {
            Value::Array(rows) => Ok(rows),
            other => Ok(vec![other]),
        }
    }
}

impl TableStore for RemoteTableStore {
    fn list(&self, resource: &str) -> Result<Vec<Value>> {
        self.send(self.client.get(self.endpoint(resource)))
    }

    fn get(&self, resource: &str, id: &str) -> Result<Option<Value>> {
        let mut rows = self.send(self.client.get(self.by_id(resource, id)))?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }

    fn insert(&self, resource: &str, record: Value) -> Result<Value> {
        let mut rows = self.send(self.client.post(self.endpoint(resource)).json(&record))?;
        rows.pop()
            .ok_or_else(|| anyhow!("insert into '{}' returned no row", resource))
    }

    fn update(&self, resource: &str, id: &str, patch: Value) -> Result<Option<Value>> {
        let mut rows = self.send(self.client.patch(self.by_id(resource, id)).json(&patch))?;
        Ok(rows.pop())
    }

    fn delete(&self, resource: &str, id: &str) -> Result<bool> {
        let rows = self.send(self.client.delete(self.by_id(resource, id)))?;
        Ok(!rows.is_empty())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_is_enforced() {
        assert!(validate_base_url("https://portal.example.com").is_ok());
        assert!(validate_base_url("http://portal.example.com").is_ok());
        assert!(validate_base_url("ftp://portal.example.com").is_err());
        assert!(validate_base_url("portal.example.com").is_err());
    }

    #[test]
    fn private_ranges_rejected_loopback_tolerated() {
        assert!(validate_base_url("http://localhost:54321").is_ok());
        assert!(validate_base_url("http://127.0.0.1:54321").is_ok());
        assert!(validate_base_url("http://10.0.0.5").is_err());
        assert!(validate_base_url("http://192.168.1.10").is_err());
        assert!(validate_base_url("http://169.254.169.254").is_err());
    }

    #[test]
    fn endpoints_translate_filter_suffix() {
        let store = RemoteTableStore::new("https://portal.example.com/", "key").unwrap();
        assert_eq!(
            store.endpoint("lessons"),
            "https://portal.example.com/rest/v1/lessons"
        );
        assert_eq!(
            store.endpoint("lessons?author_id=eq.t1"),
            "https://portal.example.com/rest/v1/lessons?author_id=eq.t1"
        );
        assert_eq!(
            store.by_id("lessons", "l1"),
            "https://portal.example.com/rest/v1/lessons?id=eq.l1"
        );
    }
}
