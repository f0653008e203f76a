//! Request URL construction.
//!
//! A method path is a template such as `/users/{ids}/answers`. Each
//! parameter whose name matches a `{name}` segment is substituted into the
//! path; every other parameter becomes a query parameter. The query string
//! always carries `site` and `pagesize`, plus `filter` and `key` when set.

use std::collections::HashSet;

use reqwest::Url;

use crate::types::Parameters;
use crate::{HuginnError, Result};

/// Client-level query settings applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions<'a> {
    pub site: &'a str,
    pub api_key: Option<&'a str>,
    pub filter: Option<&'a str>,
    pub page_size: usize,
}

/// The placeholder name of a path segment, if the segment is `{name}`.
pub(crate) fn placeholder(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .filter(|name| !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_'))
}

/// Names of all placeholders in a path template, in order.
pub fn path_placeholders(path: &str) -> Vec<&str> {
    path.split('/').filter_map(placeholder).collect()
}

/// Build the full request URL for `path` under `base`.
///
/// Fails with [`HuginnError::MissingPathParameter`] if any placeholder has
/// no matching parameter; nothing is sent in that case.
pub fn build_url(
    base: &Url,
    path: &str,
    parameters: &Parameters,
    options: &QueryOptions<'_>,
) -> Result<Url> {
    let mut used = HashSet::new();
    let mut unresolved = false;
    let mut segments = Vec::new();
    let mut shown = String::new();

    for raw in path.split('/').filter(|s| !s.is_empty()) {
        let segment = match placeholder(raw) {
            Some(name) => match parameters.get(name) {
                Some(value) => {
                    used.insert(name);
                    value.to_param_string()
                }
                None => {
                    unresolved = true;
                    raw.to_string()
                }
            },
            None => raw.to_string(),
        };
        shown.push('/');
        shown.push_str(&segment);
        segments.push(segment);
    }

    if unresolved {
        return Err(HuginnError::MissingPathParameter { path: shown });
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| HuginnError::Configuration(format!("base URL cannot have a path: {base}")))?
        .pop_if_empty()
        .extend(&segments);

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        if let Some(filter) = options.filter {
            query.append_pair("filter", filter);
        }
        if let Some(key) = options.api_key {
            query.append_pair("key", key);
        }
        query.append_pair("site", options.site);
        query.append_pair("pagesize", &options.page_size.to_string());
        for (name, value) in parameters.iter() {
            if !used.contains(name) {
                query.append_pair(name, &value.to_param_string());
            }
        }
    }

    Ok(url)
}

/// Backoff bucket for a method path.
///
/// `/me…` methods share their quota with `/users/{ids}…`, so they are
/// scheduled in the same bucket. This only affects scheduling, never the
/// URL.
pub fn backoff_bucket(path: &str) -> String {
    match path.strip_prefix("/me") {
        Some(rest) => format!("/users/{{ids}}{rest}"),
        None => path.to_string(),
    }
}

/// Derive the API site id from a site host name.
///
/// `meta.stackexchange.com` → `meta`, `stackoverflow.com` →
/// `stackoverflow`, `superuser.com` → `superuser`.
pub fn site_id_from_host(host: &str) -> String {
    let host = host.trim_end_matches('.');
    host.strip_suffix(".stackexchange.com")
        .or_else(|| host.strip_suffix(".com"))
        .unwrap_or(host)
        .to_string()
}
