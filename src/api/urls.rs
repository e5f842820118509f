//! URL construction for the Ergast-compatible F1 API

use crate::config::ApiConfig;

/// Builds resource URLs below `{base_url}{prefix}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    root: String,
}

impl Endpoints {
    pub fn new(base_url: &str, prefix: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let prefix = prefix.trim_matches('/');
        let root = if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, prefix)
        };
        Self { root }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.base_url, &config.prefix)
    }

    /// `…/{year}/{resource}/`
    pub fn season(&self, year: u16, resource: &str) -> String {
        format!("{}/{}/{}/", self.root, year, resource.trim_matches('/'))
    }

    /// `…/{year}/{round}/{resource}/`
    pub fn round(&self, year: u16, round: u32, resource: &str) -> String {
        format!(
            "{}/{}/{}/{}/",
            self.root,
            year,
            round,
            resource.trim_matches('/')
        )
    }

    /// `…/seasons/`, the cheapest collection to probe
    pub fn seasons(&self) -> String {
        format!("{}/seasons/", self.root)
    }
}

/// Appends query parameters, respecting any query already on `url`
pub fn with_query<V: ToString>(url: &str, params: &[(&str, V)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&value.to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("&");
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, query)
}
