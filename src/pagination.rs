use std::collections::HashSet;

use log::debug;
use serde_json::Value;
use url::Url;

use crate::errors::{KonfuzioError, Result};
use crate::session::Session;

impl Session {
    /// Collect every item of a list endpoint, following `next` links.
    ///
    /// A paged envelope (`{"results": [...], "next": url}`) is followed until
    /// `next` is missing, null or empty, and the pages' `results` are
    /// concatenated in order. A bare JSON array is taken as the complete
    /// listing. Items are not deduplicated.
    ///
    /// Any other body, such as a single object without `results`, is an
    /// error rather than a one-item listing. Callers always get a list of
    /// items, and an error payload that happens to come back with status 200
    /// is not mistaken for data.
    ///
    /// # Errors
    ///
    /// - [`KonfuzioError::Pagination`] if the chain revisits a page or runs
    ///   past the session's page limit.
    /// - [`KonfuzioError::Validation`] if a page has any other shape.
    pub async fn fetch_all_pages(&self, initial_url: &str) -> Result<Vec<Value>> {
        let mut url = Url::parse(initial_url)?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut items: Vec<Value> = Vec::new();
        let mut pages = 0usize;

        loop {
            if pages >= self.max_pages() {
                return Err(KonfuzioError::Pagination {
                    url: initial_url.to_string(),
                    pages,
                    reason: format!("more than {} pages", self.max_pages()),
                });
            }
            if !seen.insert(url.as_str().to_string()) {
                return Err(KonfuzioError::Pagination {
                    url: initial_url.to_string(),
                    pages,
                    reason: format!("next link {url} was already fetched"),
                });
            }

            pages += 1;
            let body: Value = self.get_json(url.as_str()).await?;

            let mut envelope = match body {
                Value::Object(map) if map.contains_key("results") => map,
                Value::Array(list) => {
                    debug!("{url} returned a plain list of {} items", list.len());
                    return Ok(list);
                }
                other => {
                    return Err(KonfuzioError::Validation {
                        resource: url.to_string(),
                        status: 200,
                        message: format!("expected a list or paged envelope, got {other}"),
                    })
                }
            };

            match envelope.remove("results") {
                Some(Value::Array(results)) => items.extend(results),
                _ => {
                    return Err(KonfuzioError::Validation {
                        resource: url.to_string(),
                        status: 200,
                        message: "`results` is not a list".into(),
                    })
                }
            }

            match envelope.get("next").and_then(Value::as_str) {
                Some(next) if !next.is_empty() => url = url.join(next)?,
                _ => break,
            }
        }

        debug!("collected {} items over {pages} pages from {initial_url}", items.len());
        Ok(items)
    }
}
