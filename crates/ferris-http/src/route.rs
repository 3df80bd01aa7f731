//! REST routes
//!
//! A route pairs a method with a path template such as
//! `/guilds/{guild_id}/channels`. The template (not the concrete path) keys
//! the rate-limit bucket, so every guild shares one bucket per endpoint.

use std::fmt;

use reqwest::{Method, Url};

use crate::error::{HttpError, HttpResult};

/// Rate-limit bucket key: method plus path template
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub method: Method,
    pub template: &'static str,
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.template)
    }
}

/// A REST endpoint with its path parameters filled in
#[derive(Debug, Clone)]
pub struct Route {
    method: Method,
    template: &'static str,
    params: Vec<String>,
    query: Vec<(&'static str, String)>,
}

impl Route {
    /// Create a route; placeholders are filled by `param` in order
    pub fn new(method: Method, template: &'static str) -> Self {
        Self {
            method,
            template,
            params: Vec::new(),
            query: Vec::new(),
        }
    }

    /// Fill the next `{placeholder}` in the template
    pub fn param(mut self, value: impl fmt::Display) -> Self {
        self.params.push(value.to_string());
        self
    }

    /// Append a query parameter
    pub fn query(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    pub fn template(&self) -> &'static str {
        self.template
    }

    /// Bucket this route is throttled under
    pub fn bucket_key(&self) -> BucketKey {
        BucketKey {
            method: self.method.clone(),
            template: self.template,
        }
    }

    /// Concrete path segments with placeholders substituted
    fn segments(&self) -> HttpResult<Vec<&str>> {
        let mut params = self.params.iter();
        let segments = self
            .template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                if segment.starts_with('{') && segment.ends_with('}') {
                    params.next().map(String::as_str).ok_or_else(|| {
                        HttpError::InvalidUrl(format!("missing {segment} for {}", self.template))
                    })
                } else {
                    Ok(segment)
                }
            })
            .collect::<HttpResult<Vec<_>>>()?;

        if params.next().is_some() {
            return Err(HttpError::InvalidUrl(format!(
                "too many parameters for {}",
                self.template
            )));
        }
        Ok(segments)
    }

    /// Resolve against the API base URL, percent-encoding each segment
    pub fn url(&self, base: &Url) -> HttpResult<Url> {
        let segments = self.segments()?;
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| HttpError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(segments);

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.template)
    }
}
