//! URL construction for the blob endpoint.

use super::error::StoreError;
use reqwest::Url;

/// SAS-style query string granting read access, e.g. `sv=...&sp=rl&sig=...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCredential(String);

impl ReadCredential {
    /// Returns `None` for an empty token. A leading `?` is tolerated.
    pub fn new(query: &str) -> Option<Self> {
        let trimmed = query.trim().trim_start_matches('?');
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Appends the credential to whatever query `url` already carries. The
    /// token is inserted as-is since it is already percent-encoded.
    pub fn apply(&self, url: &mut Url) {
        let merged = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{}", self.0),
            _ => self.0.clone(),
        };
        url.set_query(Some(&merged));
    }
}

#[derive(Debug, Clone)]
pub struct BlobEndpoint {
    base: Url,
}

impl BlobEndpoint {
    pub fn parse(endpoint: &str) -> Result<Self, StoreError> {
        let base = Url::parse(endpoint.trim())
            .map_err(|e| StoreError::InvalidUrl(format!("{endpoint}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(endpoint.to_string()));
        }
        Ok(Self { base })
    }

    pub fn container_url(&self, container: &str) -> Result<Url, StoreError> {
        self.segments_url(&[container])
    }

    /// `<endpoint>/<container>/<blob>`, escaping both segments.
    pub fn blob_url(&self, container: &str, blob: &str) -> Result<Url, StoreError> {
        self.segments_url(&[container, blob])
    }

    /// Like `blob_url`, but `path` may contain `/` separated segments.
    pub fn blob_path_url(&self, container: &str, path: &str) -> Result<Url, StoreError> {
        let mut segments = vec![container];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        self.segments_url(&segments)
    }

    /// Joins an already percent-encoded blob name onto the container.
    pub fn encoded_blob_url(&self, container: &str, encoded: &str) -> Result<Url, StoreError> {
        let mut url = self.container_url(container)?;
        let path = format!("{}/{}", url.path().trim_end_matches('/'), encoded);
        url.set_path(&path);
        Ok(url)
    }

    /// True when `url` points at this endpoint (same host and port, under the
    /// endpoint's path).
    pub fn owns(&self, url: &str) -> bool {
        let Ok(candidate) = Url::parse(url.trim()) else {
            return false;
        };
        candidate.host_str().is_some()
            && candidate.host_str() == self.base.host_str()
            && candidate.port_or_known_default() == self.base.port_or_known_default()
            && under_path(&self.base, &candidate)
    }

    /// Percent-encoded trailing path segment of `url`.
    pub fn trailing_segment(url: &str) -> Option<String> {
        let parsed = Url::parse(url.trim()).ok()?;
        parsed
            .path_segments()?
            .next_back()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
    }

    fn segments_url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

/// Whether every non-empty path segment of `base` prefixes `candidate`'s.
fn under_path(base: &Url, candidate: &Url) -> bool {
    let segments = |url: &Url| -> Vec<String> {
        url.path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    };
    let base = segments(base);
    let candidate = segments(candidate);
    candidate.len() >= base.len() && candidate[..base.len()] == base[..]
}
