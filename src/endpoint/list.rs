use url::Url;

use crate::args::WorkloadKind;
use crate::error::ValidationError;

/// Port of the HTTP produce/status API when a host has none.
pub const HTTP_PORT: u16 = 9251;
/// Port of the binary producer protocol.
pub const PRODUCER_PORT: u16 = 9254;

/// Request path for an HTTP workload; `None` for the binary workload.
#[must_use]
pub fn workload_path(kind: WorkloadKind, topic: &str) -> Option<String> {
    match kind {
        WorkloadKind::Pattern => Some(format!("/v1/topic/{}/messages", topic)),
        WorkloadKind::Probe => Some("/status".to_owned()),
        WorkloadKind::Binary => None,
    }
}

fn entries(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|entry| !entry.is_empty())
}

/// Whether a bare `host[:port]` entry names its port. `Url` drops a port equal
/// to the scheme default, so this looks at the text.
fn has_explicit_port(entry: &str) -> bool {
    entry
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|byte| byte.is_ascii_digit()))
}

fn parse_entry(entry: &str) -> Result<(Url, bool), ValidationError> {
    let has_scheme = entry.contains("://");
    let candidate = if has_scheme {
        entry.to_owned()
    } else {
        format!("http://{}", entry)
    };
    let url = Url::parse(&candidate).map_err(|source| ValidationError::InvalidUrl {
        url: entry.to_owned(),
        source,
    })?;
    if url.host_str().is_none() {
        return Err(ValidationError::UrlMissingHost {
            url: entry.to_owned(),
        });
    }
    Ok((url, has_scheme))
}

/// Expands the comma separated `-u` value into request URLs.
///
/// Entries with a scheme are used as given. Bare hosts get `http://`, the
/// default port when they carry none, and `path`.
///
/// # Errors
///
/// Returns an error for unparsable entries or when no entry remains.
pub fn http_endpoints(raw: &str, path: &str) -> Result<Vec<Url>, ValidationError> {
    let mut urls = Vec::new();
    for entry in entries(raw) {
        let (mut url, has_scheme) = parse_entry(entry)?;
        if !has_scheme {
            if !has_explicit_port(entry) {
                url.set_port(Some(HTTP_PORT))
                    .map_err(|()| ValidationError::InvalidPort {
                        url: entry.to_owned(),
                    })?;
            }
            url.set_path(path);
        }
        urls.push(url);
    }
    if urls.is_empty() {
        return Err(ValidationError::NoEndpoints);
    }
    Ok(urls)
}

/// `host:port` of the producer, taken from the first entry of the `-u` value.
///
/// # Errors
///
/// Returns an error when the list is empty or its first entry is invalid.
pub fn producer_address(raw: &str) -> Result<String, ValidationError> {
    let entry = entries(raw).next().ok_or(ValidationError::NoEndpoints)?;
    let (url, _) = parse_entry(entry)?;
    let host = url
        .host_str()
        .ok_or_else(|| ValidationError::UrlMissingHost {
            url: entry.to_owned(),
        })?;
    let port = if has_explicit_port(entry) {
        url.port_or_known_default().unwrap_or(PRODUCER_PORT)
    } else {
        url.port().unwrap_or(PRODUCER_PORT)
    };
    Ok(format!("{}:{}", host, port))
}
