//! URL and path helpers for vendor API responses.
//!
//! The vendor API returns image URLs that point at a host which does not
//! serve the files. The file name (last path segment) is correct, so the
//! fix is to re-home that segment under the download host.

use serde_json::Value;
use url::Url;

/// Last path segment of `url`.
///
/// Absolute URLs are parsed so query strings and fragments are ignored;
/// anything else is split on `/` as-is.
fn last_segment(url: &str) -> String {
    let url = url.trim();
    if let Ok(parsed) = Url::parse(url) {
        if let Some(segment) = parsed.path_segments().and_then(|segments| segments.last()) {
            return segment.to_string();
        }
    }
    url.rsplit('/').next().unwrap_or_default().to_string()
}

/// Re-home the last path segment of `url` under `download_base`.
pub fn correct_image_url(url: &str, download_base: &str) -> String {
    format!(
        "{}/{}",
        download_base.trim_end_matches('/'),
        last_segment(url)
    )
}

/// Rewrite every `*url` field of a JSON response in place.
///
/// Arrays are walked element by element. Within an object only direct,
/// non-empty string values under keys ending in `url` are touched.
pub fn correct_response_urls(value: &mut Value, download_base: &str) {
    match value {
        Value::Array(items) => {
            for item in items {
                correct_response_urls(item, download_base);
            }
        }
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if let Value::String(url) = field {
                    if key.ends_with("url") && !url.is_empty() {
                        *url = correct_image_url(url, download_base);
                    }
                }
            }
        }
        _ => {}
    }
}

/// File name component of a local path, accepting either separator.
pub fn file_name_from_path(path: &str) -> String {
    let normalized = path.trim().replace('\\', "/");
    normalized
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
