//! Integration API URLs for distributions

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::config::{MainSettings, INTEGRATION_API};
use crate::error::CatalogueError;

/// Filters narrowing the entities a distribution serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceFilter<'a> {
    pub entity: &'a str,
    pub location: Option<&'a str>,
}

/// Base64 variant safe inside paths and query values: `+` → `.`, `/` → `_`,
/// no padding
pub fn encode_segment(raw: &str) -> String {
    STANDARD
        .encode(raw.as_bytes())
        .replace('+', ".")
        .replace('/', "_")
        .replace('=', "")
}

/// Inverse of [`encode_segment`]
pub fn decode_segment(encoded: &str) -> Option<String> {
    let mut standard = encoded.replace('.', "+").replace('_', "/");
    while standard.len() % 4 != 0 {
        standard.push('=');
    }
    let bytes = STANDARD.decode(standard.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

/// `{api}/{orion}/entity/{type}[/location/{location}][?fs=..[&fp=..]]`
pub fn build_resource_url(
    settings: &MainSettings,
    service: &str,
    service_path: &str,
    filter: ResourceFilter<'_>,
) -> Result<String, CatalogueError> {
    let wrong_format = || CatalogueError::WrongFormat {
        field: INTEGRATION_API.to_string(),
        value: settings.api.clone(),
    };

    let mut url = Url::parse(&settings.api).map_err(|_| wrong_format())?;
    {
        let mut segments = url.path_segments_mut().map_err(|_| wrong_format())?;
        segments.pop_if_empty();
        segments.push(&encode_segment(&settings.orion));
        segments.push("entity");
        segments.push(filter.entity);
        if let Some(location) = filter.location {
            segments.push("location");
            segments.push(location);
        }
    }

    if !service.is_empty() {
        let mut query = url.query_pairs_mut();
        query.append_pair("fs", &encode_segment(service));
        let path = service_path.strip_prefix('/').unwrap_or(service_path);
        if !path.is_empty() {
            query.append_pair("fp", &encode_segment(path));
        }
    }

    Ok(url.to_string())
}

/// Route answering 200 while the integration API is up
pub const STATUS_ROUTE: &str = "status";

const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Ask the integration API whether it is up.
///
/// Only logs a warning when it is not; the catalogue can still be built.
pub fn check_api_status(api: &str) -> bool {
    let url = format!("{}/{}", api.trim_end_matches('/'), STATUS_ROUTE);
    debug!(%url, "Checking integration API status");

    let client = match reqwest::blocking::Client::builder()
        .timeout(STATUS_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Could not build HTTP client to check integration API");
            return false;
        }
    };

    match client.get(&url).send() {
        Ok(response) if response.status() == StatusCode::OK => true,
        Ok(response) => {
            warn!(host = %api, status = %response.status(), "Integration API seems to be down");
            false
        }
        Err(e) => {
            warn!(host = %api, error = %e, "Integration API seems to be down");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MainSettings {
        MainSettings {
            host: "data.example.org".to_string(),
            structure: "http://{host}/cb/".to_string(),
            api: "http://api.example.org".to_string(),
            orion: "http://orion:1026".to_string(),
        }
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("http://orion:1026"), "aHR0cDovL29yaW9uOjEwMjY");
        assert_eq!(encode_segment("a?>"), "YT8.");
        assert_eq!(encode_segment("??"), "Pz8");
        assert_eq!(decode_segment("YT8.").as_deref(), Some("a?>"));
        assert_eq!(
            decode_segment(&encode_segment("/gardens/north")).as_deref(),
            Some("/gardens/north")
        );
    }

    #[test]
    fn test_url_by_category_without_service() {
        let url = build_resource_url(
            &settings(),
            "",
            "/ignored",
            ResourceFilter {
                entity: "ParkingSpot",
                location: None,
            },
        )
        .unwrap();
        assert_eq!(
            url,
            "http://api.example.org/aHR0cDovL29yaW9uOjEwMjY/entity/ParkingSpot"
        );
    }

    #[test]
    fn test_url_by_location_with_service() {
        let url = build_resource_url(
            &settings(),
            "city",
            "/parks",
            ResourceFilter {
                entity: "Garden",
                location: Some("Old Town"),
            },
        )
        .unwrap();
        assert_eq!(
            url,
            format!(
                "http://api.example.org/aHR0cDovL29yaW9uOjEwMjY/entity/Garden/location/Old%20Town?fs={}&fp={}",
                encode_segment("city"),
                encode_segment("parks")
            )
        );
    }

    #[test]
    fn test_status_of_unreachable_api() {
        assert!(!check_api_status("http://127.0.0.1:9/"));
    }
}
