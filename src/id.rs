//! Identifier minting and URI construction
//!
//! Every dataset and distribution is named by a ULID. The identifier doubles
//! as the source of the dataset's issuance timestamp, so it has to survive
//! across runs (see [`crate::store`]).

use std::fmt;

use chrono::{DateTime, Utc};
use ulid::{Generator, Ulid};

use crate::error::CatalogueError;

/// Timestamp layout used for every `dct:issued` / `dct:modified` value
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Default URI structure when the configuration leaves it out
pub const DEFAULT_URI_STRUCTURE: &str = "http://{host}/cb/";

/// Entity kinds that receive a URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Catalogue,
    Dataset,
    Distribution,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Catalogue => "catalogue",
            EntityKind::Dataset => "dataset",
            EntityKind::Distribution => "distribution",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mints strictly increasing identifiers within one process
pub struct IdGenerator {
    inner: Generator,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            inner: Generator::new(),
        }
    }

    pub fn next_id(&mut self) -> Ulid {
        // the random part only overflows after 2^80 ids in one millisecond
        self.inner.generate().unwrap_or_else(|_| Ulid::new())
    }
}

/// Parse a stored identifier
pub fn parse_id(raw: &str) -> Result<Ulid, CatalogueError> {
    Ulid::from_string(raw.trim()).map_err(|_| CatalogueError::MalformedIdentifier(raw.to_string()))
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Creation time embedded in an identifier, second precision
pub fn issued_at(raw: &str) -> Result<String, CatalogueError> {
    let id = parse_id(raw)?;
    let millis = i64::try_from(id.timestamp_ms())
        .map_err(|_| CatalogueError::MalformedIdentifier(raw.to_string()))?;
    let at = DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| CatalogueError::MalformedIdentifier(raw.to_string()))?;
    Ok(format_timestamp(at))
}

/// Build the URI of an entity.
///
/// The catalogue is named after the host alone. Any other entity is named
/// `{structure}/{kind}/{id}` where `structure` must contain `{host}`. When
/// `id` is `None` a fresh identifier is minted; the identifier used is
/// returned alongside the URI.
pub fn build_uri(
    host: &str,
    structure: &str,
    kind: EntityKind,
    id: Option<Ulid>,
    generator: &mut IdGenerator,
) -> Result<(String, Ulid), CatalogueError> {
    if host.trim().is_empty() {
        return Err(CatalogueError::NotInformedField("uri.host".to_string()));
    }

    let id = id.unwrap_or_else(|| generator.next_id());

    if kind == EntityKind::Catalogue {
        return Ok((format!("http://{}/", host), id));
    }

    if !structure.contains("{host}") {
        return Err(CatalogueError::UnexpectedValue {
            field: "uri.structure".to_string(),
            value: structure.to_string(),
            choices: "a value containing {host}".to_string(),
        });
    }

    let mut base = structure.replace("{host}", host);
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok((format!("{}{}/{}", base, kind, id), id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_uri_is_deterministic() {
        let mut generator = IdGenerator::new();
        let id = generator.next_id();

        let (first, _) = build_uri(
            "data.example.org",
            DEFAULT_URI_STRUCTURE,
            EntityKind::Dataset,
            Some(id),
            &mut generator,
        )
        .unwrap();
        let (second, used) = build_uri(
            "data.example.org",
            DEFAULT_URI_STRUCTURE,
            EntityKind::Dataset,
            Some(id),
            &mut generator,
        )
        .unwrap();

        assert_eq!(first, second);
        assert_eq!(used, id);
        assert_eq!(first, format!("http://data.example.org/cb/dataset/{}", id));
    }

    #[test]
    fn test_build_uri_catalogue_is_host_only() {
        let mut generator = IdGenerator::new();
        let id = generator.next_id();
        let (uri, used) = build_uri(
            "data.example.org",
            "no placeholder here",
            EntityKind::Catalogue,
            Some(id),
            &mut generator,
        )
        .unwrap();
        assert_eq!(uri, "http://data.example.org/");
        assert_eq!(used, id);
    }

    #[test]
    fn test_build_uri_appends_slash_and_mints() {
        let mut generator = IdGenerator::new();
        let (uri, id) = build_uri(
            "h",
            "https://{host}/open",
            EntityKind::Distribution,
            None,
            &mut generator,
        )
        .unwrap();
        assert_eq!(uri, format!("https://h/open/distribution/{}", id));
    }

    #[test]
    fn test_build_uri_errors() {
        let mut generator = IdGenerator::new();
        assert!(matches!(
            build_uri("h", "http://fixed/", EntityKind::Dataset, None, &mut generator),
            Err(CatalogueError::UnexpectedValue { .. })
        ));
        assert!(matches!(
            build_uri("", DEFAULT_URI_STRUCTURE, EntityKind::Dataset, None, &mut generator),
            Err(CatalogueError::NotInformedField(_))
        ));
    }

    #[test]
    fn test_generator_is_monotonic() {
        let mut generator = IdGenerator::new();
        let ids: Vec<Ulid> = (0..50).map(|_| generator.next_id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_issued_at() {
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let id = Ulid::from_datetime(at.into());
        assert_eq!(issued_at(&id.to_string()).unwrap(), "2023-11-14T22:13:20Z");

        assert!(matches!(
            issued_at("not-an-identifier"),
            Err(CatalogueError::MalformedIdentifier(_))
        ));
    }
}
