//! In-memory catalogue records
//!
//! These are filled from configuration (see [`crate::assemble`]) and handed
//! to the mappers. Optional fields use an empty `String` or `None` for
//! "not configured".

use std::fmt;
use std::str::FromStr;

use ulid::Ulid;

use crate::error::CatalogueError;

/// A shared organization record, referenced by URI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Publisher {
    pub uri: String,
    pub name: String,
    /// Publisher-type vocabulary URI
    pub kind: Option<String>,
    pub homepage: Option<String>,
}

/// Geometry of the area a dataset covers
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialGeometry {
    /// `TYPE(lon lat, ...)` text
    pub wkt: String,
    /// GeoJSON geometry object serialized as JSON
    pub geojson: String,
}

impl SpatialGeometry {
    /// Values for the `locn:geometry` nodes, in template order
    pub fn texts(&self) -> [&str; 2] {
        [&self.wkt, &self.geojson]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub uri: String,
    pub title: String,
    /// Used as both access and download URL
    pub url: String,
    pub license: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Configuration section the dataset comes from
    pub name: String,
    pub id: Ulid,
    pub uri: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub publisher: Publisher,
    pub themes: Vec<String>,
    pub contact_email: String,
    pub periodicity: String,
    pub access_rights: String,
    pub landing_page: String,
    pub spatial: Option<SpatialGeometry>,
    pub resources: Vec<Resource>,
}

impl Dataset {
    pub fn resource_uris(&self) -> Vec<String> {
        self.resources.iter().map(|r| r.uri.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalogue {
    pub uri: String,
    pub title: String,
    pub description: String,
    pub homepage: String,
    pub publisher: Publisher,
    pub datasets: Vec<Dataset>,
}

impl Catalogue {
    pub fn dataset_uris(&self) -> Vec<String> {
        self.datasets.iter().map(|d| d.uri.clone()).collect()
    }

    /// The catalogue publisher followed by every dataset publisher,
    /// keeping only the first occurrence of each full record
    pub fn unique_publishers(&self) -> Vec<&Publisher> {
        let mut seen: Vec<&Publisher> = Vec::new();
        for publisher in
            std::iter::once(&self.publisher).chain(self.datasets.iter().map(|d| &d.publisher))
        {
            if !seen.contains(&publisher) {
                seen.push(publisher);
            }
        }
        seen
    }
}

/// Axis along which a data-model family is split into distributions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    Category,
    Location,
}

impl FromStr for Allocation {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(Allocation::Category),
            "location" => Ok(Allocation::Location),
            other => Err(CatalogueError::UnexpectedValue {
                field: "dataset.allocation".to_string(),
                value: other.to_string(),
                choices: "category, location".to_string(),
            }),
        }
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allocation::Category => f.write_str("category"),
            Allocation::Location => f.write_str("location"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher(uri: &str, name: &str) -> Publisher {
        Publisher {
            uri: uri.to_string(),
            name: name.to_string(),
            kind: None,
            homepage: None,
        }
    }

    fn dataset(name: &str, publisher: Publisher) -> Dataset {
        Dataset {
            name: name.to_string(),
            id: Ulid::nil(),
            uri: format!("http://h/cb/dataset/{}", name),
            title: name.to_string(),
            description: String::new(),
            keywords: Vec::new(),
            publisher,
            themes: Vec::new(),
            contact_email: String::new(),
            periodicity: String::new(),
            access_rights: String::new(),
            landing_page: String::new(),
            spatial: None,
            resources: Vec::new(),
        }
    }

    #[test]
    fn test_unique_publishers_uses_full_record() {
        let p1 = publisher("http://h/p1", "P1");
        let catalogue = Catalogue {
            uri: "http://h/".to_string(),
            title: "c".to_string(),
            description: "d".to_string(),
            homepage: String::new(),
            publisher: p1.clone(),
            datasets: vec![
                dataset("a", p1.clone()),
                dataset("b", publisher("http://h/p1", "P1 renamed")),
                dataset("c", publisher("http://h/p2", "P2")),
            ],
        };

        let names: Vec<_> = catalogue
            .unique_publishers()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["P1", "P1 renamed", "P2"]);
    }

    #[test]
    fn test_allocation_from_str() {
        assert_eq!("location".parse::<Allocation>().unwrap(), Allocation::Location);
        assert!(matches!(
            "region".parse::<Allocation>(),
            Err(CatalogueError::UnexpectedValue { .. })
        ));
    }
}
