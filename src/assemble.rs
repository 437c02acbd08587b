//! Building catalogue records from configuration

use tracing::debug;
use ulid::Ulid;

use crate::api::{build_resource_url, ResourceFilter};
use crate::config::{ConfigStore, MainSettings, Separator, CATALOGUE_SECTION};
use crate::error::CatalogueError;
use crate::id::{build_uri, EntityKind, IdGenerator};
use crate::model::{Allocation, Catalogue, Dataset, Publisher, Resource};
use crate::spatial::load_geometry;
use crate::validate::{is_informed, is_informed_list, is_valid_url, transform_vocabulary};
use crate::vocab::{family, ACCESS_RIGHTS_VOCABULARY, FREQUENCIES, PUBLISHER_TYPES, THEMES};

/// Description shared by every distribution
pub const RESOURCE_DESCRIPTION: &str =
    "Results can be paginated using \"offset\" and \"limit\" as URL parameters";

/// `AirQualityObserved` → `Air Quality Observed`
pub fn split_uppercase(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if c.is_ascii_uppercase() {
            out.push(' ');
        }
        out.push(c);
    }
    out.trim().to_string()
}

pub struct Assembler<'a> {
    config: &'a ConfigStore,
    settings: MainSettings,
    generator: IdGenerator,
}

impl<'a> Assembler<'a> {
    pub fn new(config: &'a ConfigStore) -> Result<Self, CatalogueError> {
        Ok(Self {
            config,
            settings: config.main_settings()?,
            generator: IdGenerator::new(),
        })
    }

    pub fn settings(&self) -> &MainSettings {
        &self.settings
    }

    /// URI a dataset published under `id` has
    pub fn dataset_uri(&mut self, id: Ulid) -> Result<String, CatalogueError> {
        let (uri, _) = build_uri(
            &self.settings.host,
            &self.settings.structure,
            EntityKind::Dataset,
            Some(id),
            &mut self.generator,
        )?;
        Ok(uri)
    }

    /// The catalogue with one freshly identified dataset per section
    pub fn catalogue(&mut self, sections: &[String]) -> Result<Catalogue, CatalogueError> {
        debug!(datamodels = %sections.join(", "), "Building catalogue");
        let section = CATALOGUE_SECTION;

        let title = self.config.get(section, "title", None)?;
        is_informed("title", &title)?;
        let description = self.config.get(section, "description", None)?;
        is_informed("description", &description)?;
        let homepage = self.config.get(section, "homepage", Some(""))?;
        is_valid_url("homepage", &homepage)?;
        let publisher = self.publisher(section, "")?;

        let (uri, _) = build_uri(
            &self.settings.host,
            &self.settings.structure,
            EntityKind::Catalogue,
            None,
            &mut self.generator,
        )?;

        let mut datasets = Vec::with_capacity(sections.len());
        for name in sections {
            datasets.push(self.dataset(name, None)?);
        }
        debug!(count = datasets.len(), "Datasets built");

        Ok(Catalogue {
            uri,
            title,
            description,
            homepage,
            publisher,
            datasets,
        })
    }

    /// One dataset; `id` is reused when given, minted otherwise
    pub fn dataset(&mut self, name: &str, id: Option<Ulid>) -> Result<Dataset, CatalogueError> {
        debug!(datamodel = %name, "Building dataset");

        let known = self.config.datamodels();
        if !known.iter().any(|m| m == name) {
            return Err(CatalogueError::UnexpectedValue {
                field: "[datamodel section]".to_string(),
                value: name.to_string(),
                choices: known.join(", "),
            });
        }
        let config = self.config;

        let kind = config.get(name, "datamodel.type", None)?;
        is_informed("datamodel.type", &kind)?;
        let service = config.get(name, "datamodel.service", Some(""))?;
        let service_path = config.get(name, "datamodel.service-path", Some(""))?;

        let title = config.get(name, "dataset.title", None)?;
        is_informed("dataset.title", &title)?;
        let description = config.get(name, "dataset.description", None)?;
        is_informed("dataset.description", &description)?;

        let contact_email = config.get(name, "dataset.contact-point", Some(""))?;
        let keywords = config.get_list(name, "dataset.keywords", Separator::Percent)?;
        let publisher = self.publisher(name, "dataset.")?;

        let themes = config
            .get_list(name, "dataset.themes", Separator::Whitespace)?
            .iter()
            .map(|theme| transform_vocabulary(&THEMES, theme))
            .collect::<Result<Vec<_>, _>>()?;
        let access_rights = transform_vocabulary(
            &ACCESS_RIGHTS_VOCABULARY,
            &config.get(name, "dataset.access-rights", Some(""))?,
        )?;
        let periodicity = transform_vocabulary(
            &FREQUENCIES,
            &config.get(name, "dataset.periodicity", Some(""))?,
        )?;
        let spatial = load_geometry(&config.get(name, "dataset.spatial", Some(""))?)?;
        let landing_page = config.get(name, "dataset.landing-page", Some(""))?;
        is_valid_url("dataset.landing-page", &landing_page)?;

        let (uri, id) = build_uri(
            &self.settings.host,
            &self.settings.structure,
            EntityKind::Dataset,
            id,
            &mut self.generator,
        )?;
        debug!(datamodel = %name, %id, "Dataset identifier assigned");

        let resources = self.resources(name, &kind, &service, &service_path)?;

        Ok(Dataset {
            name: name.to_string(),
            id,
            uri,
            title,
            description,
            keywords,
            publisher,
            themes,
            contact_email,
            periodicity,
            access_rights,
            landing_page,
            spatial,
            resources,
        })
    }

    fn publisher(&self, section: &str, prefix: &str) -> Result<Publisher, CatalogueError> {
        let key = |field: &str| format!("{}publisher-{}", prefix, field);

        let name = self.config.get(section, &key("name"), Some(""))?;
        is_informed(&key("name"), &name)?;
        let uri = self.config.get(section, &key("uri"), Some(""))?;
        is_informed(&key("uri"), &uri)?;
        is_valid_url(&key("uri"), &uri)?;
        let homepage = self.config.get(section, &key("homepage"), Some(""))?;
        is_valid_url(&key("homepage"), &homepage)?;
        let kind = transform_vocabulary(
            &PUBLISHER_TYPES,
            &self.config.get(section, &key("type"), Some(""))?,
        )?;

        Ok(Publisher {
            uri,
            name,
            kind: Some(kind).filter(|k| !k.is_empty()),
            homepage: Some(homepage).filter(|h| !h.is_empty()),
        })
    }

    fn resources(
        &mut self,
        name: &str,
        kind: &str,
        service: &str,
        service_path: &str,
    ) -> Result<Vec<Resource>, CatalogueError> {
        let family = family(kind);
        let allocations = self
            .config
            .get_list(name, "dataset.allocation", Separator::Whitespace)?;
        is_informed_list("dataset.allocation", &allocations)?;
        let license = self.config.get(name, "distribution.license", Some(""))?;
        is_valid_url("distribution.license", &license)?;

        let mut resources = Vec::new();
        for raw in &allocations {
            let allocation: Allocation = raw.parse()?;
            let allowed = match allocation {
                Allocation::Category => family.allocation.category,
                Allocation::Location => family.allocation.location,
            };
            if !allowed {
                return Err(CatalogueError::UnexpectedValue {
                    field: "dataset.allocation".to_string(),
                    value: raw.clone(),
                    choices: if family.allocation.location {
                        "category, location".to_string()
                    } else {
                        "category".to_string()
                    },
                });
            }

            let locations = match allocation {
                Allocation::Category => Vec::new(),
                Allocation::Location => {
                    let locations =
                        self.config
                            .get_list(name, "distribution.locations", Separator::Percent)?;
                    is_informed_list("distribution.locations", &locations)?;
                    locations
                }
            };

            for member in &family.members {
                let title = split_uppercase(member);
                match allocation {
                    Allocation::Category => {
                        let filter = ResourceFilter {
                            entity: member,
                            location: None,
                        };
                        resources.push(self.resource(title, filter, service, service_path, &license)?);
                    }
                    Allocation::Location => {
                        for location in &locations {
                            let filter = ResourceFilter {
                                entity: member,
                                location: Some(location.as_str()),
                            };
                            let title = format!("{} in {}", title, location);
                            resources.push(self.resource(title, filter, service, service_path, &license)?);
                        }
                    }
                }
            }
        }

        debug!(datamodel = %name, count = resources.len(), "Distributions built");
        Ok(resources)
    }

    fn resource(
        &mut self,
        title: String,
        filter: ResourceFilter<'_>,
        service: &str,
        service_path: &str,
        license: &str,
    ) -> Result<Resource, CatalogueError> {
        let url = build_resource_url(&self.settings, service, service_path, filter)?;
        let (uri, _) = build_uri(
            &self.settings.host,
            &self.settings.structure,
            EntityKind::Distribution,
            None,
            &mut self.generator,
        )?;
        debug!(%title, %url, "Distribution built");

        Ok(Resource {
            uri,
            title,
            url,
            license: license.to_string(),
            description: RESOURCE_DESCRIPTION.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const CONFIG: &str = r#"
[main]
uri.host = "data.example.org"
integration.api = "http://api.example.org"
integration.orion = "http://orion:1026"

[catalogue]
title = "City open data"
description = "Context data published by the city"
publisher-name = "City Council"
publisher-uri = "http://city.example.org/"
publisher-type = "local_authority"

[parking]
datamodel.type = "Parking"
datamodel.service = "city"
datamodel.service-path = "/mobility"
dataset.title = "Parking"
dataset.description = "Parking availability"
dataset.keywords = "parking%mobility"
dataset.publisher-name = "Mobility Office"
dataset.publisher-uri = "http://city.example.org/mobility"
dataset.themes = "transport"
dataset.periodicity = "continuously"
dataset.allocation = ["category", "location"]
distribution.locations = "North % South"
distribution.license = "https://creativecommons.org/licenses/by/4.0/"

[devices]
datamodel.type = "Device"
dataset.title = "Devices"
dataset.description = "Sensors"
dataset.publisher-name = "City Council"
dataset.publisher-uri = "http://city.example.org/"
dataset.allocation = "location"
distribution.locations = "North"
"#;

    fn config() -> ConfigStore {
        ConfigStore::parse(CONFIG, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn test_split_uppercase() {
        assert_eq!(split_uppercase("AirQualityObserved"), "Air Quality Observed");
        assert_eq!(split_uppercase("Alert"), "Alert");
        assert_eq!(split_uppercase("Open311:ServiceType"), "Open311: Service Type");
    }

    #[test]
    fn test_dataset_expands_resources() {
        let config = config();
        let mut assembler = Assembler::new(&config).unwrap();
        let dataset = assembler.dataset("parking", None).unwrap();

        // five members by category, then five members × two locations
        assert_eq!(dataset.resources.len(), 15);
        assert_eq!(dataset.resources[0].title, "Off Street Parking");
        assert_eq!(dataset.resources[5].title, "Off Street Parking in North");
        assert_eq!(dataset.resources[6].title, "Off Street Parking in South");
        assert!(dataset.resources[0]
            .url
            .starts_with("http://api.example.org/aHR0cDovL29yaW9uOjEwMjY/entity/OffStreetParking?fs="));
        assert_eq!(dataset.resources[0].description, RESOURCE_DESCRIPTION);
        assert_eq!(dataset.keywords, vec!["parking", "mobility"]);
        assert_eq!(
            dataset.periodicity,
            "http://publications.europa.eu/resource/authority/frequency/UPDATE_CONT"
        );
        assert_eq!(dataset.uri, format!("http://data.example.org/cb/dataset/{}", dataset.id));
        assert!(dataset.spatial.is_none());
        assert!(dataset.publisher.kind.is_none());
    }

    #[test]
    fn test_dataset_reuses_identifier() {
        let config = config();
        let mut assembler = Assembler::new(&config).unwrap();
        let id = Ulid::new();
        let dataset = assembler.dataset("parking", Some(id)).unwrap();
        assert_eq!(dataset.id, id);
        assert_eq!(dataset.uri, assembler.dataset_uri(id).unwrap());
    }

    #[test]
    fn test_disallowed_allocation() {
        let config = config();
        let mut assembler = Assembler::new(&config).unwrap();
        assert!(matches!(
            assembler.dataset("devices", None),
            Err(CatalogueError::UnexpectedValue { field, .. }) if field == "dataset.allocation"
        ));
    }

    #[test]
    fn test_unknown_section() {
        let config = config();
        let mut assembler = Assembler::new(&config).unwrap();
        assert!(matches!(
            assembler.dataset("catalogue", None),
            Err(CatalogueError::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn test_catalogue() {
        let config = config();
        let mut assembler = Assembler::new(&config).unwrap();
        let catalogue = assembler.catalogue(&["parking".to_string()]).unwrap();

        assert_eq!(catalogue.uri, "http://data.example.org/");
        assert_eq!(
            catalogue.publisher.kind.as_deref(),
            Some("http://purl.org/adms/publishertype/LocalAuthority")
        );
        assert_eq!(catalogue.datasets.len(), 1);
        assert_eq!(catalogue.unique_publishers().len(), 2);
    }
}
