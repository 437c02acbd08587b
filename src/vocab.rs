//! DCAT-AP vocabulary
//!
//! Qualified tag names written into the catalogue document, the controlled
//! vocabularies configuration literals map onto, and the table of data-model
//! families used to expand a dataset into distributions.

use crate::error::CatalogueError;
use crate::namespace::{ExpandedName, NamespaceResolver};

pub const CATALOG: &str = "dcat:Catalog";
pub const CATALOG_DATASET: &str = "dcat:dataset";
pub const DATASET: &str = "dcat:Dataset";
pub const DATASET_DISTRIBUTION: &str = "dcat:distribution";
pub const DISTRIBUTION: &str = "dcat:Distribution";
pub const ORGANIZATION: &str = "foaf:Organization";

pub const ABOUT: &str = "rdf:about";
pub const RESOURCE: &str = "rdf:resource";

pub const IDENTIFIER: &str = "dct:identifier";
pub const TITLE: &str = "dct:title";
pub const DESCRIPTION: &str = "dct:description";
pub const PUBLISHER: &str = "dct:publisher";
pub const HOMEPAGE: &str = "foaf:homepage";
pub const TYPE: &str = "rdf:type";
pub const ISSUED: &str = "dct:issued";
pub const MODIFIED: &str = "dct:modified";
pub const THEME: &str = "dcat:theme";
pub const KEYWORD: &str = "dcat:keyword";
pub const CONTACT_POINT: &str = "dcat:contactPoint";
pub const CONTACT_POINT_NAME: &str = "vcard:fn";
pub const CONTACT_POINT_EMAIL: &str = "vcard:hasEmail";
pub const PERIODICITY: &str = "dct:accrualPeriodicity";
pub const ACCESS_RIGHTS: &str = "dct:accessRights";
pub const LANDING_PAGE: &str = "dcat:landingPage";
pub const SPATIAL: &str = "dct:spatial";
pub const SPATIAL_GEOMETRY: &str = "locn:geometry";
pub const ACCESS_URL: &str = "dcat:accessURL";
pub const DOWNLOAD_URL: &str = "dcat:downloadURL";
pub const LICENSE: &str = "dct:license";
pub const ORGANIZATION_NAME: &str = "foaf:name";

/// Every tag above, resolved once against a document's namespaces
#[derive(Debug, Clone)]
pub struct Tags {
    pub catalog: ExpandedName,
    pub catalog_dataset: ExpandedName,
    pub dataset: ExpandedName,
    pub dataset_distribution: ExpandedName,
    pub distribution: ExpandedName,
    pub organization: ExpandedName,
    pub about: ExpandedName,
    pub resource: ExpandedName,
    pub identifier: ExpandedName,
    pub title: ExpandedName,
    pub description: ExpandedName,
    pub publisher: ExpandedName,
    pub homepage: ExpandedName,
    pub rdf_type: ExpandedName,
    pub issued: ExpandedName,
    pub modified: ExpandedName,
    pub theme: ExpandedName,
    pub keyword: ExpandedName,
    pub contact_point: ExpandedName,
    pub contact_point_name: ExpandedName,
    pub contact_point_email: ExpandedName,
    pub periodicity: ExpandedName,
    pub access_rights: ExpandedName,
    pub landing_page: ExpandedName,
    pub spatial: ExpandedName,
    pub spatial_geometry: ExpandedName,
    pub access_url: ExpandedName,
    pub download_url: ExpandedName,
    pub license: ExpandedName,
    pub organization_name: ExpandedName,
}

impl Tags {
    /// Fails with `UnknownPrefix` if the document lacks one of the
    /// rdf, dcat, dct, foaf, vcard or locn declarations
    pub fn resolve(ns: &NamespaceResolver) -> Result<Self, CatalogueError> {
        Ok(Self {
            catalog: ns.resolve(CATALOG)?,
            catalog_dataset: ns.resolve(CATALOG_DATASET)?,
            dataset: ns.resolve(DATASET)?,
            dataset_distribution: ns.resolve(DATASET_DISTRIBUTION)?,
            distribution: ns.resolve(DISTRIBUTION)?,
            organization: ns.resolve(ORGANIZATION)?,
            about: ns.resolve_attribute(ABOUT)?,
            resource: ns.resolve_attribute(RESOURCE)?,
            identifier: ns.resolve(IDENTIFIER)?,
            title: ns.resolve(TITLE)?,
            description: ns.resolve(DESCRIPTION)?,
            publisher: ns.resolve(PUBLISHER)?,
            homepage: ns.resolve(HOMEPAGE)?,
            rdf_type: ns.resolve(TYPE)?,
            issued: ns.resolve(ISSUED)?,
            modified: ns.resolve(MODIFIED)?,
            theme: ns.resolve(THEME)?,
            keyword: ns.resolve(KEYWORD)?,
            contact_point: ns.resolve(CONTACT_POINT)?,
            contact_point_name: ns.resolve(CONTACT_POINT_NAME)?,
            contact_point_email: ns.resolve(CONTACT_POINT_EMAIL)?,
            periodicity: ns.resolve(PERIODICITY)?,
            access_rights: ns.resolve(ACCESS_RIGHTS)?,
            landing_page: ns.resolve(LANDING_PAGE)?,
            spatial: ns.resolve(SPATIAL)?,
            spatial_geometry: ns.resolve(SPATIAL_GEOMETRY)?,
            access_url: ns.resolve(ACCESS_URL)?,
            download_url: ns.resolve(DOWNLOAD_URL)?,
            license: ns.resolve(LICENSE)?,
            organization_name: ns.resolve(ORGANIZATION_NAME)?,
        })
    }
}

const THEME_BASE: &str = "http://publications.europa.eu/resource/authority/data-theme/";
const FREQUENCY_BASE: &str = "http://publications.europa.eu/resource/authority/frequency/";
const ACCESS_RIGHT_BASE: &str = "http://publications.europa.eu/resource/authority/access-right/";
const PUBLISHER_TYPE_BASE: &str = "http://purl.org/adms/publishertype/";

/// A controlled vocabulary: configuration literal → authority code
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    pub field: &'static str,
    base: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

impl Vocabulary {
    pub fn lookup(&self, literal: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(key, _)| *key == literal)
            .map(|(_, code)| format!("{}{}", self.base, code))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }
}

pub const THEMES: Vocabulary = Vocabulary {
    field: "dataset.themes",
    base: THEME_BASE,
    entries: &[
        ("agriculture", "AGRI"),
        ("education", "EDUC"),
        ("environment", "ENVI"),
        ("energy", "ENER"),
        ("transport", "TRAN"),
        ("technology", "TECH"),
        ("economy", "ECON"),
        ("social", "SOCI"),
        ("health", "HEAL"),
        ("government", "GOVE"),
        ("regions", "REGI"),
        ("justice", "JUST"),
        ("international", "INTR"),
        ("provisional", "OP_DATPRO"),
    ],
};

pub const FREQUENCIES: Vocabulary = Vocabulary {
    field: "dataset.periodicity",
    base: FREQUENCY_BASE,
    entries: &[
        ("triennial", "TRIENNIAL"),
        ("biennial", "BIENNIAL"),
        ("annual", "ANNUAL"),
        ("semiannual", "ANNUAL_2"),
        ("three_times_year", "ANNUAL_3"),
        ("quarterly", "QUARTERLY"),
        ("bimonthly", "BIMONTHLY"),
        ("monthly", "MONTHLY"),
        ("semimonthly", "MONTHLY_2"),
        ("biweekly", "BIWEEKLY"),
        ("three_times_month", "MONTHLY_3"),
        ("weekly", "WEEKLY"),
        ("semiweekly", "WEEKLY_2"),
        ("three_times_week", "WEEKLY_3"),
        ("daily", "DAILY"),
        ("continuously", "UPDATE_CONT"),
        ("irregular", "IRREG"),
        ("unknown", "UNKNOWN"),
        ("other", "OTHER"),
        ("twice_day", "DAILY_2"),
        ("continuous", "CONT"),
        ("never", "NEVER"),
        ("quadrennial", "QUADRENNIAL"),
        ("quinquennial", "QUINQUENNIAL"),
        ("hourly", "HOURLY"),
        ("decennial", "DECENNIAL"),
        ("provisional", "OP_DATPRO"),
    ],
};

pub const ACCESS_RIGHTS_VOCABULARY: Vocabulary = Vocabulary {
    field: "dataset.access-rights",
    base: ACCESS_RIGHT_BASE,
    entries: &[
        ("public", "PUBLIC"),
        ("restricted", "RESTRICTED"),
        ("non_public", "NON_PUBLIC"),
        ("provisional", "OP_DATPRO"),
    ],
};

pub const PUBLISHER_TYPES: Vocabulary = Vocabulary {
    field: "publisher-type",
    base: PUBLISHER_TYPE_BASE,
    entries: &[
        ("academia_scientific_org", "Academia-ScientificOrganisation"),
        ("company", "Company"),
        ("industry_consortium", "IndustryConsortium"),
        ("local_authority", "LocalAuthority"),
        ("national_authority", "NationalAuthority"),
        ("nongovernmental_org", "NonGovernmentalOrganisation"),
        ("nonprofit_org", "NonProfitOrganisation"),
        ("private_individual", "PrivateIndividual(s)"),
        ("regional_authority", "RegionalAuthority"),
        ("standardisation_body", "StandardisationBody"),
        ("supranational_authority", "SupraNationalAuthority"),
    ],
};

/// How a data-model family may be split into distributions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyAllocation {
    pub category: bool,
    pub location: bool,
}

const BOTH: FamilyAllocation = FamilyAllocation {
    category: true,
    location: true,
};
const CATEGORY_ONLY: FamilyAllocation = FamilyAllocation {
    category: true,
    location: false,
};

/// A data-model category and the entity types it groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataModelFamily {
    pub members: Vec<String>,
    pub allocation: FamilyAllocation,
}

const FAMILIES: &[(&str, &[&str], FamilyAllocation)] = &[
    ("Alerts", &["Alert"], BOTH),
    (
        "Parks & Gardens",
        &["Garden", "GreenspaceRecord", "FlowerBed"],
        BOTH,
    ),
    (
        "Environment",
        &[
            "AeroAllergenObserved",
            "AirQualityObserved",
            "WaterQualityObserved",
            "NoiseLevelObserved",
        ],
        BOTH,
    ),
    (
        "Point of Interest",
        &["PointOfInterest", "Beach", "Museum"],
        BOTH,
    ),
    (
        "Civic Issue Tracking",
        &["Open311:ServiceType", "Open311:ServiceRequest"],
        CATEGORY_ONLY,
    ),
    (
        "Street Lightning",
        &[
            "Streetlight",
            "StreetlightModel",
            "StreetlightGroup",
            "StreetlightControlCabinet",
        ],
        BOTH,
    ),
    ("Device", &["Device", "DeviceModel"], CATEGORY_ONLY),
    (
        "Transportation",
        &[
            "BikeHireDockingStation",
            "Road",
            "RoadSegment",
            "TrafficFlowObserved",
            "Vehicle",
            "VehicleModel",
            "EVChargingStation",
        ],
        BOTH,
    ),
    ("Indicators", &["KeyPerformanceIndicator"], BOTH),
    (
        "Waste Management",
        &["WasteContainerIsle", "WasteContainerModel", "WasteContainer"],
        BOTH,
    ),
    (
        "Parking",
        &[
            "OffStreetParking",
            "OnStreetParking",
            "ParkingGroup",
            "ParkingAccess",
            "ParkingSpot",
        ],
        BOTH,
    ),
    ("Weather", &["WeatherObserved", "WeatherForecast"], BOTH),
];

/// Look up a data-model category.
///
/// Unknown categories form a family of their own with both allocations.
pub fn family(category: &str) -> DataModelFamily {
    match FAMILIES.iter().find(|(name, _, _)| *name == category) {
        Some((_, members, allocation)) => DataModelFamily {
            members: members.iter().map(|m| m.to_string()).collect(),
            allocation: *allocation,
        },
        None => DataModelFamily {
            members: vec![category.to_string()],
            allocation: BOTH,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_lookup() {
        assert_eq!(
            THEMES.lookup("transport").as_deref(),
            Some("http://publications.europa.eu/resource/authority/data-theme/TRAN")
        );
        assert_eq!(
            FREQUENCIES.lookup("semiannual").as_deref(),
            Some("http://publications.europa.eu/resource/authority/frequency/ANNUAL_2")
        );
        assert_eq!(
            PUBLISHER_TYPES.lookup("private_individual").as_deref(),
            Some("http://purl.org/adms/publishertype/PrivateIndividual(s)")
        );
        assert!(ACCESS_RIGHTS_VOCABULARY.lookup("secret").is_none());
        assert_eq!(ACCESS_RIGHTS_VOCABULARY.keys().count(), 4);
    }

    #[test]
    fn test_family_lookup() {
        let parking = family("Parking");
        assert_eq!(parking.members.len(), 5);
        assert!(parking.allocation.location);

        let device = family("Device");
        assert!(!device.allocation.location);

        let custom = family("SmartMeter");
        assert_eq!(custom.members, vec!["SmartMeter".to_string()]);
        assert_eq!(custom.allocation, BOTH);
    }

    #[test]
    fn test_tags_need_declared_prefixes() {
        let mut ns = NamespaceResolver::new();
        ns.declare("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        assert!(matches!(
            Tags::resolve(&ns),
            Err(CatalogueError::UnknownPrefix(_))
        ));
    }
}
