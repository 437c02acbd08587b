//! DCAT-AP Catalogue Library
//!
//! This library maintains an RDF/XML catalogue describing the datasets a
//! context broker publishes, following the DCAT-AP 1.1 profile.
//!
//! # Overview
//!
//! A catalogue document holds one `dcat:Catalog`, the `dcat:Dataset` nodes it
//! references, their `dcat:Distribution` nodes and the `foaf:Organization`
//! nodes that publish them. Nodes are produced by cloning prototypes from a
//! template document and filling them from in-memory records.
//!
//! The library supports three document operations:
//!
//! 1. **Create** a complete catalogue from a [`Catalogue`] record
//! 2. **Update** one dataset in an existing catalogue, adding or replacing it
//! 3. **Delete** one dataset, together with its distributions and any
//!    publisher no longer referenced
//!
//! Records are usually assembled from a TOML configuration file, and dataset
//! identifiers are persisted between runs so a dataset keeps its URI.
//!
//! # Usage
//!
//! ## Build a catalogue from configuration
//!
//! ```ignore
//! use dcat_catalogue::{ConfigStore, IdentifierStore, Integrator, TemplateSource};
//!
//! let config = ConfigStore::load(Path::new("catalogue.toml"))?;
//! let ids = IdentifierStore::load(Path::new("integrated.toml"))?;
//! let mut integrator = Integrator::new(
//!     config,
//!     ids,
//!     PathBuf::from("catalogue.rdf"),
//!     TemplateSource::Embedded,
//! );
//! integrator.integrate(&["all".to_string()])?;
//! ```
//!
//! ## Work on documents directly
//!
//! ```ignore
//! use dcat_catalogue::{document, template, writer, SystemClock, TemplateSource};
//!
//! let mut doc = template::load(Path::new("catalogue.rdf"))?;
//! document::update(&mut doc, TemplateSource::Embedded.load()?, &dataset, &SystemClock)?;
//! writer::write(&doc, Path::new("catalogue.rdf"))?;
//! ```

pub mod api;
pub mod assemble;
pub mod config;
pub mod document;
pub mod error;
pub mod fragment;
pub mod id;
pub mod integration;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod namespace;
pub mod spatial;
pub mod store;
pub mod template;
pub mod validate;
pub mod vocab;
pub mod writer;
pub mod xml;

// Re-export main types for convenience
pub use crate::config::{ConfigStore, MainSettings};
pub use crate::document::{Clock, FixedClock, SystemClock};
pub use crate::error::CatalogueError;
pub use crate::integration::{DeleteOutcome, Integrator};
pub use crate::model::{Allocation, Catalogue, Dataset, Publisher, Resource, SpatialGeometry};
pub use crate::store::IdentifierStore;
pub use crate::template::TemplateSource;
pub use crate::xml::Document;
