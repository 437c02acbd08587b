//! Integrate, modify and delete workflows
//!
//! An [`Integrator`] owns the configuration, the identifier store and the
//! location of the persisted catalogue. Every workflow validates and builds
//! its records before touching disk; identifiers are persisted only after the
//! document has been written.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::assemble::Assembler;
use crate::config::ConfigStore;
use crate::document::{self, Clock, SystemClock};
use crate::error::CatalogueError;
use crate::store::IdentifierStore;
use crate::template::{self, TemplateSource};
use crate::writer;

/// Selector meaning every candidate data model
pub const ALL: &str = "all";

/// What a delete run ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Datasets removed, document rewritten
    Removed(Vec<String>),
    /// The last dataset was requested; document and identifiers dropped
    CatalogueRemoved,
}

pub struct Integrator {
    config: ConfigStore,
    store: IdentifierStore,
    document: PathBuf,
    template: TemplateSource,
    clock: Box<dyn Clock>,
}

impl Integrator {
    pub fn new(
        config: ConfigStore,
        store: IdentifierStore,
        document: PathBuf,
        template: TemplateSource,
    ) -> Self {
        Self {
            config,
            store,
            document,
            template,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn document_path(&self) -> &Path {
        &self.document
    }

    /// Data models currently published
    pub fn integrated(&self) -> Vec<String> {
        self.store.list_all()
    }

    /// Build a brand-new catalogue from `models` and replace any existing one
    pub fn integrate(&mut self, models: &[String]) -> Result<Vec<String>, CatalogueError> {
        let models = expand(models, || self.config.datamodels());
        info!(datamodels = %models.join(", "), "Integrating data models");

        let catalogue = Assembler::new(&self.config)?.catalogue(&models)?;
        let doc = document::create(self.template.load()?, &catalogue, self.clock.as_ref())?;
        writer::write(&doc, &self.document)?;

        self.store.clear()?;
        for dataset in &catalogue.datasets {
            self.store.save(&dataset.name, dataset.id)?;
        }

        info!(count = models.len(), "Integration finished");
        Ok(models)
    }

    /// Add or refresh `models` in the persisted catalogue
    pub fn modify(&mut self, models: &[String]) -> Result<Vec<String>, CatalogueError> {
        let models = expand(models, || self.config.datamodels());
        info!(datamodels = %models.join(", "), "Modifying data models");

        let mut doc = template::load(&self.document)?;
        let mut assembler = Assembler::new(&self.config)?;
        let mut datasets = Vec::with_capacity(models.len());

        for name in &models {
            let dataset = assembler.dataset(name, self.store.get(name)?)?;
            document::update(&mut doc, self.template.load()?, &dataset, self.clock.as_ref())?;
            datasets.push(dataset);
        }
        writer::write(&doc, &self.document)?;

        for dataset in &datasets {
            self.store.save(&dataset.name, dataset.id)?;
        }

        info!(count = models.len(), "Modification finished");
        Ok(models)
    }

    /// Remove `models` from the persisted catalogue.
    ///
    /// Asking to remove the only remaining dataset deletes the whole
    /// catalogue file and forgets every identifier.
    pub fn delete(&mut self, models: &[String]) -> Result<DeleteOutcome, CatalogueError> {
        let models = expand(models, || self.store.list_all());
        info!(datamodels = %models.join(", "), "Deleting data models");

        let mut doc = template::load(&self.document)?;
        let template = self.template.load()?;
        let mut assembler = Assembler::new(&self.config)?;

        for name in &models {
            let id = self
                .store
                .get(name)?
                .ok_or_else(|| CatalogueError::NoIdForDataModel(name.clone()))?;
            let uri = assembler.dataset_uri(id)?;

            match document::remove(&mut doc, &template, name, &uri, self.clock.as_ref()) {
                Ok(()) => {}
                Err(e) if e.is_last_dataset() => {
                    warn!(datamodel = %name, "{}", e);
                    self.store.clear()?;
                    writer::remove(&self.document)?;
                    return Ok(DeleteOutcome::CatalogueRemoved);
                }
                Err(e) => return Err(e),
            }
        }
        writer::write(&doc, &self.document)?;

        for name in &models {
            self.store.remove(name)?;
        }

        info!(count = models.len(), "Deletion finished");
        Ok(DeleteOutcome::Removed(models))
    }
}

/// Replace an empty selection or one containing `all` with every candidate
fn expand(models: &[String], candidates: impl FnOnce() -> Vec<String>) -> Vec<String> {
    if models.is_empty() || models.iter().any(|m| m == ALL) {
        candidates()
    } else {
        let mut unique: Vec<String> = Vec::with_capacity(models.len());
        for model in models {
            if !unique.contains(model) {
                unique.push(model.clone());
            }
        }
        unique
    }
}
