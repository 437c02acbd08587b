//! Error types for catalogue maintenance

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("RDF/XML file not found when trying to load XML tree at: {path}")]
    DocumentNotFound { path: String },

    #[error("There was a problem parsing the RDF/XML file at \"{path}\": {reason}")]
    Parse { path: String, reason: String },

    #[error("There was an error trying to write the RDF file in disk: {path} ({reason})")]
    Writing { path: String, reason: String },

    #[error("Dataset for \"{0}\" Data Model not found in RDF file")]
    DatasetNotFound(String),

    #[error("Removing last dataset in RDF file. This will remove entire RDF file")]
    LastDataset,

    #[error("Identifier \"{0}\" is not a well-formed time-ordered identifier")]
    MalformedIdentifier(String),

    #[error("Field \"{field}\" value ({value}) not expected. Possible values: {choices}")]
    UnexpectedValue {
        field: String,
        value: String,
        choices: String,
    },

    #[error("Field \"{0}\" is not informed")]
    NotInformedField(String),

    #[error("Field \"{field}\" value is not well-formatted: {value}")]
    WrongFormat { field: String, value: String },

    #[error("Key \"{key}\" is not present in section \"{section}\" from config file")]
    SectionKey { section: String, key: String },

    #[error("There was a problem with the path to config file: {0}")]
    ConfigFilePath(PathBuf),

    #[error("Failed to parse config file {path}: {reason}")]
    ConfigParse { path: String, reason: String },

    #[error("ID for Data Model \"{0}\" not found")]
    NoIdForDataModel(String),

    #[error("Namespace prefix \"{0}\" is not declared in the document")]
    UnknownPrefix(String),

    #[error("Expected node <{0}> not found in document")]
    MissingNode(String),

    #[error("A catalogue needs at least one dataset")]
    EmptyCatalogue,

    #[error("GeoJSON at {path} could not be used: {reason}")]
    InvalidGeoJson { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogueError {
    /// True for the signal that removal should drop the whole document
    pub fn is_last_dataset(&self) -> bool {
        matches!(self, CatalogueError::LastDataset)
    }
}
