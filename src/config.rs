//! Configuration file access
//!
//! The configuration is a TOML document with a `[main]` table, a
//! `[catalogue]` table and one table per data model. Keys such as
//! `dataset.title` are dotted TOML keys, i.e. nested tables, and are looked
//! up by walking the path.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::{debug, info};

use crate::error::CatalogueError;
use crate::id::DEFAULT_URI_STRUCTURE;
use crate::validate::{is_informed, is_valid_url};

pub const MAIN_SECTION: &str = "main";
pub const CATALOGUE_SECTION: &str = "catalogue";

pub const URI_HOST: &str = "uri.host";
pub const URI_STRUCTURE: &str = "uri.structure";
pub const INTEGRATION_API: &str = "integration.api";
pub const INTEGRATION_ORION: &str = "integration.orion";

/// Commented template written by `new-config`
pub const CONFIG_TEMPLATE: &str = include_str!("../assets/config-template.toml");

/// How a string-valued list field is split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Percent,
    Whitespace,
}

impl Separator {
    fn split(&self, raw: &str) -> Vec<String> {
        let parts: Vec<&str> = match self {
            Separator::Percent => raw.split('%').collect(),
            Separator::Whitespace => raw.split_whitespace().collect(),
        };
        parts
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Parsed configuration file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    table: Table,
}

impl ConfigStore {
    pub fn load(path: &Path) -> Result<Self, CatalogueError> {
        if !path.is_file() {
            return Err(CatalogueError::ConfigFilePath(path.to_path_buf()));
        }
        debug!(path = %path.display(), "Reading configuration");
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw, path)
    }

    pub fn parse(raw: &str, path: &Path) -> Result<Self, CatalogueError> {
        let table = raw
            .parse::<Table>()
            .map_err(|e| CatalogueError::ConfigParse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            table,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value of `key` in `section` as text.
    ///
    /// A missing or empty value yields `default` when one is given; a
    /// missing value without default fails with `SectionKey`.
    pub fn get(
        &self,
        section: &str,
        key: &str,
        default: Option<&str>,
    ) -> Result<String, CatalogueError> {
        let value = match self.lookup(section, key) {
            Ok(value) => value,
            Err(e) => return default.map(String::from).ok_or(e),
        };

        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Datetime(d) => d.to_string(),
            other => {
                return Err(CatalogueError::WrongFormat {
                    field: key.to_string(),
                    value: other.to_string(),
                })
            }
        };

        match default {
            Some(default) if text.is_empty() => Ok(default.to_string()),
            _ => Ok(text),
        }
    }

    /// A list field given either as an array or as a delimited string.
    ///
    /// A missing key is an empty list; a missing section fails.
    pub fn get_list(
        &self,
        section: &str,
        key: &str,
        separator: Separator,
    ) -> Result<Vec<String>, CatalogueError> {
        self.section(section)?;
        let value = match self.lookup(section, key) {
            Ok(value) => value,
            Err(_) => return Ok(Vec::new()),
        };

        match value {
            Value::String(s) => Ok(separator.split(s)),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.trim().to_string()),
                    other => Err(CatalogueError::WrongFormat {
                        field: key.to_string(),
                        value: other.to_string(),
                    }),
                })
                .filter(|item| !matches!(item, Ok(s) if s.is_empty()))
                .collect(),
            other => Err(CatalogueError::WrongFormat {
                field: key.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Data-model sections, in file order
    pub fn datamodels(&self) -> Vec<String> {
        self.table
            .iter()
            .filter(|(name, value)| {
                value.is_table() && *name != MAIN_SECTION && *name != CATALOGUE_SECTION
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.table.get(section).map(Value::is_table).unwrap_or(false)
    }

    /// Settings of the `[main]` section, validated
    pub fn main_settings(&self) -> Result<MainSettings, CatalogueError> {
        let host = self.get(MAIN_SECTION, URI_HOST, None)?;
        is_informed(URI_HOST, &host)?;

        let structure = self.get(MAIN_SECTION, URI_STRUCTURE, Some(DEFAULT_URI_STRUCTURE))?;

        let api = self.get(MAIN_SECTION, INTEGRATION_API, None)?;
        is_informed(INTEGRATION_API, &api)?;
        is_valid_url(INTEGRATION_API, &api)?;

        let orion = self.get(MAIN_SECTION, INTEGRATION_ORION, None)?;
        is_informed(INTEGRATION_ORION, &orion)?;
        is_valid_url(INTEGRATION_ORION, &orion)?;

        Ok(MainSettings {
            host,
            structure,
            api: api.trim_end_matches('/').to_string(),
            orion: orion.trim_end_matches('/').to_string(),
        })
    }

    fn section(&self, section: &str) -> Result<&Table, CatalogueError> {
        self.table
            .get(section)
            .and_then(Value::as_table)
            .ok_or_else(|| CatalogueError::SectionKey {
                section: section.to_string(),
                key: String::new(),
            })
    }

    fn lookup(&self, section: &str, key: &str) -> Result<&Value, CatalogueError> {
        let missing = || CatalogueError::SectionKey {
            section: section.to_string(),
            key: key.to_string(),
        };
        let table = self.section(section).map_err(|_| missing())?;

        // a quoted "dataset.title" key takes precedence over the nested form
        if let Some(value) = table.get(key) {
            return Ok(value);
        }

        let mut parts = key.split('.');
        let first = parts.next().ok_or_else(missing)?;
        let mut current = table.get(first).ok_or_else(missing)?;
        for part in parts {
            current = current
                .as_table()
                .and_then(|t| t.get(part))
                .ok_or_else(missing)?;
        }
        Ok(current)
    }
}

/// Host, URI layout and integration endpoints from `[main]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainSettings {
    pub host: String,
    pub structure: String,
    /// Integration API base, without trailing slash
    pub api: String,
    /// Context broker address, without trailing slash
    pub orion: String,
}

/// Write the configuration template to `path`.
///
/// An existing file is only replaced when `overwrite` is set.
pub fn write_template(path: &Path, overwrite: bool) -> Result<(), CatalogueError> {
    if path.exists() && !overwrite {
        return Err(CatalogueError::ConfigFilePath(path.to_path_buf()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(CONFIG_TEMPLATE.as_bytes())?;
    info!(path = %path.display(), "Configuration file generated");
    Ok(())
}
