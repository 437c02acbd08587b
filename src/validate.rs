//! Field validators for configuration values

use url::Url;

use crate::error::CatalogueError;
use crate::vocab::Vocabulary;

/// Fail with `NotInformedField` when `value` is blank
pub fn is_informed(field: &str, value: &str) -> Result<(), CatalogueError> {
    if value.trim().is_empty() {
        return Err(CatalogueError::NotInformedField(field.to_string()));
    }
    Ok(())
}

/// Fail with `NotInformedField` when the list has no entries
pub fn is_informed_list(field: &str, values: &[String]) -> Result<(), CatalogueError> {
    if values.is_empty() {
        return Err(CatalogueError::NotInformedField(field.to_string()));
    }
    Ok(())
}

/// Empty values pass; anything else must be an absolute http(s) or ftp(s) URL
/// with a host
pub fn is_valid_url(field: &str, value: &str) -> Result<(), CatalogueError> {
    if value.is_empty() {
        return Ok(());
    }

    let wrong_format = || CatalogueError::WrongFormat {
        field: field.to_string(),
        value: value.to_string(),
    };
    let url = Url::parse(value).map_err(|_| wrong_format())?;
    match url.scheme() {
        "http" | "https" | "ftp" | "ftps" if url.host_str().is_some() => Ok(()),
        _ => Err(wrong_format()),
    }
}

/// Empty values pass; anything else must be one of `choices`
pub fn is_expected_value(field: &str, value: &str, choices: &[&str]) -> Result<(), CatalogueError> {
    if value.is_empty() || choices.contains(&value) {
        return Ok(());
    }
    Err(CatalogueError::UnexpectedValue {
        field: field.to_string(),
        value: value.to_string(),
        choices: choices.join(", "),
    })
}

/// Map a configuration literal to its vocabulary URI; empty stays empty
pub fn transform_vocabulary(vocabulary: &Vocabulary, value: &str) -> Result<String, CatalogueError> {
    if value.is_empty() {
        return Ok(String::new());
    }
    vocabulary
        .lookup(value)
        .ok_or_else(|| CatalogueError::UnexpectedValue {
            field: vocabulary.field.to_string(),
            value: value.to_string(),
            choices: vocabulary.keys().collect::<Vec<_>>().join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{FREQUENCIES, THEMES};

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("f", "").is_ok());
        assert!(is_valid_url("f", "https://data.example.org/path?q=1").is_ok());
        assert!(is_valid_url("f", "http://localhost:5000").is_ok());
        assert!(is_valid_url("f", "http://10.0.0.1/").is_ok());

        assert!(matches!(
            is_valid_url("f", "data.example.org"),
            Err(CatalogueError::WrongFormat { .. })
        ));
        assert!(is_valid_url("f", "mailto:someone@example.org").is_err());
    }

    #[test]
    fn test_is_informed() {
        assert!(is_informed("title", "Parking").is_ok());
        assert!(matches!(
            is_informed("title", "  "),
            Err(CatalogueError::NotInformedField(f)) if f == "title"
        ));
        assert!(is_informed_list("locations", &[]).is_err());
    }

    #[test]
    fn test_is_expected_value() {
        assert!(is_expected_value("a", "", &["x"]).is_ok());
        assert!(is_expected_value("a", "x", &["x", "y"]).is_ok());
        let err = is_expected_value("a", "z", &["x", "y"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field \"a\" value (z) not expected. Possible values: x, y"
        );
    }

    #[test]
    fn test_transform_vocabulary() {
        assert_eq!(transform_vocabulary(&THEMES, "").unwrap(), "");
        assert_eq!(
            transform_vocabulary(&FREQUENCIES, "daily").unwrap(),
            "http://publications.europa.eu/resource/authority/frequency/DAILY"
        );
        assert!(matches!(
            transform_vocabulary(&THEMES, "sports"),
            Err(CatalogueError::UnexpectedValue { field, .. }) if field == "dataset.themes"
        ));
    }
}
