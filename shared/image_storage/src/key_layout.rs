use thiserror::Error;

/// Errors raised when mapping between identifiers and storage keys
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Storage key is outside the managed prefix
    #[error("key '{key}' does not start with prefix '{prefix}'")]
    OutsidePrefix {
        /// Offending storage key
        key: String,
        /// Expected prefix
        prefix: String,
    },

    /// Identifier is empty, a dot segment, or contains a path separator
    #[error("invalid image identifier '{0}'")]
    InvalidIdentifier(String),
}

/// Maps user-facing image identifiers to bucket keys under a fixed prefix
///
/// An identifier is whatever follows the prefix in a stored key, so objects in nested
/// directories have identifiers like `trip/cat.png`. Identifiers built from user input
/// are single path components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    prefix: String,
}

impl KeyLayout {
    /// Creates a layout for `prefix`, e.g. `images/`
    #[must_use]
    pub const fn new(prefix: String) -> Self {
        Self { prefix }
    }

    /// The managed prefix
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds the storage key for a single component identifier
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidIdentifier` if the identifier is empty, `.` or `..`, or
    /// contains `/`
    pub fn storage_key(&self, identifier: &str) -> Result<String, KeyError> {
        validate_identifier(identifier)?;
        Ok(format!("{}{identifier}", self.prefix))
    }

    /// Strips the prefix from a storage key
    ///
    /// # Errors
    ///
    /// Returns `KeyError::OutsidePrefix` if the key does not start with the prefix,
    /// `KeyError::InvalidIdentifier` if nothing remains after stripping it
    pub fn identifier<'a>(&self, key: &'a str) -> Result<&'a str, KeyError> {
        let identifier =
            key.strip_prefix(self.prefix.as_str())
                .ok_or_else(|| KeyError::OutsidePrefix {
                    key: key.to_string(),
                    prefix: self.prefix.clone(),
                })?;
        if identifier.is_empty() {
            return Err(KeyError::InvalidIdentifier(identifier.to_string()));
        }
        Ok(identifier)
    }
}

/// Last path component of `path`, treating `/` as the only separator
///
/// `"a/b/c.png"` gives `"c.png"`, a trailing separator gives `""`.
#[must_use]
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn validate_identifier(identifier: &str) -> Result<(), KeyError> {
    if matches!(identifier, "" | "." | "..") || identifier.contains('/') {
        return Err(KeyError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> KeyLayout {
        KeyLayout::new("images/".to_string())
    }

    #[test]
    fn test_storage_key_prepends_prefix() {
        assert_eq!(layout().storage_key("cat.png").unwrap(), "images/cat.png");
    }

    #[test]
    fn test_storage_key_rejects_nested_or_empty_identifiers() {
        assert_eq!(
            layout().storage_key("a/cat.png"),
            Err(KeyError::InvalidIdentifier("a/cat.png".to_string()))
        );
        assert!(layout().storage_key("").is_err());
    }

    #[test]
    fn test_storage_key_rejects_dot_segments() {
        assert!(layout().storage_key(".").is_err());
        assert!(layout().storage_key("..").is_err());
        assert_eq!(layout().storage_key(".hidden").unwrap(), "images/.hidden");
    }

    #[test]
    fn test_identifier_strips_prefix() {
        assert_eq!(layout().identifier("images/cat.png").unwrap(), "cat.png");
    }

    #[test]
    fn test_identifier_rejects_foreign_prefix() {
        let err = layout().identifier("uploads/cat.png").unwrap_err();
        assert!(matches!(err, KeyError::OutsidePrefix { .. }));
        // Same length as the prefix but a different directory
        assert!(layout().identifier("photos/cat.png").is_err());
    }

    #[test]
    fn test_identifier_rejects_bare_prefix() {
        assert_eq!(
            layout().identifier("images/"),
            Err(KeyError::InvalidIdentifier(String::new()))
        );
    }

    #[test]
    fn test_identifier_keeps_nested_directories() {
        assert_eq!(
            layout().identifier("images/trip/cat.png").unwrap(),
            "trip/cat.png"
        );
        assert_eq!(layout().identifier("images/trip/").unwrap(), "trip/");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("a/b/c.png"), "c.png");
        assert_eq!(base_name("c.png"), "c.png");
        assert_eq!(base_name("a/"), "");
    }
}
