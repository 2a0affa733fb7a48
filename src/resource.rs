//! `namespace:path` identifiers, as used for block names and similar.
use std::fmt;

use crate::error::{Error, Result};

const DEFAULT_NAMESPACE: &str = "minecraft";

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '.' | '_' | '-')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

/// An immutable `(namespace, path)` pair, e.g. `minecraft:stone`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
    namespace: String,
    path: String,
}

impl ResourceLocation {
    /// Builds a location directly from a namespace and path, validating both.
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let path = path.into();

        if namespace.is_empty() || !namespace.chars().all(is_namespace_char) {
            return Err(Error::InvalidResourceLocation(format!("{}:{}", namespace, path)));
        }
        if path.is_empty() || !path.chars().all(is_path_char) {
            return Err(Error::InvalidResourceLocation(format!("{}:{}", namespace, path)));
        }

        Ok(Self { namespace, path })
    }

    /// Parses `"namespace:path"` or bare `"path"` (which defaults the
    /// namespace to `minecraft`). More than one `:` is invalid.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        let first = parts.next().unwrap_or("");
        match (parts.next(), parts.next()) {
            (None, None) => Self::new(DEFAULT_NAMESPACE, first),
            (Some(path), None) => Self::new(first, path),
            _ => Err(Error::InvalidResourceLocation(s.to_owned())),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced() {
        let r = ResourceLocation::parse("a:b").unwrap();
        assert_eq!(r.namespace(), "a");
        assert_eq!(r.path(), "b");
    }

    #[test]
    fn parses_bare_path_as_minecraft() {
        let r = ResourceLocation::parse("stone").unwrap();
        assert_eq!(r.namespace(), "minecraft");
        assert_eq!(r.path(), "stone");
    }

    #[test]
    fn rejects_multiple_colons() {
        assert!(ResourceLocation::parse("a:b:c").is_err());
    }

    #[test]
    fn path_allows_slash() {
        let r = ResourceLocation::parse("a:b/c").unwrap();
        assert_eq!(r.path(), "b/c");
    }

    #[test]
    fn namespace_rejects_slash() {
        assert!(ResourceLocation::new("a/b", "c").is_err());
    }

    #[test]
    fn stringifies_as_namespace_colon_path() {
        let r = ResourceLocation::parse("a:b").unwrap();
        assert_eq!(r.to_string(), "a:b");
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(
            ResourceLocation::parse("a:b").unwrap(),
            ResourceLocation::parse("a:b").unwrap()
        );
    }
}
