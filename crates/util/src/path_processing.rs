use thiserror::Error;

/// Rejection reasons for remote resource paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("resource path must not be empty")]
    Empty,
    #[error("resource path '{0}' must not contain '.' or '..' segments")]
    Traversal(String),
    #[error("resource path '{0}' must not contain backslashes or control characters")]
    InvalidCharacter(String),
}

/// Normalize a caller-supplied resource path.
///
/// Leading and trailing slashes are removed and repeated slashes collapse, so
/// `/assets//img.png` becomes `assets/img.png`. Relative segments are
/// rejected rather than resolved.
pub fn normalize_resource_path(raw: &str) -> Result<String, PathError> {
    let trimmed = raw.trim();
    if trimmed.chars().any(|ch| ch == '\\' || ch.is_control()) {
        return Err(PathError::InvalidCharacter(trimmed.to_string()));
    }
    let mut segments = Vec::new();
    for segment in trimmed.split('/') {
        match segment {
            "" => continue,
            "." | ".." => return Err(PathError::Traversal(trimmed.to_string())),
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(PathError::Empty);
    }
    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_slashes_and_collapses_repeats() {
        assert_eq!(normalize_resource_path("/assets//img.png").unwrap(), "assets/img.png");
        assert_eq!(normalize_resource_path(" docs/guide/ ").unwrap(), "docs/guide");
    }

    #[test]
    fn rejects_empty_and_traversal() {
        assert_eq!(normalize_resource_path("///"), Err(PathError::Empty));
        assert!(matches!(normalize_resource_path("a/../b"), Err(PathError::Traversal(_))));
        assert!(matches!(normalize_resource_path("./a"), Err(PathError::Traversal(_))));
        assert!(matches!(normalize_resource_path("a\\b"), Err(PathError::InvalidCharacter(_))));
    }
}
