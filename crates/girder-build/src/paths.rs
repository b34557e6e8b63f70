//! Relative path computation
//!
//! Pure path-string manipulation, no filesystem access. Inputs must
//! either both be absolute or both be relative to the same base.

use std::path::{Component, Path, PathBuf};

/// Compute the shortest relative path expressing `to` as a traversal
/// from `from`, using the longest common leading component run.
///
/// One `..` is emitted per component of `from` beyond the common
/// prefix, followed by the remaining components of `to` in order. If
/// the very first components differ (no common root), `to` is
/// returned unmodified: it cannot be made relative.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();

    if let (Some(first_from), Some(first_to)) = (from_parts.first(), to_parts.first()) {
        if first_from != first_to {
            return to.to_path_buf();
        }
    }

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..from_parts.len() {
        relative.push("..");
    }
    for component in &to_parts[common..] {
        relative.push(component.as_os_str());
    }

    relative
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/a/b/c", "/a/b/d", "../d")]
    #[case("/a", "/a/b/c", "b/c")]
    #[case("/a/b/c", "/a", "../..")]
    #[case("a/b", "a/c/d", "../c/d")]
    fn test_traversals(#[case] from: &str, #[case] to: &str, #[case] expected: &str) {
        assert_eq!(
            relative_path(Path::new(from), Path::new(to)),
            PathBuf::from(expected)
        );
    }

    #[test]
    fn test_identical_paths_yield_empty() {
        assert_eq!(
            relative_path(Path::new("/a/b"), Path::new("/a/b")),
            PathBuf::new()
        );
    }

    #[test]
    fn test_no_common_root_returns_to_unmodified() {
        assert_eq!(
            relative_path(Path::new("a/b"), Path::new("/x/y")),
            PathBuf::from("/x/y")
        );
    }

    #[test]
    fn test_parent_step_and_segment_counts() {
        // For common prefix length k, expect (len(from) - k) parent
        // steps followed by the (len(to) - k) trailing segments of to.
        let from = Path::new("/r/p/q/s");
        let to = Path::new("/r/x/y");
        let rel = relative_path(from, to);

        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        assert_eq!(parts, vec!["..", "..", "..", "x", "y"]);
    }

    #[test]
    fn test_empty_from() {
        assert_eq!(
            relative_path(Path::new(""), Path::new("a/b")),
            PathBuf::from("a/b")
        );
    }
}
