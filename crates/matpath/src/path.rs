//! Materialized path type and its nom parser.
//!
//! A [`TreePath`] is the root-to-node chain of keys, each segment preceded by
//! the separator: `/1/2/4`. Root paths still carry the leading separator so
//! every prefix test has the same shape.

use std::fmt;

use nom::{
    bytes::complete::take_till1,
    character::complete::char,
    combinator::all_consuming,
    multi::many1,
    sequence::preceded,
    IResult,
};

use crate::config::DepthBase;
use crate::error::{PathError, PathResult};

/// A validated materialized path.
///
/// Invariants upheld by every constructor:
/// - never empty
/// - starts with the separator
/// - contains no empty segment
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TreePath(String);

impl TreePath {
    /// Parses and validates a stored path string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use matpath::TreePath;
    ///
    /// let path = TreePath::parse("/1/2/4", '/').unwrap();
    /// assert_eq!(path.segments('/').collect::<Vec<_>>(), vec!["1", "2", "4"]);
    ///
    /// assert!(TreePath::parse("/1//4", '/').is_err());
    /// ```
    pub fn parse(input: &str, separator: char) -> PathResult<Self> {
        if input.is_empty() {
            return Err(PathError::Empty);
        }
        if !input.starts_with(separator) {
            return Err(PathError::MissingLeadingSeparator { separator });
        }

        match all_consuming(many1(segment(separator)))(input) {
            Ok(_) => Ok(Self(input.to_string())),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(PathError::InvalidSegment {
                position: input.len() - e.input.len(),
            }),
            Err(nom::Err::Incomplete(_)) => Err(PathError::InvalidSegment {
                position: input.len(),
            }),
        }
    }

    /// Builds the path of a root node: `separator + segment`.
    pub fn root(segment: &str, separator: char) -> PathResult<Self> {
        validate_segment(segment, separator)?;
        let mut inner = String::with_capacity(segment.len() + 1);
        inner.push(separator);
        inner.push_str(segment);
        Ok(Self(inner))
    }

    /// Builds the path of a direct child: `self + separator + segment`.
    pub fn child(&self, segment: &str, separator: char) -> PathResult<Self> {
        validate_segment(segment, separator)?;
        let mut inner = String::with_capacity(self.0.len() + segment.len() + 1);
        inner.push_str(&self.0);
        inner.push(separator);
        inner.push_str(segment);
        Ok(Self(inner))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the path, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Length of the path in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the keys from the root down to this node.
    pub fn segments(&self, separator: char) -> impl Iterator<Item = &str> {
        self.0.split(separator).skip(1)
    }

    /// Last segment, i.e. the key of the node owning this path.
    pub fn last_segment(&self, separator: char) -> &str {
        self.0
            .rsplit(separator)
            .next()
            .unwrap_or_default()
    }

    /// Depth derived from the number of separators.
    ///
    /// ```rust
    /// use matpath::{DepthBase, TreePath};
    ///
    /// let path = TreePath::parse("/1/2/4", '/').unwrap();
    /// assert_eq!(path.depth('/', DepthBase::RootIsZero), 2);
    /// assert_eq!(path.depth('/', DepthBase::RootIsOne), 3);
    /// ```
    pub fn depth(&self, separator: char, base: DepthBase) -> usize {
        let separators = self.0.matches(separator).count();
        match base {
            DepthBase::RootIsZero => separators.saturating_sub(1),
            DepthBase::RootIsOne => separators,
        }
    }

    /// Path of the parent node, or `None` for a root path.
    pub fn parent_path(&self, separator: char) -> Option<Self> {
        let cut = self.0.rfind(separator)?;
        if cut == 0 {
            None
        } else {
            Some(Self(self.0[..cut].to_string()))
        }
    }

    /// The string every descendant path starts with: `self + separator`.
    ///
    /// The trailing separator is what keeps `/1/2` from matching `/1/20`.
    pub fn descendant_prefix(&self, separator: char) -> String {
        let mut prefix = String::with_capacity(self.0.len() + 1);
        prefix.push_str(&self.0);
        prefix.push(separator);
        prefix
    }

    /// Returns true if `other` lies strictly below this path.
    ///
    /// ```rust
    /// use matpath::TreePath;
    ///
    /// let two = TreePath::parse("/1/2", '/').unwrap();
    /// let twenty = TreePath::parse("/1/20", '/').unwrap();
    /// let four = TreePath::parse("/1/2/4", '/').unwrap();
    ///
    /// assert!(two.is_ancestor_of(&four, '/'));
    /// assert!(!two.is_ancestor_of(&twenty, '/'));
    /// assert!(!two.is_ancestor_of(&two, '/'));
    /// ```
    pub fn is_ancestor_of(&self, other: &TreePath, separator: char) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0[self.0.len()..].starts_with(separator)
    }

    /// Returns true if this path lies strictly below `other`.
    pub fn is_descendant_of(&self, other: &TreePath, separator: char) -> bool {
        other.is_ancestor_of(self, separator)
    }

    /// Replaces the `old` prefix with `new`, keeping the suffix verbatim.
    ///
    /// Returns `None` when this path is neither `old` nor below it.
    pub fn rewrite_prefix(&self, old: &TreePath, new: &TreePath, separator: char) -> Option<Self> {
        if self == old {
            return Some(new.clone());
        }
        if !old.is_ancestor_of(self, separator) {
            return None;
        }
        let mut inner = String::with_capacity(new.0.len() + self.0.len() - old.0.len());
        inner.push_str(&new.0);
        inner.push_str(&self.0[old.0.len()..]);
        Some(Self(inner))
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TreePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Checks that a key or label can be used as a path segment.
pub fn validate_segment(segment: &str, separator: char) -> PathResult<()> {
    if segment.is_empty() {
        return Err(PathError::Empty);
    }
    if segment.contains(separator) {
        return Err(PathError::SeparatorInSegment {
            segment: segment.to_string(),
            separator,
        });
    }
    Ok(())
}

fn segment(separator: char) -> impl Fn(&str) -> IResult<&str, &str> {
    move |input| preceded(char(separator), take_till1(move |c| c == separator))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> TreePath {
        TreePath::parse(s, '/').expect("valid path")
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(path("/1").as_str(), "/1");
        assert_eq!(path("/1/2/4").as_str(), "/1/2/4");
        assert_eq!(path("/a.b/c-d").as_str(), "/a.b/c-d");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(TreePath::parse("", '/'), Err(PathError::Empty));
    }

    #[test]
    fn test_parse_missing_leading_separator() {
        assert_eq!(
            TreePath::parse("1/2", '/'),
            Err(PathError::MissingLeadingSeparator { separator: '/' })
        );
    }

    #[test]
    fn test_parse_empty_segment_position() {
        assert_eq!(
            TreePath::parse("/1//4", '/'),
            Err(PathError::InvalidSegment { position: 2 })
        );
        assert_eq!(
            TreePath::parse("/1/", '/'),
            Err(PathError::InvalidSegment { position: 2 })
        );
        assert_eq!(
            TreePath::parse("/", '/'),
            Err(PathError::InvalidSegment { position: 1 })
        );
    }

    #[test]
    fn test_depth_of_unvalidated_path() {
        // Deserialized paths skip validation.
        let bare = TreePath("1".to_string());
        assert_eq!(bare.depth('/', DepthBase::RootIsZero), 0);
        assert_eq!(bare.depth('/', DepthBase::RootIsOne), 0);
    }

    #[test]
    fn test_parse_custom_separator() {
        let p = TreePath::parse(".1.2", '.').unwrap();
        assert_eq!(p.segments('.').collect::<Vec<_>>(), vec!["1", "2"]);
        assert!(TreePath::parse("/1/2", '.').is_err());
    }

    #[test]
    fn test_root_and_child() {
        let root = TreePath::root("1", '/').unwrap();
        assert_eq!(root.as_str(), "/1");

        let child = root.child("2", '/').unwrap();
        assert_eq!(child.as_str(), "/1/2");
        assert_eq!(child.last_segment('/'), "2");
    }

    #[test]
    fn test_segment_with_separator_rejected() {
        let err = TreePath::root("a/b", '/').unwrap_err();
        assert!(matches!(err, PathError::SeparatorInSegment { .. }));

        let root = path("/1");
        assert_eq!(root.child("", '/'), Err(PathError::Empty));
    }

    #[test]
    fn test_depth() {
        assert_eq!(path("/1").depth('/', DepthBase::RootIsZero), 0);
        assert_eq!(path("/1/2/4").depth('/', DepthBase::RootIsZero), 2);
        assert_eq!(path("/1").depth('/', DepthBase::RootIsOne), 1);
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(path("/1/2/4").parent_path('/'), Some(path("/1/2")));
        assert_eq!(path("/1").parent_path('/'), None);
    }

    #[test]
    fn test_ancestor_separator_boundary() {
        let two = path("/1/2");
        let twenty = path("/1/20");
        let two_four = path("/1/2/4");

        assert!(!two.is_ancestor_of(&twenty, '/'));
        assert!(two.is_ancestor_of(&two_four, '/'));
        assert!(two_four.is_descendant_of(&two, '/'));
        assert!(!twenty.is_descendant_of(&two, '/'));
    }

    #[test]
    fn test_rewrite_prefix() {
        let old = path("/1/2");
        let new = path("/1/3/2");

        assert_eq!(path("/1/2").rewrite_prefix(&old, &new, '/'), Some(new.clone()));
        assert_eq!(
            path("/1/2/4/7").rewrite_prefix(&old, &new, '/'),
            Some(path("/1/3/2/4/7"))
        );
        assert_eq!(path("/1/20").rewrite_prefix(&old, &new, '/'), None);
        assert_eq!(path("/1").rewrite_prefix(&old, &new, '/'), None);
    }

    #[test]
    fn test_descendant_prefix() {
        assert_eq!(path("/1/2").descendant_prefix('/'), "/1/2/");
    }
}
