//! Relation-scoped field paths.
//!
//! A field path of the form `relation.column` targets a column on a related entity
//! (e.g. `author.name`). Only the first dot is significant: `a.b.c` is relation `a`,
//! column `b.c`.

/// A field path split at its first dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath<'a> {
    /// A column on the queried entity
    Column(&'a str),
    /// A column on a related entity
    Related {
        /// Relation name on the parent entity (e.g. "author")
        relation: &'a str,
        /// Everything after the first dot (e.g. "name")
        column: &'a str,
    },
}

impl<'a> FieldPath<'a> {
    #[must_use]
    pub const fn relation(&self) -> Option<&'a str> {
        match *self {
            Self::Column(_) => None,
            Self::Related { relation, .. } => Some(relation),
        }
    }
}

/// Split a field path into its relation and column parts.
///
/// No segment is checked: `.name` yields an empty relation.
///
/// Examples:
/// - "author.name" -> `Related { relation: "author", column: "name" }`
/// - "status" -> `Column("status")`
#[must_use]
pub fn parse_dot_notation(path: &str) -> FieldPath<'_> {
    path.split_once('.').map_or(FieldPath::Column(path), |(relation, column)| {
        FieldPath::Related { relation, column }
    })
}
