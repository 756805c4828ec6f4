//! Named document collections and their field catalogues.
//!
//! The catalogue tells the filter translator how to coerce query-string
//! values: a `rating[gt]=8` filter must compare numbers, not strings.

use std::fmt;

/// A named set of documents held by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Training-provider listings.
    Bootcamps,
    /// Courses offered by a bootcamp.
    Courses,
}

/// Storage type of a document field, used to coerce filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text; query values are used verbatim.
    Text,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// Document identifier.
    Identifier,
    /// RFC 3339 timestamp, compared chronologically.
    Date,
}

impl Collection {
    /// Collection name as stored.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bootcamps => "bootcamps",
            Self::Courses => "courses",
        }
    }

    /// Storage type of the field at the dotted `path`.
    ///
    /// Unknown paths are treated as text so filters on them simply match
    /// nothing rather than failing.
    #[must_use]
    pub fn field_kind(self, path: &str) -> FieldKind {
        match (self, path) {
            (_, "_id") => FieldKind::Identifier,
            (_, "createdAt") => FieldKind::Date,
            (Self::Bootcamps, "averageRating" | "averageCost" | "location.coordinates") => {
                FieldKind::Number
            }
            (Self::Bootcamps, "housing" | "jobAssistance" | "jobGuarantee" | "acceptGi") => {
                FieldKind::Boolean
            }
            (Self::Courses, "tuition") => FieldKind::Number,
            (Self::Courses, "scholarshipAvailable") => FieldKind::Boolean,
            (Self::Courses, "bootcamp") => FieldKind::Identifier,
            _ => FieldKind::Text,
        }
    }

    /// Fields carrying a unique index.
    #[must_use]
    pub const fn unique_fields(self) -> &'static [&'static str] {
        match self {
            Self::Bootcamps => &["name"],
            Self::Courses => &[],
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Collection::Bootcamps, "averageCost", FieldKind::Number)]
    #[case(Collection::Bootcamps, "housing", FieldKind::Boolean)]
    #[case(Collection::Bootcamps, "careers", FieldKind::Text)]
    #[case(Collection::Bootcamps, "location.state", FieldKind::Text)]
    #[case(Collection::Courses, "tuition", FieldKind::Number)]
    #[case(Collection::Courses, "bootcamp", FieldKind::Identifier)]
    #[case(Collection::Courses, "createdAt", FieldKind::Date)]
    #[case(Collection::Courses, "averageCost", FieldKind::Text)]
    fn field_kinds_follow_catalogue(
        #[case] collection: Collection,
        #[case] path: &str,
        #[case] expected: FieldKind,
    ) {
        assert_eq!(collection.field_kind(path), expected);
    }

    #[rstest]
    fn only_bootcamp_names_are_unique() {
        assert_eq!(Collection::Bootcamps.unique_fields(), &["name"]);
        assert!(Collection::Courses.unique_fields().is_empty());
    }
}
