//! Result Shaper: field projection, sort order, and relation joins.

use crate::domain::{Collection, Error, ID_FIELD};

use super::filter::field_path_regex;

/// Sort applied when a request does not name one.
pub const DEFAULT_SORT_FIELD: &str = "name";

/// Fields returned for each document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    /// Every stored field.
    #[default]
    All,
    /// Only the named fields, plus the identity unless `keep_id` is false.
    Include {
        /// Dotted paths to keep.
        fields: Vec<String>,
        /// Whether `_id` is returned.
        keep_id: bool,
    },
    /// Every field except the named ones.
    Exclude(Vec<String>),
}

impl Projection {
    /// Parse a comma-separated `select` value.
    ///
    /// Fields prefixed with `-` are excluded. A blank value selects
    /// everything. `-_id` may accompany inclusions to drop the identity.
    ///
    /// # Errors
    /// Returns an invalid-query error for malformed field names or when
    /// inclusions and exclusions are mixed.
    ///
    /// # Examples
    /// ```
    /// use devcamper::domain::query::Projection;
    ///
    /// let projection = Projection::parse(Some("name,description")).expect("valid select");
    /// assert!(projection.admits("_id"));
    /// assert!(projection.admits("name"));
    /// assert!(!projection.admits("careers"));
    /// ```
    pub fn parse(select: Option<&str>) -> Result<Self, Error> {
        let tokens: Vec<&str> = select
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.is_empty() {
            return Ok(Self::All);
        }
        let hidden_id = format!("-{ID_FIELD}");
        let keep_id = !tokens.contains(&hidden_id.as_str());
        let named: Vec<&str> = tokens
            .iter()
            .copied()
            .filter(|token| *token != hidden_id)
            .collect();
        let excluded = named.iter().filter(|token| token.starts_with('-')).count();
        if excluded > 0 && excluded < named.len() {
            return Err(Error::invalid_query(
                "Select cannot mix included and excluded fields",
            ));
        }
        if excluded == named.len() {
            return Ok(Self::Exclude(field_paths(&tokens)?));
        }
        Ok(Self::Include {
            fields: field_paths(&named)?,
            keep_id,
        })
    }

    /// True when the top-level `field` survives the projection.
    #[must_use]
    pub fn admits(&self, field: &str) -> bool {
        let names = |path: &String| path == field || path.split('.').next() == Some(field);
        match self {
            Self::All => true,
            Self::Include { fields, keep_id } => {
                (field == ID_FIELD && *keep_id) || fields.iter().any(names)
            }
            Self::Exclude(fields) => !fields.iter().any(|path| path == field),
        }
    }
}

fn field_paths(tokens: &[&str]) -> Result<Vec<String>, Error> {
    tokens
        .iter()
        .map(|token| {
            let field = token.trim_start_matches('-');
            if field_path_regex().is_match(field) {
                Ok(field.to_owned())
            } else {
                Err(Error::invalid_query(format!("Invalid select field {token}")))
            }
        })
        .collect()
}

/// Sort direction of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// One sort key; earlier keys take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Dotted field path.
    pub path: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortKey {
    /// Ascending key on `path`.
    pub fn ascending(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending key on `path`.
    pub fn descending(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parse a comma-separated `sort` value, defaulting to name ascending.
    ///
    /// # Errors
    /// Returns an invalid-query error for malformed field names.
    pub fn parse_list(sort: Option<&str>) -> Result<Vec<Self>, Error> {
        let tokens: Vec<&str> = sort
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.is_empty() {
            return Ok(vec![Self::ascending(DEFAULT_SORT_FIELD)]);
        }
        tokens
            .into_iter()
            .map(|token| {
                let (path, key) = match token.strip_prefix('-') {
                    Some(path) => (path, Self::descending(path)),
                    None => (token, Self::ascending(token)),
                };
                if field_path_regex().is_match(path) {
                    Ok(key)
                } else {
                    Err(Error::invalid_query(format!("Invalid sort field {token}")))
                }
            })
            .collect()
    }
}

/// Related documents eagerly attached to each result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    /// Replace the identifier at `local_field` with the referenced document,
    /// reduced to `fields` plus its identity.
    Reference {
        /// Collection holding the referenced documents.
        from: Collection,
        /// Field holding the identifier.
        local_field: &'static str,
        /// Fields kept from the referenced document.
        fields: &'static [&'static str],
    },
    /// Attach, under `as_field`, every document of `from` whose
    /// `foreign_field` holds this document's identity.
    Referencing {
        /// Collection holding the referencing documents.
        from: Collection,
        /// Field in `from` holding the identifier.
        foreign_field: &'static str,
        /// Field the documents are attached under.
        as_field: &'static str,
    },
}

impl Join {
    /// Courses attached to each bootcamp.
    pub const BOOTCAMP_COURSES: Self = Self::Referencing {
        from: Collection::Courses,
        foreign_field: "bootcamp",
        as_field: "courses",
    };

    /// Bootcamp name and description attached to each course.
    pub const COURSE_BOOTCAMP: Self = Self::Reference {
        from: Collection::Bootcamps,
        local_field: "bootcamp",
        fields: &["name", "description"],
    };

    /// Field of the result the join writes.
    #[must_use]
    pub const fn target_field(&self) -> &'static str {
        match self {
            Self::Reference { local_field, .. } => *local_field,
            Self::Referencing { as_field, .. } => *as_field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some(" , "))]
    fn blank_select_returns_everything(#[case] select: Option<&str>) {
        assert_eq!(Projection::parse(select).expect("blank"), Projection::All);
    }

    #[rstest]
    fn select_restricts_to_named_fields_and_identity() {
        let projection = Projection::parse(Some("name,description")).expect("valid");
        assert_eq!(
            projection,
            Projection::Include {
                fields: vec!["name".into(), "description".into()],
                keep_id: true,
            }
        );
        assert!(projection.admits("_id"));
        assert!(!projection.admits("courses"));
    }

    #[rstest]
    fn identity_can_be_dropped_beside_inclusions() {
        let projection = Projection::parse(Some("name,-_id")).expect("valid");
        assert_eq!(
            projection,
            Projection::Include {
                fields: vec!["name".into()],
                keep_id: false,
            }
        );
        assert!(!projection.admits("_id"));
        assert!(projection.admits("name"));
    }

    #[rstest]
    #[case("-_id", vec!["_id"])]
    #[case("-_id,-phone", vec!["_id", "phone"])]
    fn hidden_identity_alone_is_an_exclusion(#[case] select: &str, #[case] fields: Vec<&str>) {
        let expected = fields.into_iter().map(str::to_owned).collect();
        assert_eq!(
            Projection::parse(Some(select)).expect("valid"),
            Projection::Exclude(expected)
        );
    }

    #[rstest]
    fn dotted_select_admits_its_parent() {
        let projection = Projection::parse(Some("location.city")).expect("valid");
        assert!(projection.admits("location"));
    }

    #[rstest]
    fn minus_prefix_excludes() {
        let projection = Projection::parse(Some("-description,-phone")).expect("valid");
        assert_eq!(
            projection,
            Projection::Exclude(vec!["description".into(), "phone".into()])
        );
        assert!(projection.admits("name"));
        assert!(!projection.admits("phone"));
    }

    #[rstest]
    #[case("name,-description")]
    #[case("name,-_id,-description")]
    #[case("name;drop")]
    #[case("-")]
    fn malformed_select_is_invalid(#[case] select: &str) {
        let error = Projection::parse(Some(select)).expect_err("invalid select");
        assert_eq!(error.code(), ErrorCode::InvalidQuery);
    }

    #[rstest]
    fn absent_sort_defaults_to_name_ascending() {
        assert_eq!(
            SortKey::parse_list(None).expect("default"),
            vec![SortKey::ascending("name")]
        );
    }

    #[rstest]
    fn sort_keys_keep_order_and_direction() {
        assert_eq!(
            SortKey::parse_list(Some("-averageCost,name")).expect("valid"),
            vec![SortKey::descending("averageCost"), SortKey::ascending("name")]
        );
    }

    #[rstest]
    #[case("--name")]
    #[case("name desc")]
    fn malformed_sort_is_invalid(#[case] sort: &str) {
        let error = SortKey::parse_list(Some(sort)).expect_err("invalid sort");
        assert_eq!(error.code(), ErrorCode::InvalidQuery);
    }

    #[rstest]
    fn joins_name_their_target_field() {
        assert_eq!(Join::BOOTCAMP_COURSES.target_field(), "courses");
        assert_eq!(Join::COURSE_BOOTCAMP.target_field(), "bootcamp");
    }
}
