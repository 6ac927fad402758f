//! Typed filter predicates for list queries.
//!
//! [`PredicateBuilder`] accumulates clauses into an AND-list. The free-text
//! search term becomes a single OR-group across the entity's searchable
//! columns. Compilation to SQL is the storage layer's job; nothing here knows
//! about a database.

use crate::listing::ListingConfig;

/// A bound filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// A predicate node. Columns are always `'static` names from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `column = value`
    Eq {
        column: &'static str,
        value: FilterValue,
    },
    /// Case-insensitive substring match.
    Contains { column: &'static str, term: String },
    /// OR of the inner predicates.
    AnyOf(Vec<Predicate>),
    /// AND of the inner predicates. Empty means "match everything".
    All(Vec<Predicate>),
}

impl Predicate {
    /// True when the predicate places no restriction on rows.
    pub fn is_trivial(&self) -> bool {
        match self {
            Self::All(items) => items.iter().all(Predicate::is_trivial),
            _ => false,
        }
    }
}

/// Builds an AND-list of filter clauses for one entity.
#[derive(Debug)]
pub struct PredicateBuilder<'a> {
    config: &'a ListingConfig,
    clauses: Vec<Predicate>,
}

impl<'a> PredicateBuilder<'a> {
    pub fn new(config: &'a ListingConfig) -> Self {
        Self {
            config,
            clauses: Vec::new(),
        }
    }

    /// Add the free-text search group. Blank terms add nothing.
    pub fn search(mut self, term: Option<&str>) -> Self {
        let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
            return self;
        };
        let group: Vec<Predicate> = self
            .config
            .searchable
            .iter()
            .map(|&column| Predicate::Contains {
                column,
                term: term.to_string(),
            })
            .collect();
        self.clauses.push(Predicate::AnyOf(group));
        self
    }

    /// Add `column = value` when a value is present.
    ///
    /// `None` adds nothing; `Some(false)` is a real clause.
    pub fn eq<V: Into<FilterValue>>(mut self, column: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.clauses.push(Predicate::Eq {
                column,
                value: value.into(),
            });
        }
        self
    }

    pub fn build(self) -> Predicate {
        Predicate::All(self.clauses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{MODULE_LISTING, TOPIC_LISTING};

    #[test]
    fn empty_input_matches_everything() {
        let predicate = PredicateBuilder::new(&MODULE_LISTING).build();
        assert_eq!(predicate, Predicate::All(vec![]));
        assert!(predicate.is_trivial());
    }

    #[test]
    fn blank_search_is_ignored() {
        let predicate = PredicateBuilder::new(&MODULE_LISTING)
            .search(Some("   "))
            .search(None)
            .build();
        assert!(predicate.is_trivial());
    }

    #[test]
    fn search_ors_across_searchable_columns() {
        let predicate = PredicateBuilder::new(&TOPIC_LISTING)
            .search(Some(" firearms "))
            .build();
        assert_eq!(
            predicate,
            Predicate::All(vec![Predicate::AnyOf(vec![
                Predicate::Contains {
                    column: "name",
                    term: "firearms".into()
                },
                Predicate::Contains {
                    column: "description",
                    term: "firearms".into()
                },
            ])])
        );
    }

    #[test]
    fn false_flag_is_not_treated_as_absent() {
        let absent = PredicateBuilder::new(&TOPIC_LISTING)
            .eq::<bool>("is_active", None)
            .build();
        let inactive = PredicateBuilder::new(&TOPIC_LISTING)
            .eq("is_active", Some(false))
            .build();
        assert!(absent.is_trivial());
        assert_eq!(
            inactive,
            Predicate::All(vec![Predicate::Eq {
                column: "is_active",
                value: FilterValue::Bool(false)
            }])
        );
    }

    #[test]
    fn scope_and_search_are_and_combined() {
        let predicate = PredicateBuilder::new(&TOPIC_LISTING)
            .search(Some("patrol"))
            .eq("module_id", Some(7_i64))
            .eq("is_active", Some(true))
            .build();
        let Predicate::All(clauses) = predicate else {
            panic!("top level must be an AND-list");
        };
        assert_eq!(clauses.len(), 3);
        assert!(matches!(clauses[0], Predicate::AnyOf(_)));
        assert_eq!(
            clauses[1],
            Predicate::Eq {
                column: "module_id",
                value: FilterValue::Int(7)
            }
        );
    }
}
