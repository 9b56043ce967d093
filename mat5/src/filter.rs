//! Array-name filtering for selective reads

use hashbrown::HashSet;

/// Predicate deciding which top-level arrays are decoded
pub trait NameFilter {
    fn matches(&self, name: &str) -> bool;
}

impl<F> NameFilter for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, name: &str) -> bool {
        self(name)
    }
}

/// Set of wanted names; an empty set accepts every array
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayFilter {
    names: HashSet<String>,
}

impl ArrayFilter {
    /// Filter accepting everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter accepting only `names`
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Whether every name is accepted
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl NameFilter for ArrayFilter {
    fn matches(&self, name: &str) -> bool {
        self.names.is_empty() || self.names.contains(name)
    }
}
