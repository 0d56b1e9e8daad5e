use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::models::Entry;

/// A division or weight-class reference. Missing references share one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupRef {
    Assigned(Uuid),
    Unassigned,
}

impl From<Option<Uuid>> for GroupRef {
    fn from(id: Option<Uuid>) -> Self {
        id.map_or(Self::Unassigned, Self::Assigned)
    }
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assigned(id) => write!(f, "{}", id),
            Self::Unassigned => f.write_str("Unassigned"),
        }
    }
}

/// The (gender, division, weight class) partition every comparison happens in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScoringGroupKey {
    pub gender: String,
    pub division: GroupRef,
    pub weight_class: GroupRef,
}

impl ScoringGroupKey {
    pub fn new(gender: &str, division_id: Option<Uuid>, weight_class_id: Option<Uuid>) -> Self {
        Self {
            gender: gender.to_string(),
            division: division_id.into(),
            weight_class: weight_class_id.into(),
        }
    }

    pub fn of(entry: &Entry) -> Self {
        Self::new(&entry.gender, entry.division_id, entry.weight_class_id)
    }
}

impl fmt::Display for ScoringGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.gender, self.division, self.weight_class)
    }
}

/// Buckets items by scoring group, keeping input order inside each bucket.
pub fn partition<T, F>(items: impl IntoIterator<Item = T>, key_of: F) -> BTreeMap<ScoringGroupKey, Vec<T>>
where
    F: Fn(&T) -> ScoringGroupKey,
{
    let mut groups: BTreeMap<ScoringGroupKey, Vec<T>> = BTreeMap::new();
    for item in items {
        groups.entry(key_of(&item)).or_default().push(item);
    }
    groups
}
