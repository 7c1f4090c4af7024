//! Name comparison policy shared by every lookup and sort in the crate.

use std::cmp::Ordering;

/// How table/column names are compared and hashed.
///
/// A schema picks one policy at construction time; every `find`/sort
/// operation on its tables and columns honors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CasePolicy {
    #[default]
    Sensitive,
    InsensitiveAscii,
}

impl CasePolicy {
    pub fn eq(self, a: &str, b: &str) -> bool {
        self.cmp_str(a, b) == Ordering::Equal
    }

    pub fn cmp_str(self, a: &str, b: &str) -> Ordering {
        match self {
            CasePolicy::Sensitive => a.cmp(b),
            CasePolicy::InsensitiveAscii => {
                a.chars()
                    .map(|c| c.to_ascii_lowercase())
                    .cmp(b.chars().map(|c| c.to_ascii_lowercase()))
            }
        }
    }
}

/// Anything nameable can be located and sorted under a [`CasePolicy`].
pub trait Named {
    fn name(&self) -> Option<&str>;
}

/// Binary-search key comparison: `key` against a candidate's current name.
pub fn cmp_name_key<T: Named>(policy: CasePolicy, key: &str, candidate: &T) -> Ordering {
    match candidate.name() {
        Some(n) => policy.cmp_str(key, n),
        None => Ordering::Less,
    }
}

/// Sort comparison between two nameable entries. Entries without a current
/// name (tombstones) sort after named ones so a lazy sort never disturbs the
/// result of a key lookup into the live prefix.
pub fn cmp_entries<T: Named>(policy: CasePolicy, a: &T, b: &T) -> Ordering {
    match (a.name(), b.name()) {
        (Some(x), Some(y)) => policy.cmp_str(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
