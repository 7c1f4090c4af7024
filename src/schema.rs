//! Schema model: one database version, owning its tables.

use crate::entry::{Reentry, Type};
use crate::ident::{CasePolicy, Named};
use crate::table::{Table, TableMode};
use enumflags2::{bitflags, BitFlags};

#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFlag {
    Changed,
}

/// A small positive version counter persisted by the embedding application
/// alongside the database, fed back in to decide which steps to accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SchemaVersion(pub u32);

#[derive(Debug, Clone)]
pub struct Schema {
    pub reentry: Reentry,
    pub version: SchemaVersion,
    pub flags: BitFlags<SchemaFlag>,
    pub tables: Type<Table>,
    pub mode: TableMode,
    pub policy: CasePolicy,
    /// Count of tables already settled as of the last accumulation.
    pub offset: usize,
}

impl Named for Schema {
    fn name(&self) -> Option<&str> {
        self.reentry.name()
    }
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Schema {
            reentry: Reentry::added(name),
            version: SchemaVersion(1),
            flags: BitFlags::empty(),
            tables: Type::new(),
            mode: TableMode::Define,
            policy: CasePolicy::default(),
            offset: 0,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = SchemaVersion(version);
        self
    }

    pub fn with_policy(mut self, policy: CasePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// A schema meant to be folded into a running schema via `accumulate`:
    /// its table changes are tombstones/renames/alters rather than plain
    /// creates.
    pub fn change(name: impl Into<String>, version: u32) -> Self {
        Schema {
            reentry: Reentry::added(name),
            version: SchemaVersion(version),
            flags: BitFlags::from(SchemaFlag::Changed),
            tables: Type::new(),
            mode: TableMode::Change,
            policy: CasePolicy::default(),
            offset: 0,
        }
    }

    pub fn create_table(&mut self, name: impl Into<String>) -> &mut Table {
        self.tables.push(Table::new(name));
        let idx = self.tables.len() - 1;
        self.tables.iter_mut().nth(idx).unwrap()
    }

    pub fn alter_table(&mut self, name: impl Into<String>) -> &mut Table {
        self.tables.push(Table::change(name));
        let idx = self.tables.len() - 1;
        self.tables.iter_mut().nth(idx).unwrap()
    }

    pub fn rename_table(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.tables.push(Table::renamed(from, to));
    }

    pub fn drop_table(&mut self, name: impl Into<String>) {
        self.tables.push(Table::dropped(name));
    }

    /// Looks up a live table by its current name, skipping rename
    /// waypoints kept around for `trace_foreign` that happen to share it.
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables
            .as_slice()
            .iter()
            .find(|t| t.is_live() && self.policy.eq(t.name().unwrap(), name))
    }

    pub fn find_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        let policy = self.policy;
        self.tables
            .iter_mut()
            .find(|t| t.is_live() && policy.eq(t.name().unwrap(), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_schema_starts_at_version_one() {
        let s = Schema::new("app");
        assert_eq!(s.version, SchemaVersion(1));
        assert!(s.tables.is_empty());
    }

    #[test]
    fn create_and_find_table() {
        let mut s = Schema::new("app");
        s.create_table("users").add_int64("id");
        assert!(s.find_table("users").is_some());
        assert!(s.find_table("missing").is_none());
    }

    #[test]
    fn change_schema_defaults_to_change_mode() {
        let s = Schema::change("app", 2);
        assert_eq!(s.mode, TableMode::Change);
        assert_eq!(s.version, SchemaVersion(2));
    }
}
