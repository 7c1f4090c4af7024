//! Table model: a [`crate::entry::Reentry`] owning a [`Type`] of columns.

use crate::column::{Column, ColumnFlag};
use crate::entry::{Reentry, Type};
use crate::ident::{CasePolicy, Named};
use crate::value::ValueKind;
use enumflags2::{bitflags, BitFlags};

#[bitflags]
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFlag {
    Changed,
    Renamed,
    /// At least one column was added by the step that produced this table.
    ColAdded,
    /// At least one composite constraint column was added.
    ColAddedConstraint,
    ColAltered,
    ColRenamed,
    ColDropped,
}

/// Whether a table is being declared fresh or is a change record being
/// folded into a running schema via [`crate::accumulate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    Define,
    Change,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub reentry: Reentry,
    pub flags: BitFlags<TableFlag>,
    pub columns: Type<Column>,
    pub mode: TableMode,
    /// Count of columns already settled as of the last accumulation; the
    /// watermark `trace_foreign` scans forward from.
    pub offset: usize,
}

impl Named for Table {
    fn name(&self) -> Option<&str> {
        self.reentry.name()
    }
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            reentry: Reentry::added(name),
            flags: BitFlags::empty(),
            columns: Type::new(),
            mode: TableMode::Define,
            offset: 0,
        }
    }

    pub fn renamed(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Table {
            reentry: Reentry::renamed(old_name, new_name),
            flags: BitFlags::empty(),
            columns: Type::new(),
            mode: TableMode::Change,
            offset: 0,
        }
    }

    pub fn dropped(old_name: impl Into<String>) -> Self {
        Table {
            reentry: Reentry::dropped(old_name),
            flags: BitFlags::empty(),
            columns: Type::new(),
            mode: TableMode::Change,
            offset: 0,
        }
    }

    /// Begin a change record against an existing table of this name: new
    /// columns appended to the result become tombstones/renames/alters
    /// rather than plain adds.
    pub fn change(name: impl Into<String>) -> Self {
        Table {
            reentry: Reentry::added(name),
            flags: BitFlags::from(TableFlag::Changed),
            columns: Type::new(),
            mode: TableMode::Change,
            offset: 0,
        }
    }

    pub fn old_name(&self) -> Option<&str> {
        self.reentry.old_name.as_deref()
    }

    pub fn is_tombstone(&self) -> bool {
        self.reentry.is_tombstone()
    }

    pub fn is_rename(&self) -> bool {
        self.reentry.is_rename()
    }

    pub fn is_alter(&self) -> bool {
        self.flags.contains(TableFlag::Changed) && self.reentry.name.is_some()
    }

    /// A table counts as live when it has a current name and isn't a
    /// rename waypoint kept around only for [`crate::trace::trace_foreign`].
    pub fn is_live(&self) -> bool {
        self.reentry.name.is_some() && !self.flags.contains(TableFlag::Renamed)
    }

    fn push_column(&mut self, column: Column) -> &mut Column {
        self.columns.push(column);
        let idx = self.columns.len() - 1;
        self.columns.iter_mut().nth(idx).unwrap()
    }

    pub fn add_column(&mut self, name: impl Into<String>, kind: ValueKind) -> &mut Column {
        self.push_column(Column::new(name, kind))
    }

    pub fn add_int(&mut self, name: impl Into<String>) -> &mut Column {
        self.add_column(name, ValueKind::Int)
    }

    pub fn add_uint(&mut self, name: impl Into<String>) -> &mut Column {
        self.add_column(name, ValueKind::Uint)
    }

    pub fn add_int64(&mut self, name: impl Into<String>) -> &mut Column {
        self.add_column(name, ValueKind::Int64)
    }

    pub fn add_uint64(&mut self, name: impl Into<String>) -> &mut Column {
        self.add_column(name, ValueKind::Uint64)
    }

    pub fn add_double(&mut self, name: impl Into<String>) -> &mut Column {
        self.add_column(name, ValueKind::Double)
    }

    pub fn add_string(&mut self, name: impl Into<String>, size: u32) -> &mut Column {
        let col = self.push_column(Column::new(name, ValueKind::String));
        col.size = Some(size);
        col
    }

    pub fn add_timestamp(&mut self, name: impl Into<String>) -> &mut Column {
        self.add_column(name, ValueKind::Timestamp)
    }

    pub fn add_custom(&mut self, name: impl Into<String>, kind: ValueKind) -> &mut Column {
        self.push_column(Column::new(name, kind))
    }

    /// Synthesizes a named foreign-key constraint column, as the source's
    /// `add_foreign` does: `{table}_{column}_foreign`, marked CONSTRAINT.
    pub fn add_foreign(&mut self, column: &str) -> &mut Column {
        let table_name = self.reentry.name.clone().unwrap_or_default();
        let constraint_name = format!("{table_name}_{column}_foreign");
        let col = self.push_column(Column::new(constraint_name, ValueKind::Int64));
        col.flags |= ColumnFlag::Constraint | ColumnFlag::Foreign;
        col
    }

    /// Appends a column tombstone (in [`TableMode::Change`]) or mutates a
    /// live column in place (in [`TableMode::Define`]).
    pub fn drop_column(&mut self, name: &str, policy: CasePolicy) {
        match self.mode {
            TableMode::Change => self.columns.push(Column::dropped(name)),
            TableMode::Define => {
                if let Some(idx) = self.columns.find_index(policy, name) {
                    self.columns.remove_at(idx);
                }
            }
        }
    }

    pub fn rename_column(&mut self, from: &str, to: &str, policy: CasePolicy) {
        match self.mode {
            TableMode::Change => self.columns.push(Column::renamed(from, to)),
            TableMode::Define => {
                if let Some(col) = self.columns.find_mut(policy, from) {
                    col.reentry.old_name = Some(from.to_string());
                    col.reentry.name = Some(to.to_string());
                }
            }
        }
    }

    pub fn primary_key_column(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.kind.is_integral() && c.flags.contains(ColumnFlag::Primary))
    }

    pub fn foreign_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| c.foreign.is_some() || c.flags.contains(ColumnFlag::Foreign))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_mode_adds_columns_directly() {
        let mut t = Table::new("users");
        t.add_int64("id").autoincrement();
        t.add_string("email", 191);
        assert_eq!(t.columns.len(), 2);
    }

    #[test]
    fn change_mode_drop_produces_tombstone() {
        let mut t = Table::change("users");
        t.drop_column("legacy_flag", CasePolicy::Sensitive);
        let col = t.columns.get(0).unwrap();
        assert!(col.is_tombstone());
        assert_eq!(col.old_name(), Some("legacy_flag"));
    }

    #[test]
    fn change_mode_rename_produces_rename_record() {
        let mut t = Table::change("users");
        t.rename_column("old_email", "email", CasePolicy::Sensitive);
        let col = t.columns.get(0).unwrap();
        assert!(col.is_rename());
    }

    #[test]
    fn add_foreign_synthesizes_constraint_name() {
        let mut t = Table::new("posts");
        t.add_int64("author_id");
        let fk = t.add_foreign("author_id");
        assert_eq!(fk.name(), Some("posts_author_id_foreign"));
        assert!(fk.flags.contains(ColumnFlag::Foreign));
    }

    #[test]
    fn foreign_columns_filters_correctly() {
        let mut t = Table::new("posts");
        t.add_int64("author_id").references("users", "id");
        t.add_string("title", 200);
        assert_eq!(t.foreign_columns().count(), 1);
    }
}
