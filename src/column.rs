//! Column model: a [`crate::entry::Reentry`] plus SQL-specific attributes.

use crate::entry::Reentry;
use crate::ident::Named;
use crate::value::{Value, ValueKind};
use enumflags2::{bitflags, BitFlags};

#[bitflags]
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFlag {
    Primary,
    Unique,
    Autoincrement,
    Nullable,
    Foreign,
    /// Set on a step column to mark it as an ALTER rather than an ADD.
    Changed,
    /// Set on a step column carrying a rename (`old_name` + new `name`).
    Renamed,
    /// Composite index / unique / primary-key constraint, keyed by name
    /// rather than a single column.
    Constraint,
    /// Excluded from an application's external (e.g. JSON) representation;
    /// has no effect on the rendered SQL.
    Hidden,
    /// Timestamp column defaulting to the current time: `DEFAULT
    /// CURRENT_TIMESTAMP`.
    Current,
    /// Timestamp column refreshed on every update: `ON UPDATE
    /// CURRENT_TIMESTAMP`.
    CurrentOnUpdate,
}

/// What a foreign-key column references, and the action taken when the
/// referenced row changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ForeignAction {
    #[default]
    NoAction,
    Cascade,
    SetNull,
    Restrict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Foreign {
    pub table: String,
    pub column: String,
    pub on_delete: ForeignAction,
    pub on_update: ForeignAction,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub reentry: Reentry,
    pub kind: ValueKind,
    pub flags: BitFlags<ColumnFlag>,
    pub size: Option<u32>,
    pub precision: Option<u32>,
    pub default: Option<Value>,
    pub foreign: Option<Foreign>,
    /// Column names this entry composes over (composite index/unique/PK).
    pub composite: Vec<String>,
    /// Opaque SQL fragment appended verbatim after the column definition.
    pub raw: Option<String>,
}

impl Named for Column {
    fn name(&self) -> Option<&str> {
        self.reentry.name()
    }
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Column {
            reentry: Reentry::added(name),
            kind,
            flags: BitFlags::empty(),
            size: None,
            precision: None,
            default: None,
            foreign: None,
            composite: Vec::new(),
            raw: None,
        }
    }

    pub fn renamed(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Column {
            reentry: Reentry::renamed(old_name, new_name),
            ..Column::new(String::new(), ValueKind::Int)
        }
    }

    pub fn dropped(old_name: impl Into<String>) -> Self {
        Column {
            reentry: Reentry::dropped(old_name),
            ..Column::new(String::new(), ValueKind::Int)
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
        self.flags.contains(ColumnFlag::Changed) && self.reentry.name.is_some()
    }

    /// A column counts as live when it has a current name and isn't a
    /// rename waypoint kept around only for [`crate::trace::trace_foreign`].
    pub fn is_live(&self) -> bool {
        self.reentry.name.is_some() && !self.flags.contains(ColumnFlag::Renamed)
    }

    // These return `&mut Self` rather than `Self` so they chain directly off
    // `Table::add_*`, which hands back a reference into the table's column
    // list rather than an owned column.

    pub fn with_size(&mut self, size: u32) -> &mut Self {
        self.size = Some(size);
        self
    }

    pub fn with_precision(&mut self, precision: u32) -> &mut Self {
        self.precision = Some(precision);
        self
    }

    pub fn nullable(&mut self) -> &mut Self {
        self.flags |= ColumnFlag::Nullable;
        self
    }

    pub fn primary(&mut self) -> &mut Self {
        self.flags |= ColumnFlag::Primary;
        self
    }

    pub fn unique(&mut self) -> &mut Self {
        self.flags |= ColumnFlag::Unique;
        self
    }

    pub fn autoincrement(&mut self) -> &mut Self {
        self.flags |= ColumnFlag::Autoincrement | ColumnFlag::Primary;
        self
    }

    pub fn default_value(&mut self, value: Value) -> &mut Self {
        self.default = Some(value);
        self
    }

    pub fn raw_sql(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.raw = Some(fragment.into());
        self
    }

    pub fn change(&mut self) -> &mut Self {
        self.flags |= ColumnFlag::Changed;
        self
    }

    pub fn references(&mut self, table: impl Into<String>, column: impl Into<String>) -> &mut Self {
        self.flags |= ColumnFlag::Foreign;
        self.foreign = Some(Foreign {
            table: table.into(),
            column: column.into(),
            on_delete: ForeignAction::NoAction,
            on_update: ForeignAction::NoAction,
        });
        self
    }

    pub fn on_delete(&mut self, action: ForeignAction) -> &mut Self {
        if let Some(f) = self.foreign.as_mut() {
            f.on_delete = action;
        }
        self
    }

    pub fn on_update(&mut self, action: ForeignAction) -> &mut Self {
        if let Some(f) = self.foreign.as_mut() {
            f.on_update = action;
        }
        self
    }

    pub fn set_composite(&mut self, names: &[&str]) -> &mut Self {
        self.composite = names.iter().map(|s| s.to_string()).collect();
        self.flags |= ColumnFlag::Constraint;
        self
    }

    pub fn hidden(&mut self) -> &mut Self {
        self.flags |= ColumnFlag::Hidden;
        self
    }

    pub fn current(&mut self) -> &mut Self {
        self.flags |= ColumnFlag::Current;
        self
    }

    pub fn current_on_update(&mut self) -> &mut Self {
        self.flags |= ColumnFlag::CurrentOnUpdate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_column_is_add_by_default() {
        let mut c = Column::new("id", ValueKind::Int64);
        c.autoincrement();
        assert!(!c.is_tombstone());
        assert!(!c.is_rename());
        assert!(c.flags.contains(ColumnFlag::Primary));
    }

    #[test]
    fn dropped_column_has_no_name() {
        let c = Column::dropped("legacy_flag");
        assert!(c.is_tombstone());
        assert_eq!(c.old_name(), Some("legacy_flag"));
        assert_eq!(c.name(), None);
    }

    #[test]
    fn renamed_column_keeps_both_names() {
        let c = Column::renamed("old_email", "email");
        assert!(c.is_rename());
        assert_eq!(c.old_name(), Some("old_email"));
        assert_eq!(c.name(), Some("email"));
    }

    #[test]
    fn foreign_builder_sets_actions() {
        let mut c = Column::new("author_id", ValueKind::Int64);
        c.references("users", "id").on_delete(ForeignAction::Cascade);
        let f = c.foreign.unwrap();
        assert_eq!(f.table, "users");
        assert_eq!(f.on_delete, ForeignAction::Cascade);
    }

    #[test]
    fn timestamp_modifiers_set_their_flags() {
        let mut c = Column::new("updated_at", ValueKind::Timestamp);
        c.current().current_on_update();
        assert!(c.flags.contains(ColumnFlag::Current));
        assert!(c.flags.contains(ColumnFlag::CurrentOnUpdate));
    }

    #[test]
    fn hidden_sets_its_flag() {
        let mut c = Column::new("password_hash", ValueKind::String);
        c.hidden();
        assert!(c.flags.contains(ColumnFlag::Hidden));
    }
}
