//! Folds a migration-step schema/table into a running one.
//!
//! Every step record is classified by which of `name`/`old_name` it
//! carries (see [`crate::entry::Reentry`]); folding it in produces one of
//! four outcomes: add, alter, rename, or drop. Renames and drops leave a
//! tombstone behind in the same column/table list rather than recording
//! history anywhere else — [`crate::trace`] is what later makes sense of
//! those tombstones.

use crate::column::{Column, ColumnFlag};
use crate::error::{Error, Result};
use crate::ident::{CasePolicy, Named};
use crate::schema::Schema;
use crate::table::{Table, TableFlag};
use crate::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classify {
    Add,
    Alter,
    Rename,
    Drop,
}

pub fn classify_column(col: &Column) -> Classify {
    if col.reentry.name.is_none() {
        Classify::Drop
    } else if col.reentry.old_name.is_some() {
        Classify::Rename
    } else if col.flags.contains(ColumnFlag::Changed) {
        Classify::Alter
    } else {
        Classify::Add
    }
}

pub fn classify_table(table: &Table) -> Classify {
    if table.reentry.name.is_none() {
        Classify::Drop
    } else if table.reentry.old_name.is_some() {
        Classify::Rename
    } else if table.flags.contains(TableFlag::Changed) {
        Classify::Alter
    } else {
        Classify::Add
    }
}

fn find_live_column_index(table: &Table, policy: CasePolicy, name: &str) -> Option<usize> {
    table
        .columns
        .as_slice()
        .iter()
        .position(|c| c.is_live() && policy.eq(c.name().unwrap(), name))
}

fn find_live_table_index(schema: &Schema, policy: CasePolicy, name: &str) -> Option<usize> {
    schema
        .tables
        .as_slice()
        .iter()
        .position(|t| t.is_live() && policy.eq(t.name().unwrap(), name))
}

/// Folds `step`'s columns into `base` in place.
pub fn accumulate_table(base: &mut Table, step: Table, policy: CasePolicy) -> Result<()> {
    for col in step.columns.into_vec() {
        match classify_column(&col) {
            Classify::Alter => {
                let name = col.name().unwrap().to_string();
                let idx = find_live_column_index(base, policy, &name)
                    .ok_or_else(|| Error::EntryNotFound(name.clone()))?;
                base.columns.remove_at(idx);
                base.columns.push(col);
                base.flags |= TableFlag::ColAltered;
            }
            Classify::Drop => {
                let old = col.old_name().unwrap().to_string();
                let idx = find_live_column_index(base, policy, &old)
                    .ok_or_else(|| Error::EntryNotFound(old.clone()))?;
                base.columns.remove_at(idx);
                base.columns.push(col);
                base.flags |= TableFlag::ColDropped;
            }
            Classify::Rename => {
                let old = col.old_name().unwrap().to_string();
                let new = col.name().unwrap().to_string();
                let idx = find_live_column_index(base, policy, &old)
                    .ok_or_else(|| Error::EntryNotFound(old.clone()))?;
                base.columns
                    .iter_mut()
                    .nth(idx)
                    .unwrap()
                    .reentry
                    .name = Some(new);
                let mut waypoint = col;
                waypoint.flags |= ColumnFlag::Renamed;
                base.columns.push(waypoint);
                base.flags |= TableFlag::ColRenamed;
            }
            Classify::Add => {
                let constraint = col.flags.contains(ColumnFlag::Constraint);
                base.columns.push(col);
                base.flags |= if constraint {
                    TableFlag::ColAddedConstraint
                } else {
                    TableFlag::ColAdded
                };
            }
        }
    }
    Ok(())
}

/// Folds `step`'s tables into `base`, then resolves foreign-key names via
/// [`trace::trace_foreign`] and advances the accumulation watermarks.
pub fn accumulate_schema(base: &mut Schema, step: Schema) -> Result<()> {
    let policy = base.policy;

    for step_table in step.tables.into_vec() {
        match classify_table(&step_table) {
            Classify::Alter => {
                let name = step_table.name().unwrap().to_string();
                let idx = find_live_table_index(base, policy, &name)
                    .ok_or_else(|| Error::EntryNotFound(name.clone()))?;
                let mut target = base.tables.remove_at(idx);
                accumulate_table(&mut target, step_table, policy)?;
                target.flags |= TableFlag::Changed;
                base.tables.push(target);
            }
            Classify::Drop => {
                let old = step_table.old_name().unwrap().to_string();
                let idx = find_live_table_index(base, policy, &old)
                    .ok_or_else(|| Error::EntryNotFound(old.clone()))?;
                base.tables.remove_at(idx);
                base.tables.push(step_table);
            }
            Classify::Rename => {
                let old = step_table.old_name().unwrap().to_string();
                let new = step_table.name().unwrap().to_string();
                let idx = find_live_table_index(base, policy, &old)
                    .ok_or_else(|| Error::EntryNotFound(old.clone()))?;
                base.tables.iter_mut().nth(idx).unwrap().reentry.name = Some(new);
                let mut waypoint = step_table;
                waypoint.flags |= TableFlag::Renamed;
                base.tables.push(waypoint);
            }
            Classify::Add => {
                base.tables.push(step_table);
            }
        }
    }

    if step.version.0 < base.version.0 {
        tracing::warn!(
            base = base.version.0,
            step = step.version.0,
            "ignoring schema step with older version than the running schema"
        );
    } else {
        base.version = step.version;
    }

    trace::trace_foreign(base)?;

    base.offset = base.tables.len();
    for table in base.tables.iter_mut() {
        table.offset = table.columns.len();
    }

    Ok(())
}

impl Table {
    pub fn accumulate(&mut self, step: Table, policy: CasePolicy) -> Result<()> {
        accumulate_table(self, step, policy)
    }
}

impl Schema {
    pub fn accumulate(&mut self, step: Schema) -> Result<()> {
        accumulate_schema(self, step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_schema() -> Schema {
        let mut s = Schema::new("app");
        let t = s.create_table("users");
        t.add_int64("id").autoincrement();
        t.add_string("email", 191);
        s
    }

    #[test]
    fn add_column_appends() {
        let mut base = base_schema();
        let mut step = Schema::change("app", 2);
        step.alter_table("users").add_string("nickname", 64);
        base.accumulate(step).unwrap();
        let users = base.find_table("users").unwrap();
        assert!(users.columns.as_slice().iter().any(|c| c.name() == Some("nickname")));
    }

    #[test]
    fn drop_column_leaves_tombstone_and_removes_live() {
        let mut base = base_schema();
        let mut step = Schema::change("app", 2);
        step.alter_table("users").drop_column("email", CasePolicy::Sensitive);
        base.accumulate(step).unwrap();
        let users = base.find_table("users").unwrap();
        assert!(!users.columns.as_slice().iter().any(|c| c.name() == Some("email") && !c.flags.contains(ColumnFlag::Renamed)));
        assert!(users
            .columns
            .as_slice()
            .iter()
            .any(|c| c.is_tombstone() && c.old_name() == Some("email")));
    }

    #[test]
    fn rename_column_updates_live_and_leaves_waypoint() {
        let mut base = base_schema();
        let mut step = Schema::change("app", 2);
        step.alter_table("users").rename_column("email", "email_address", CasePolicy::Sensitive);
        base.accumulate(step).unwrap();
        let users = base.find_table("users").unwrap();
        assert!(users
            .columns
            .as_slice()
            .iter()
            .any(|c| c.is_live() && c.name() == Some("email_address")));
        assert!(users
            .columns
            .as_slice()
            .iter()
            .any(|c| c.flags.contains(ColumnFlag::Renamed) && c.old_name() == Some("email")));
    }

    #[test]
    fn chained_renames_leave_two_waypoints() {
        let mut base = base_schema();
        let mut step1 = Schema::change("app", 2);
        step1.alter_table("users").rename_column("email", "mail", CasePolicy::Sensitive);
        base.accumulate(step1).unwrap();

        let mut step2 = Schema::change("app", 3);
        step2.alter_table("users").rename_column("mail", "email_address", CasePolicy::Sensitive);
        base.accumulate(step2).unwrap();

        let users = base.find_table("users").unwrap();
        let waypoints: Vec<_> = users
            .columns
            .as_slice()
            .iter()
            .filter(|c| c.flags.contains(ColumnFlag::Renamed))
            .collect();
        assert_eq!(waypoints.len(), 2);
        assert!(users
            .columns
            .as_slice()
            .iter()
            .any(|c| c.is_live() && c.name() == Some("email_address")));
    }

    #[test]
    fn alter_missing_column_is_an_error() {
        let mut base = base_schema();
        let mut step = Schema::change("app", 2);
        step.alter_table("users").drop_column("ghost", CasePolicy::Sensitive);
        assert!(base.accumulate(step).is_err());
    }

    #[test]
    fn add_table_and_drop_table_roundtrip() {
        let mut base = base_schema();
        let mut step = Schema::change("app", 2);
        step.create_table("posts").add_int64("id");
        base.accumulate(step).unwrap();
        assert!(base.find_table("posts").is_some());

        let mut step2 = Schema::change("app", 3);
        step2.drop_table("posts");
        base.accumulate(step2).unwrap();
        assert!(base.find_table("posts").is_none());
    }

    #[test]
    fn offsets_advance_after_accumulate() {
        let mut base = base_schema();
        let mut step = Schema::change("app", 2);
        step.alter_table("users").add_string("nickname", 64);
        base.accumulate(step).unwrap();
        assert_eq!(base.offset, base.tables.len());
        let users = base.find_table("users").unwrap();
        assert_eq!(users.offset, users.columns.len());
    }
}
