//! Resolves foreign-key references across renames and drops.
//!
//! A column declared with `references(table, column)` captures the name of
//! its target at declaration time. If that target is later renamed, the
//! captured name goes stale; if it's dropped, the reference is dangling.
//! `trace_foreign` walks the tombstone trail left behind by
//! [`crate::accumulate`] to bring every foreign-key name back in sync with
//! reality, or to report that it can't be.

use crate::column::ColumnFlag;
use crate::error::{Error, Result};
use crate::ident::{CasePolicy, Named};
use crate::schema::Schema;
use crate::table::Table;

/// Outcome of tracing a single foreign-key endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceOutcome {
    /// The name was unaffected, or successfully re-pointed to this name.
    Resolved(String),
    /// The referenced entity was dropped along the way.
    Dropped,
    /// Scanning found neither a live entry nor a tombstone for this name
    /// (it never existed within the traced window).
    NotFound,
}

/// Walks a window of entries looking for a tombstone whose `old_name`
/// matches `name`, following rename chains by restarting the scan with the
/// new name. The window passed in is already bounded to the watermark by
/// [`column_window`]/[`table_window`].
fn trace_in_names(
    policy: CasePolicy,
    window: &[(Option<String>, Option<String>, bool)],
    start_name: &str,
) -> TraceOutcome {
    let mut current = start_name.to_string();
    'restart: loop {
        for (name, old_name, is_renamed) in window {
            let Some(old) = old_name else { continue };
            if !policy.eq(old, &current) {
                continue;
            }
            match (name, is_renamed) {
                (None, _) => return TraceOutcome::Dropped,
                (Some(new_name), true) => {
                    current = new_name.clone();
                    continue 'restart;
                }
                (Some(_), false) => continue,
            }
        }
        return TraceOutcome::Resolved(current);
    }
}

fn column_window(table: &Table) -> Vec<(Option<String>, Option<String>, bool)> {
    table
        .columns
        .as_slice()
        .iter()
        .skip(table.offset)
        .map(|c| {
            (
                c.reentry.name.clone(),
                c.reentry.old_name.clone(),
                c.flags.contains(ColumnFlag::Renamed),
            )
        })
        .collect()
}

fn table_window(schema: &Schema) -> Vec<(Option<String>, Option<String>, bool)> {
    use crate::table::TableFlag;
    schema
        .tables
        .as_slice()
        .iter()
        .skip(schema.offset)
        .map(|t| {
            (
                t.reentry.name.clone(),
                t.reentry.old_name.clone(),
                t.flags.contains(TableFlag::Renamed),
            )
        })
        .collect()
}

/// Re-resolves every foreign key in `schema` against the rename/drop
/// tombstones accumulated since the last call (bounded below by
/// `schema.offset` for table names, and each table's own `offset` for
/// column names). Mutates resolved references in place.
pub fn trace_foreign(schema: &mut Schema) -> Result<()> {
    let policy = schema.policy;
    let table_names = table_window(schema);

    let table_count = schema.tables.len();
    for ti in 0..table_count {
        let (target_table_name, has_foreign) = {
            let table = &schema.tables[ti];
            (
                table.name().map(|s| s.to_string()),
                table.foreign_columns().count() > 0,
            )
        };
        if !has_foreign || target_table_name.is_none() {
            continue;
        }

        let resolutions: Vec<(usize, String, String, TraceOutcome, TraceOutcome)> = {
            let table = &schema.tables[ti];
            table
                .columns
                .as_slice()
                .iter()
                .enumerate()
                .filter_map(|(ci, col)| {
                    let fk = col.foreign.as_ref()?;
                    let table_outcome = trace_in_names(policy, &table_names, &fk.table);

                    let column_outcome = match &table_outcome {
                        TraceOutcome::Resolved(resolved_table) => {
                            match schema.find_table(resolved_table) {
                                Some(target) => {
                                    let window = column_window(target);
                                    trace_in_names(policy, &window, &fk.column)
                                }
                                None => TraceOutcome::NotFound,
                            }
                        }
                        _ => TraceOutcome::NotFound,
                    };
                    Some((ci, fk.table.clone(), fk.column.clone(), table_outcome, column_outcome))
                })
                .collect()
        };

        let table = schema.tables.iter_mut().nth(ti).unwrap();
        for (ci, orig_table, orig_column, table_outcome, column_outcome) in resolutions {
            match &table_outcome {
                TraceOutcome::Dropped => return Err(Error::ReentryDropped(orig_table)),
                TraceOutcome::NotFound => {
                    return Err(Error::ReferenceNotFound {
                        table: orig_table,
                        column: orig_column,
                    })
                }
                TraceOutcome::Resolved(_) => {}
            }
            match &column_outcome {
                TraceOutcome::Dropped => return Err(Error::ReentryDropped(orig_column)),
                TraceOutcome::NotFound => {
                    return Err(Error::ReferenceNotFound {
                        table: orig_table,
                        column: orig_column,
                    })
                }
                TraceOutcome::Resolved(_) => {}
            }

            let col = table.columns.iter_mut().nth(ci).unwrap();
            let Some(fk) = col.foreign.as_mut() else {
                continue;
            };
            if let TraceOutcome::Resolved(name) = table_outcome {
                fk.table = name;
            }
            if let TraceOutcome::Resolved(name) = column_outcome {
                fk.column = name;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::CasePolicy;

    #[test]
    fn trace_follows_single_rename() {
        let window = vec![(Some("email_addr".to_string()), Some("email".to_string()), true)];
        let outcome = trace_in_names(CasePolicy::Sensitive, &window, "email");
        assert_eq!(outcome, TraceOutcome::Resolved("email_addr".to_string()));
    }

    #[test]
    fn trace_follows_chained_renames() {
        let window = vec![
            (Some("mail".to_string()), Some("email".to_string()), true),
            (Some("email_addr".to_string()), Some("mail".to_string()), true),
        ];
        let outcome = trace_in_names(CasePolicy::Sensitive, &window, "email");
        assert_eq!(outcome, TraceOutcome::Resolved("email_addr".to_string()));
    }

    #[test]
    fn trace_reports_drop() {
        let window = vec![(None, Some("legacy".to_string()), false)];
        let outcome = trace_in_names(CasePolicy::Sensitive, &window, "legacy");
        assert_eq!(outcome, TraceOutcome::Dropped);
    }

    #[test]
    fn trace_unaffected_name_resolves_to_itself() {
        let window: Vec<(Option<String>, Option<String>, bool)> = vec![];
        let outcome = trace_in_names(CasePolicy::Sensitive, &window, "untouched");
        assert_eq!(outcome, TraceOutcome::Resolved("untouched".to_string()));
    }

    #[test]
    fn end_to_end_rename_then_reference_is_resolved() {
        use crate::schema::Schema;

        let mut base = Schema::new("app");
        base.create_table("users").add_int64("id").autoincrement();

        // A single migration step both renames the column being referenced
        // and introduces the foreign key against its old name. trace_foreign
        // must resolve the reference within this one accumulation.
        let mut step = Schema::change("app", 2);
        step.alter_table("users")
            .rename_column("id", "user_id", CasePolicy::Sensitive);
        step.create_table("posts")
            .add_int64("author_id")
            .references("users", "id");
        base.accumulate(step).unwrap();

        let posts = base.find_table("posts").unwrap();
        let fk = posts
            .columns
            .as_slice()
            .iter()
            .find_map(|c| c.foreign.as_ref())
            .unwrap();
        assert_eq!(fk.column, "user_id");
    }

    #[test]
    fn trace_foreign_errors_when_referenced_column_is_dropped() {
        use crate::schema::Schema;

        let mut base = Schema::new("app");
        base.create_table("users").add_int64("id").autoincrement().primary();
        base.create_table("posts")
            .add_int64("author_id")
            .references("users", "id");

        let mut step = Schema::change("app", 2);
        step.alter_table("users").drop_column("id", CasePolicy::Sensitive);

        let err = base.accumulate(step).unwrap_err();
        assert!(matches!(err, Error::ReentryDropped(_)));
    }
}
