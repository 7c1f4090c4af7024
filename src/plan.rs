//! Turns a migration-step schema into an ordered stream of SQL statements.
//!
//! The planner works directly on the step schema (the same one passed to
//! [`crate::schema::Schema::accumulate`]), not the settled baseline: a
//! pre-existing table's foreign keys are already satisfied in the live
//! database, so only the tables being freshly created in *this* step need
//! dependency ordering against each other.

use crate::accumulate::{classify_column, classify_table, Classify};
use crate::column::{Column, ColumnFlag};
use crate::dialect::{Dialect, RenameTableSyntax};
use crate::error::{Error, Result};
use crate::ident::Named;
use crate::render::{
    quote_ident, write_column_body, write_constraint, write_foreign_ref, Statement,
};
use crate::schema::Schema;
use crate::table::Table;
use itertools::Itertools;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Plans every table change recorded in `step` into SQL text for `dialect`.
pub fn plan(step: &Schema, dialect: &Dialect) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();

    let creates: Vec<&Table> = step
        .tables
        .as_slice()
        .iter()
        .filter(|t| classify_table(t) == Classify::Add)
        .collect();
    let (order, deferred_fks) = order_creates(&creates, dialect)?;

    for table in &order {
        statements.push(create_table_statement(dialect, table, &deferred_fks));
    }
    for (table, column) in &deferred_fks {
        statements.push(add_foreign_key_statement(dialect, table, column));
    }

    for table in step.tables.as_slice() {
        match classify_table(table) {
            Classify::Add => {} // handled above
            Classify::Drop => {
                let name = table.old_name().unwrap();
                statements.push(Statement::destructive(format!(
                    "DROP TABLE {};",
                    quote_ident(dialect, name)
                )));
            }
            Classify::Rename => {
                let old = table.old_name().unwrap();
                let new = table.name().unwrap();
                let sql = match dialect.rename_table_syntax {
                    RenameTableSyntax::AlterTableRenameTo => format!(
                        "ALTER TABLE {} RENAME TO {};",
                        quote_ident(dialect, old),
                        quote_ident(dialect, new)
                    ),
                    RenameTableSyntax::RenameTable => format!(
                        "RENAME TABLE {} TO {};",
                        quote_ident(dialect, old),
                        quote_ident(dialect, new)
                    ),
                };
                statements.push(Statement::safe(sql));
            }
            Classify::Alter => {
                statements.extend(alter_table_statements(dialect, table)?);
            }
        }
    }

    Ok(statements)
}

/// Orders tables free of forward FK edges (within this step) before their
/// dependents. A strongly-connected component spanning more than one table
/// (or a self-loop) is a mutual reference.
///
/// Engines that can express a forward reference inline (`supports_inline_forward_fk`)
/// get every edge inside the cycle deferred to a trailing
/// `ALTER TABLE ... ADD FOREIGN KEY`. Engines that can't (SQLite has no
/// `ALTER TABLE ... ADD CONSTRAINT`) have no way to express the cycle at
/// all, so it's reported as an error instead of emitting DDL the engine
/// would reject.
fn order_creates<'a>(
    tables: &[&'a Table],
    dialect: &Dialect,
) -> Result<(Vec<&'a Table>, Vec<(&'a Table, &'a Column)>)> {
    let index_by_name: HashMap<&str, usize> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name().unwrap(), i))
        .collect();

    let mut graph = DiGraph::<usize, ()>::new();
    let nodes: Vec<NodeIndex> = (0..tables.len()).map(|i| graph.add_node(i)).collect();

    // edge table -> referenced_table, only for FKs resolvable within this set
    let mut edges: Vec<(usize, usize)> = Vec::new();
    for (i, table) in tables.iter().enumerate() {
        for col in table.foreign_columns() {
            let Some(fk) = &col.foreign else { continue };
            if let Some(&j) = index_by_name.get(fk.table.as_str()) {
                edges.push((i, j));
            }
        }
    }
    for &(i, j) in &edges {
        graph.add_edge(nodes[i], nodes[j], ());
    }

    let sccs = tarjan_scc(&graph);
    let mut in_cycle = vec![false; tables.len()];
    for scc in &sccs {
        if scc.len() > 1 {
            for n in scc {
                in_cycle[graph[*n]] = true;
            }
        }
    }
    for &(i, j) in &edges {
        if i == j {
            in_cycle[i] = true;
        }
    }

    if !dialect.supports_inline_forward_fk {
        if let Some((i, j)) = edges.iter().find(|&&(i, j)| in_cycle[i] && in_cycle[j]) {
            return Err(Error::ReferenceEachOther(
                tables[*i].name().unwrap().to_string(),
                tables[*j].name().unwrap().to_string(),
            ));
        }
    }

    let mut deferred_fks = Vec::new();
    for (i, table) in tables.iter().enumerate() {
        if !in_cycle[i] {
            continue;
        }
        for col in table.foreign_columns() {
            deferred_fks.push((*table, col));
        }
    }

    let mut acyclic = DiGraph::<usize, ()>::new();
    let acyclic_nodes: Vec<NodeIndex> = (0..tables.len()).map(|i| acyclic.add_node(i)).collect();
    for &(i, j) in &edges {
        if !in_cycle[i] && !in_cycle[j] {
            acyclic.add_edge(acyclic_nodes[i], acyclic_nodes[j], ());
        }
    }

    // toposort wants dependencies-first for our CREATE order, but the edge
    // direction above is table -> referenced_table (dependent -> dependency),
    // so reverse the resulting order.
    let mut ordered_indices = match toposort(&acyclic, None) {
        Ok(order) => order.into_iter().map(|n| acyclic[n]).collect::<Vec<_>>(),
        Err(_) => (0..tables.len()).collect(),
    };
    ordered_indices.reverse();

    let non_cyclic_ordered: Vec<&Table> = ordered_indices
        .into_iter()
        .filter(|&i| !in_cycle[i])
        .map(|i| tables[i])
        .collect();
    let cyclic_tables: Vec<&Table> = (0..tables.len())
        .filter(|&i| in_cycle[i])
        .map(|i| tables[i])
        .collect();

    let mut result = non_cyclic_ordered;
    result.extend(cyclic_tables);
    Ok((result, deferred_fks))
}

fn create_table_statement(
    dialect: &Dialect,
    table: &Table,
    deferred: &[(&Table, &Column)],
) -> Statement {
    // Deferred FK columns still get their column definition inline; only
    // the `REFERENCES` clause (or the whole constraint, for a synthetic
    // add_foreign() column) moves to a trailing ALTER TABLE statement.
    let deferred_cols: Vec<&str> = deferred
        .iter()
        .filter(|(t, _)| t.name() == table.name())
        .map(|(_, c)| c.name().unwrap())
        .collect();

    let ordered_columns = table
        .columns
        .as_slice()
        .iter()
        .filter(|c| !(deferred_cols.contains(&c.name().unwrap_or_default()) && c.flags.contains(ColumnFlag::Constraint)))
        .sorted_by_key(|c| column_sort_rank(c));

    let mut lines: Vec<String> = Vec::new();
    for col in ordered_columns {
        let is_deferred = deferred_cols.contains(&col.name().unwrap_or_default());
        if col.flags.contains(ColumnFlag::Constraint) {
            lines.push(write_constraint(dialect, col));
        } else {
            let mut body = write_column_body(dialect, col);
            if col.flags.contains(ColumnFlag::Primary) {
                body.push_str(" PRIMARY KEY");
            }
            if col.foreign.is_some() && !is_deferred {
                body.push(' ');
                body.push_str(&write_foreign_ref(dialect, col));
            }
            lines.push(body);
        }
    }

    let sql = format!(
        "CREATE TABLE {} (\n  {}\n);",
        quote_ident(dialect, table.name().unwrap()),
        lines.join(",\n  ")
    );
    Statement::safe(sql)
}

fn column_sort_rank(column: &Column) -> u8 {
    if column.flags.contains(ColumnFlag::Primary) {
        0
    } else if column.flags.contains(ColumnFlag::Constraint) {
        2
    } else {
        1
    }
}

fn add_foreign_key_statement(dialect: &Dialect, table: &Table, column: &Column) -> Statement {
    let sql = format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) {};",
        quote_ident(dialect, table.name().unwrap()),
        quote_ident(dialect, column.name().unwrap()),
        quote_ident(dialect, column.name().unwrap()),
        write_foreign_ref(dialect, column)
    );
    Statement::safe(sql)
}

fn alter_table_statements(dialect: &Dialect, table: &Table) -> Result<Vec<Statement>> {
    let table_name = table.name().unwrap();
    let mut statements = Vec::new();

    for col in table.columns.as_slice() {
        match classify_column(col) {
            Classify::Add => {
                let sql = format!(
                    "ALTER TABLE {} ADD COLUMN {};",
                    quote_ident(dialect, table_name),
                    write_column_body(dialect, col)
                );
                statements.push(Statement::safe(sql));
            }
            Classify::Drop => {
                let old = col.old_name().unwrap();
                let sql = if col.flags.contains(ColumnFlag::Foreign) {
                    format!(
                        "ALTER TABLE {} DROP FOREIGN KEY {};",
                        quote_ident(dialect, table_name),
                        quote_ident(dialect, old)
                    )
                } else if col.flags.contains(ColumnFlag::Constraint) {
                    format!(
                        "ALTER TABLE {} DROP CONSTRAINT {};",
                        quote_ident(dialect, table_name),
                        quote_ident(dialect, old)
                    )
                } else {
                    format!(
                        "ALTER TABLE {} DROP COLUMN {};",
                        quote_ident(dialect, table_name),
                        quote_ident(dialect, old)
                    )
                };
                statements.push(Statement::destructive(sql));
            }
            Classify::Rename => {
                let old = col.old_name().unwrap();
                let new = col.name().unwrap();
                let sql = format!(
                    "ALTER TABLE {} RENAME COLUMN {} TO {};",
                    quote_ident(dialect, table_name),
                    quote_ident(dialect, old),
                    quote_ident(dialect, new)
                );
                statements.push(Statement::safe(sql));
            }
            Classify::Alter => {
                if dialect.use_alter {
                    let sql = format!(
                        "ALTER TABLE {} ALTER COLUMN {} TYPE {};",
                        quote_ident(dialect, table_name),
                        quote_ident(dialect, col.name().unwrap()),
                        crate::render::write_column_type(dialect, col)
                    );
                    statements.push(Statement::safe(sql));
                } else if dialect.use_modify {
                    let sql = format!(
                        "ALTER TABLE {} MODIFY COLUMN {};",
                        quote_ident(dialect, table_name),
                        write_column_body(dialect, col)
                    );
                    statements.push(Statement::safe(sql));
                } else {
                    return Err(Error::NotSupported(format!(
                        "dialect cannot alter column `{}`",
                        col.name().unwrap()
                    )));
                }
            }
        }
    }
    Ok(statements)
}
