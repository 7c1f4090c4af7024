//! Low-level SQL fragment rendering: column bodies, constraints, foreign
//! key references. [`crate::plan`] sequences these into full statements.

use crate::column::{Column, ColumnFlag, ForeignAction};
use crate::dialect::Dialect;
use crate::ident::Named;
use crate::value::ValueKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Destructive,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub safety: Safety,
}

impl Statement {
    pub fn safe(sql: impl Into<String>) -> Self {
        Statement {
            sql: sql.into(),
            safety: Safety::Safe,
        }
    }

    pub fn destructive(sql: impl Into<String>) -> Self {
        Statement {
            sql: sql.into(),
            safety: Safety::Destructive,
        }
    }
}

pub fn quote_ident(dialect: &Dialect, ident: &str) -> String {
    dialect.quote_ident(ident)
}

pub fn write_column_type(dialect: &Dialect, column: &Column) -> String {
    match column.kind {
        ValueKind::Bool => {
            if dialect.has_boolean {
                "BOOLEAN".to_string()
            } else {
                "TINYINT(1)".to_string()
            }
        }
        ValueKind::Int => match column.size {
            Some(sz) => format!("INT({sz})"),
            None => "INT".to_string(),
        },
        ValueKind::Uint => match column.size {
            Some(sz) => format!("INT({sz}) UNSIGNED"),
            None => "INT UNSIGNED".to_string(),
        },
        ValueKind::Int64 => "BIGINT".to_string(),
        ValueKind::Uint64 => "BIGINT UNSIGNED".to_string(),
        ValueKind::Double => match (column.size, column.precision) {
            (Some(p), Some(s)) => format!("DOUBLE({p},{s})"),
            _ => "DOUBLE".to_string(),
        },
        ValueKind::Timestamp => "TIMESTAMP".to_string(),
        ValueKind::String => {
            let size = column.size.unwrap_or(dialect.default_string_size);
            format!("VARCHAR({size})")
        }
        ValueKind::Object => "TEXT".to_string(),
        ValueKind::PointerArray => "TEXT".to_string(),
    }
}

/// Full column body used in both `CREATE TABLE` and `ADD COLUMN`:
/// `"name" TYPE [AUTOINCREMENT] [NOT NULL] [DEFAULT x] [ON UPDATE CURRENT_TIMESTAMP] [raw]`.
pub fn write_column_body(dialect: &Dialect, column: &Column) -> String {
    let mut out = String::new();
    out.push_str(&quote_ident(dialect, column.name().unwrap_or_default()));
    out.push(' ');
    out.push_str(&write_column_type(dialect, column));

    if column.flags.contains(ColumnFlag::Autoincrement) {
        if let Some(keyword) = dialect.autoincrement_keyword {
            out.push(' ');
            out.push_str(keyword);
        }
    }
    if !column.flags.contains(ColumnFlag::Nullable) {
        out.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        out.push_str(" DEFAULT ");
        out.push_str(&default.to_string());
    } else if column.flags.contains(ColumnFlag::Current) {
        out.push_str(" DEFAULT CURRENT_TIMESTAMP");
    }
    if column.flags.contains(ColumnFlag::CurrentOnUpdate) {
        out.push_str(" ON UPDATE CURRENT_TIMESTAMP");
    }
    if let Some(raw) = &column.raw {
        out.push(' ');
        out.push_str(raw);
    }
    out
}

pub fn write_composite_list(dialect: &Dialect, names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| quote_ident(dialect, n)).collect();
    format!("({})", quoted.join(", "))
}

fn action_sql(action: &ForeignAction) -> &'static str {
    match action {
        ForeignAction::NoAction => "NO ACTION",
        ForeignAction::Cascade => "CASCADE",
        ForeignAction::SetNull => "SET NULL",
        ForeignAction::Restrict => "RESTRICT",
    }
}

/// `REFERENCES "table"("column") [ON DELETE ...] [ON UPDATE ...]`.
pub fn write_foreign_ref(dialect: &Dialect, column: &Column) -> String {
    let Some(fk) = &column.foreign else {
        return String::new();
    };
    let mut out = format!(
        "REFERENCES {}({})",
        quote_ident(dialect, &fk.table),
        quote_ident(dialect, &fk.column)
    );
    if fk.on_delete != ForeignAction::NoAction {
        out.push_str(" ON DELETE ");
        out.push_str(action_sql(&fk.on_delete));
    }
    if fk.on_update != ForeignAction::NoAction {
        out.push_str(" ON UPDATE ");
        out.push_str(action_sql(&fk.on_update));
    }
    out
}

/// Inline `CONSTRAINT "name" PRIMARY KEY/UNIQUE/FOREIGN KEY (...)` clause
/// for a composite/constraint column.
pub fn write_constraint(dialect: &Dialect, column: &Column) -> String {
    let name = column.name().unwrap_or_default();
    let cols = if column.composite.is_empty() {
        vec![name.to_string()]
    } else {
        column.composite.clone()
    };
    let list = write_composite_list(dialect, &cols);

    if column.flags.contains(ColumnFlag::Foreign) {
        format!(
            "CONSTRAINT {} FOREIGN KEY {} {}",
            quote_ident(dialect, name),
            list,
            write_foreign_ref(dialect, column)
        )
    } else if column.flags.contains(ColumnFlag::Primary) {
        format!("CONSTRAINT {} PRIMARY KEY {}", quote_ident(dialect, name), list)
    } else if column.flags.contains(ColumnFlag::Unique) {
        format!("CONSTRAINT {} UNIQUE {}", quote_ident(dialect, name), list)
    } else {
        format!("CONSTRAINT {} CHECK (TRUE) /* {} */", quote_ident(dialect, name), list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::value::Value;

    #[test]
    fn bool_type_falls_back_to_tinyint_on_mysql() {
        let c = Column::new("active", ValueKind::Bool);
        assert_eq!(write_column_type(&Dialect::mysql(), &c), "TINYINT(1)");
        assert_eq!(write_column_type(&Dialect::postgres(), &c), "BOOLEAN");
    }

    #[test]
    fn string_uses_dialect_default_size() {
        let c = Column::new("name", ValueKind::String);
        assert_eq!(write_column_type(&Dialect::postgres(), &c), "VARCHAR(191)");
    }

    #[test]
    fn column_body_includes_default_and_not_null() {
        let mut c = Column::new("active", ValueKind::Bool);
        c.default_value(Value::Bool(true));
        let body = write_column_body(&Dialect::postgres(), &c);
        assert_eq!(body, "\"active\" BOOLEAN NOT NULL DEFAULT TRUE");
    }

    #[test]
    fn nullable_column_omits_not_null() {
        let mut c = Column::new("bio", ValueKind::String);
        c.nullable();
        let body = write_column_body(&Dialect::postgres(), &c);
        assert!(!body.contains("NOT NULL"));
    }

    #[test]
    fn foreign_ref_includes_on_delete() {
        let mut c = Column::new("author_id", ValueKind::Int64);
        c.references("users", "id").on_delete(ForeignAction::Cascade);
        assert_eq!(
            write_foreign_ref(&Dialect::postgres(), &c),
            "REFERENCES \"users\"(\"id\") ON DELETE CASCADE"
        );
    }

    #[test]
    fn autoincrement_keyword_differs_by_dialect() {
        let mut c = Column::new("id", ValueKind::Int64);
        c.autoincrement();
        assert!(write_column_body(&Dialect::sqlite(), &c).contains("AUTOINCREMENT"));
        assert!(write_column_body(&Dialect::mysql(), &c).contains("AUTO_INCREMENT"));
        assert!(!write_column_body(&Dialect::postgres(), &c).contains("AUTO"));
    }

    #[test]
    fn current_modifiers_render_as_timestamp_clauses() {
        let mut c = Column::new("updated_at", ValueKind::Timestamp);
        c.current().current_on_update();
        let body = write_column_body(&Dialect::postgres(), &c);
        assert_eq!(
            body,
            "\"updated_at\" TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn explicit_default_overrides_current_clause() {
        let mut c = Column::new("created_at", ValueKind::Timestamp);
        c.current().default_value(Value::Raw("'2000-01-01'".to_string()));
        let body = write_column_body(&Dialect::postgres(), &c);
        assert!(body.contains("DEFAULT '2000-01-01'"));
        assert!(!body.contains("CURRENT_TIMESTAMP"));
    }
}
