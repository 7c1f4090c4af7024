//! Vendor capability descriptor consulted by the planner and renderer.

/// Which SQL product a [`Dialect`] targets. Purely informational beyond
/// selecting a set of defaults; every actual behavior difference is driven
/// by the capability flags below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    Unknown,
    Sqlite,
    Mysql,
    Postgres,
}

/// A builder for assembling a custom dialect field by field, for targets
/// not covered by the three built-ins.
#[derive(Debug, Clone)]
pub struct DialectBuilder {
    dialect: Dialect,
}

impl DialectBuilder {
    pub fn new(product: Product) -> Self {
        DialectBuilder {
            dialect: Dialect {
                product,
                use_alter: false,
                use_modify: false,
                has_boolean: true,
                supports_inline_forward_fk: true,
                rename_table_syntax: RenameTableSyntax::AlterTableRenameTo,
                quote: '"',
                default_string_size: 191,
                autoincrement_keyword: None,
            },
        }
    }

    pub fn use_alter(mut self, v: bool) -> Self {
        self.dialect.use_alter = v;
        self
    }

    pub fn use_modify(mut self, v: bool) -> Self {
        self.dialect.use_modify = v;
        self
    }

    pub fn has_boolean(mut self, v: bool) -> Self {
        self.dialect.has_boolean = v;
        self
    }

    pub fn supports_inline_forward_fk(mut self, v: bool) -> Self {
        self.dialect.supports_inline_forward_fk = v;
        self
    }

    pub fn rename_table_syntax(mut self, v: RenameTableSyntax) -> Self {
        self.dialect.rename_table_syntax = v;
        self
    }

    pub fn quote(mut self, c: char) -> Self {
        self.dialect.quote = c;
        self
    }

    pub fn autoincrement_keyword(mut self, v: Option<&'static str>) -> Self {
        self.dialect.autoincrement_keyword = v;
        self
    }

    pub fn build(self) -> Dialect {
        self.dialect
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameTableSyntax {
    /// `ALTER TABLE old RENAME TO new` (SQLite, PostgreSQL).
    AlterTableRenameTo,
    /// `RENAME TABLE old TO new` (MySQL).
    RenameTable,
}

/// Resolved, always-valid capability set for a SQL product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dialect {
    pub product: Product,
    /// Engine accepts `ALTER TABLE t ALTER COLUMN c ...`.
    pub use_alter: bool,
    /// Engine accepts `ALTER TABLE t MODIFY COLUMN c ...`.
    pub use_modify: bool,
    pub has_boolean: bool,
    /// Whether CREATE TABLE may reference a table not yet created.
    pub supports_inline_forward_fk: bool,
    pub rename_table_syntax: RenameTableSyntax,
    pub quote: char,
    pub default_string_size: u32,
    /// Keyword appended after an autoincrementing column's type, if the
    /// engine has one (`AUTOINCREMENT`, `AUTO_INCREMENT`). `None` for
    /// engines (PostgreSQL) that express it through the column type itself
    /// instead of a trailing keyword.
    pub autoincrement_keyword: Option<&'static str>,
}

impl Dialect {
    pub fn sqlite() -> Self {
        DialectBuilder::new(Product::Sqlite)
            .use_alter(false)
            .use_modify(false)
            .has_boolean(false)
            .supports_inline_forward_fk(false)
            .rename_table_syntax(RenameTableSyntax::AlterTableRenameTo)
            .autoincrement_keyword(Some("AUTOINCREMENT"))
            .build()
    }

    pub fn mysql() -> Self {
        DialectBuilder::new(Product::Mysql)
            .use_alter(false)
            .use_modify(true)
            .has_boolean(false)
            .supports_inline_forward_fk(true)
            .rename_table_syntax(RenameTableSyntax::RenameTable)
            .quote('`')
            .autoincrement_keyword(Some("AUTO_INCREMENT"))
            .build()
    }

    pub fn postgres() -> Self {
        DialectBuilder::new(Product::Postgres)
            .use_alter(true)
            .use_modify(false)
            .has_boolean(true)
            .supports_inline_forward_fk(true)
            .rename_table_syntax(RenameTableSyntax::AlterTableRenameTo)
            .autoincrement_keyword(None)
            .build()
    }

    pub fn quote_ident(&self, ident: &str) -> String {
        let q = self.quote;
        format!("{q}{}{q}", ident.replace(q, &format!("{q}{q}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_uses_modify_not_alter() {
        let d = Dialect::mysql();
        assert!(d.use_modify);
        assert!(!d.use_alter);
    }

    #[test]
    fn sqlite_lacks_alter_column_support_entirely() {
        let d = Dialect::sqlite();
        assert!(!d.use_alter && !d.use_modify);
    }

    #[test]
    fn mysql_quotes_with_backtick() {
        assert_eq!(Dialect::mysql().quote_ident("order"), "`order`");
        assert_eq!(Dialect::postgres().quote_ident("order"), "\"order\"");
    }

    #[test]
    fn only_sqlite_lacks_inline_forward_fk_support() {
        assert!(!Dialect::sqlite().supports_inline_forward_fk);
        assert!(Dialect::mysql().supports_inline_forward_fk);
        assert!(Dialect::postgres().supports_inline_forward_fk);
    }

    #[test]
    fn autoincrement_keyword_varies_by_product() {
        assert_eq!(Dialect::sqlite().autoincrement_keyword, Some("AUTOINCREMENT"));
        assert_eq!(Dialect::mysql().autoincrement_keyword, Some("AUTO_INCREMENT"));
        assert_eq!(Dialect::postgres().autoincrement_keyword, None);
    }
}
