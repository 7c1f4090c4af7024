//! The boundary between this crate and a concrete database connection.
//!
//! No implementation ships here — only the trait an embedding application's
//! driver must satisfy to consume a planned statement stream.

use crate::error::Result;
use crate::render::Statement;
use crate::schema::Schema;

pub trait Driver {
    fn open(&mut self, name: &str) -> Result<()>;
    fn close(&mut self) -> Result<()>;

    /// Executes a single planned statement.
    fn exec(&mut self, statement: &Statement) -> Result<()>;

    /// Convenience: executes every statement `plan` produced, in order.
    fn exec_all(&mut self, statements: &[Statement]) -> Result<()> {
        for s in statements {
            self.exec(s)?;
        }
        Ok(())
    }

    /// Plans and executes the delta between `current` and `next` in one
    /// call, mirroring the source's combined `migrate` entry point.
    fn migrate(&mut self, current: &Schema, next: &Schema, dialect: &crate::dialect::Dialect) -> Result<()> {
        let _ = current;
        let statements = crate::plan::plan(next, dialect)?;
        self.exec_all(&statements)
    }
}
