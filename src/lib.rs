//! Schema modeling and migration-diff engine for embedded SQL databases.
//!
//! Build up a [`schema::Schema`] from application-declared tables and
//! columns, fold successive migration steps into it with
//! [`schema::Schema::accumulate`], and turn a step into a SQL statement
//! stream with [`plan::plan`]. [`trace`] keeps foreign keys pointed at the
//! right name across renames; [`dialect`] and [`render`] carry the
//! vendor-specific parts of SQL generation.

pub mod accumulate;
pub mod codec;
pub mod column;
pub mod dialect;
pub mod driver;
pub mod entry;
pub mod error;
pub mod ident;
pub mod plan;
pub mod render;
pub mod schema;
pub mod table;
pub mod trace;
pub mod value;

pub use column::Column;
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use schema::{Schema, SchemaVersion};
pub use table::Table;
