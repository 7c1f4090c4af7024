//! The boundary between columns and an application's in-memory record
//! fields. No concrete codec ships here; implementations live with the
//! embedding application's record types.

use crate::error::{Error, Result};
use crate::value::Value;
use std::any::Any;

pub trait ValueCodec {
    /// Parses `raw` into `dst`, which the caller has already downcast to
    /// the field's expected Rust type.
    fn parse_into(&self, dst: &mut dyn Any, raw: &Value) -> Result<()>;

    /// Reads a field back out as a [`Value`] suitable for SQL text or
    /// parameter binding.
    fn write_from(&self, src: &dyn Any) -> Value;
}

/// A codec that rejects everything; useful as a placeholder where a real
/// codec hasn't been wired up yet.
pub struct NullCodec;

impl ValueCodec for NullCodec {
    fn parse_into(&self, _dst: &mut dyn Any, _raw: &Value) -> Result<()> {
        Err(Error::TypeNotMatch("no codec configured".to_string()))
    }

    fn write_from(&self, _src: &dyn Any) -> Value {
        Value::Null
    }
}
