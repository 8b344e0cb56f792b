//! # Unit Isolation
//!
//! Shared by the validation and pricing pipelines. A unit invocation is
//! captured as `Result<T, String>` whether it returned an error or
//! panicked, so the executor loop always gets a value to act on.
//!
//! ```text
//!   for unit in units (sorted by order, stable):
//!       match run_isolated(|| unit.run(ctx)) {
//!           Ok(outcome)   → fold into result
//!           Err(message)  → record failure, keep going
//!       }
//! ```

use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

/// Runs one pipeline unit, converting both `Err` and panics into a
/// failure message.
///
/// Units only read their context and return fresh values, so no shared
/// state can be left half-updated by an unwinding unit.
pub(crate) fn run_isolated<T, E, F>(unit: F) -> Result<T, String>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    match panic::catch_unwind(AssertUnwindSafe(unit)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unit panicked".to_string()
    }
}
