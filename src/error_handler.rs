//! Diagnostic collection policies and panic-safe probing.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use log::warn;

use crate::errors::ContractError;

/// Routes contract violations according to the caller's choice.
///
/// With a list, violations are appended and the run continues. Without one,
/// the first violation is returned as an `Err` and aborts the run.
#[derive(Debug)]
pub struct ErrorHandler<'a> {
    errors: Option<&'a mut Vec<String>>,
    initial_count: usize,
}

impl<'a> ErrorHandler<'a> {
    pub fn new(errors: Option<&'a mut Vec<String>>) -> Self {
        let initial_count = errors.as_ref().map_or(0, |list| list.len());
        Self { errors, initial_count }
    }

    pub fn fail_fast() -> Self {
        Self::new(None)
    }

    pub fn is_collecting(&self) -> bool {
        self.errors.is_some()
    }

    /// Records `error`, or returns it when failing fast or when it is misuse.
    pub fn handle(&mut self, error: ContractError) -> Result<(), ContractError> {
        if error.is_misuse() {
            return Err(error);
        }
        warn!("{}", error);
        match self.errors.as_mut() {
            Some(list) => {
                list.push(error.to_string());
                Ok(())
            }
            None => Err(error),
        }
    }

    /// Number of violations recorded through this handler.
    pub fn recorded(&self) -> usize {
        self.errors.as_ref().map_or(0, |list| list.len().saturating_sub(self.initial_count))
    }

    /// True when no violation has been recorded.
    pub fn succeeded(&self) -> bool {
        self.recorded() == 0
    }

    pub fn finish(self) -> bool {
        self.succeeded()
    }
}

/// Runs a boolean probe; a panic counts as `false`.
pub fn safe_call<F: FnOnce() -> bool>(probe: F) -> bool {
    catch_unwind(AssertUnwindSafe(probe)).unwrap_or(false)
}

/// Runs `f`, turning a panic into its message.
pub fn catch_panic<R, F: FnOnce() -> R>(f: F) -> Result<R, String> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(&*payload))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
