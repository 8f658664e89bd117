//! Rendering of handler panic payloads.

use std::any::Any;
use std::fmt;

/// Formats a panic payload as text.
///
/// `String` and `&'static str` payloads print as-is; anything else falls
/// back to its `Debug` form.
pub(crate) struct PanicMessage(Box<dyn Any + Send>);

impl PanicMessage {
    pub(crate) fn new(payload: Box<dyn Any + Send>) -> Self {
        Self(payload)
    }
}

impl fmt::Display for PanicMessage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = self.0.downcast_ref::<String>() {
            formatter.write_str(message)
        } else if let Some(message) = self.0.downcast_ref::<&'static str>() {
            formatter.write_str(message)
        } else {
            write!(formatter, "{:?}", self.0)
        }
    }
}
