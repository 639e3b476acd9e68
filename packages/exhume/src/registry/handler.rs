//! Registered callbacks and how they are invoked.

use crate::error::{ConversionError, HandlerError};
use crate::event::{EndOfElement, StartOfElement};
use crate::value::{FromElementValue, Value, ValueKind};

/// Return type of every handler callback.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Why an invocation failed.
#[derive(Debug)]
pub(crate) enum InvokeError {
    /// The element text did not convert to the handler's kind.
    Conversion(ConversionError),
    /// The callback itself failed.
    Handler(HandlerError),
}

impl From<ConversionError> for InvokeError {
    fn from(err: ConversionError) -> Self {
        InvokeError::Conversion(err)
    }
}

type StartFn<'h> = Box<dyn FnMut(&StartOfElement) -> HandlerResult + 'h>;
type EndFn<'h> = Box<dyn FnMut(&EndOfElement) -> Result<(), InvokeError> + 'h>;

/// Callback bound to element starts.
pub struct StartHandler<'h> {
    callback: StartFn<'h>,
}

impl<'h> StartHandler<'h> {
    pub(crate) fn new<F>(callback: F) -> Self
    where
        F: FnMut(&StartOfElement) -> HandlerResult + 'h,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    pub(crate) fn invoke(&mut self, event: &StartOfElement) -> Result<(), InvokeError> {
        (self.callback)(event).map_err(InvokeError::Handler)
    }
}

/// Callback bound to element ends, with its conversion resolved.
pub struct EndHandler<'h> {
    kind: Option<ValueKind>,
    callback: EndFn<'h>,
}

impl<'h> EndHandler<'h> {
    /// Handler receiving the whole event.
    pub(crate) fn element<F>(mut callback: F) -> Self
    where
        F: FnMut(&EndOfElement) -> HandlerResult + 'h,
    {
        Self {
            kind: None,
            callback: Box::new(move |event: &EndOfElement| {
                callback(event).map_err(InvokeError::Handler)
            }),
        }
    }

    /// Handler receiving the text converted to `T`.
    pub(crate) fn typed<T, F>(mut callback: F) -> Self
    where
        T: FromElementValue,
        F: FnMut(T) -> HandlerResult + 'h,
    {
        Self {
            kind: Some(T::KIND),
            callback: Box::new(move |event: &EndOfElement| {
                let value = T::from_element_text(event.value())?;
                callback(value).map_err(InvokeError::Handler)
            }),
        }
    }

    /// Handler receiving a [`Value`] of a kind chosen at runtime.
    pub(crate) fn dynamic<F>(kind: ValueKind, mut callback: F) -> Self
    where
        F: FnMut(Value) -> HandlerResult + 'h,
    {
        Self {
            kind: Some(kind),
            callback: Box::new(move |event: &EndOfElement| {
                let value = kind.convert(event.value())?;
                callback(value).map_err(InvokeError::Handler)
            }),
        }
    }

    /// The conversion applied before invocation, `None` for whole-event
    /// handlers.
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        self.kind
    }

    pub(crate) fn invoke(&mut self, event: &EndOfElement) -> Result<(), InvokeError> {
        (self.callback)(event)
    }
}

impl std::fmt::Debug for StartHandler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartHandler").finish_non_exhaustive()
    }
}

impl std::fmt::Debug for EndHandler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndHandler")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
