//! Ordered handler chains.
//!
//! A [`HandlerChain`] is assembled once through [`HandlerChain::builder`] and
//! is immutable afterwards. Each traversal hands the same `&mut LogRecord` to
//! every handler in order, so enrichment done by an earlier handler is seen
//! by the later ones. The first failing handler ends the traversal and its
//! error is returned to the caller; handlers after it are not invoked.

use std::fmt;

use crate::error::{HandlerError, LograftError};
use crate::record::LogRecord;

/// A consumer of structured records.
///
/// Implementations must be shareable across worker threads. Any closure
/// `Fn(&mut LogRecord) -> Result<(), HandlerError>` is a handler.
pub trait Handler: Send + Sync {
    /// Process one record. Returning an error aborts the traversal.
    fn handle(&self, record: &mut LogRecord) -> Result<(), HandlerError>;

    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Push out anything the handler buffered. Called once input is exhausted.
    fn flush(&self) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl<F> Handler for F
where
    F: Fn(&mut LogRecord) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, record: &mut LogRecord) -> Result<(), HandlerError> {
        self(record)
    }
}

/// Attaches a display name to another handler (useful for closures).
pub struct Named<H> {
    name: String,
    inner: H,
}

impl<H: Handler> Named<H> {
    pub fn new(name: impl Into<String>, inner: H) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }
}

impl<H: Handler> Handler for Named<H> {
    fn handle(&self, record: &mut LogRecord) -> Result<(), HandlerError> {
        self.inner.handle(record)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn flush(&self) -> Result<(), HandlerError> {
        self.inner.flush()
    }
}

/// Progress of one traversal: `Pending → Running(i) → Complete | Failed(i)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Pending,
    Running(usize),
    Complete,
    Failed(usize),
}

impl Traversal {
    /// Advance after handler `index` returned. Terminal states never move.
    fn advance(self, index: usize, ok: bool, len: usize) -> Self {
        match self {
            Self::Pending | Self::Running(_) if !ok => Self::Failed(index),
            Self::Pending | Self::Running(_) if index + 1 == len => Self::Complete,
            Self::Pending | Self::Running(_) => Self::Running(index + 1),
            terminal => terminal,
        }
    }
}

/// An immutable, ordered sequence of handlers.
pub struct HandlerChain {
    handlers: Vec<Box<dyn Handler>>,
}

impl HandlerChain {
    pub fn builder() -> HandlerChainBuilder {
        HandlerChainBuilder::default()
    }

    /// Run every handler against `record`, in order.
    ///
    /// Fails with [`LograftError::Handler`] carrying the position and name
    /// of the first handler that failed.
    pub fn handle(&self, record: &mut LogRecord) -> Result<(), LograftError> {
        match self.traverse(record) {
            (_, Some(err)) => Err(err),
            (_, None) => Ok(()),
        }
    }

    /// Like [`handle`](Self::handle), also reporting where the traversal
    /// stopped.
    pub fn traverse(&self, record: &mut LogRecord) -> (Traversal, Option<LograftError>) {
        let len = self.handlers.len();
        if len == 0 {
            return (Traversal::Complete, None);
        }

        let mut state = Traversal::Pending;
        for (index, handler) in self.handlers.iter().enumerate() {
            tracing::trace!(?state, handler = handler.name(), "invoking handler");
            let result = handler.handle(record);
            state = state.advance(index, result.is_ok(), len);

            if let Err(source) = result {
                tracing::debug!(
                    index,
                    handler = handler.name(),
                    error = %source,
                    "handler failed, aborting chain"
                );
                let err = LograftError::Handler {
                    index,
                    handler: handler.name().to_string(),
                    source,
                };
                return (state, Some(err));
            }
        }

        (state, None)
    }

    /// Flush every handler in order, stopping at the first failure.
    pub fn flush(&self) -> Result<(), LograftError> {
        for (index, handler) in self.handlers.iter().enumerate() {
            handler.flush().map_err(|source| LograftError::Handler {
                index,
                handler: handler.name().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handler names in invocation order.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("handlers", &self.names())
            .finish()
    }
}

/// Collects handlers in invocation order.
#[derive(Default)]
pub struct HandlerChainBuilder {
    handlers: Vec<Box<dyn Handler>>,
}

impl HandlerChainBuilder {
    /// Append a handler; it runs after every handler added before it.
    #[must_use]
    pub fn with(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Append an already boxed handler.
    #[must_use]
    pub fn with_boxed(mut self, handler: Box<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn build(self) -> HandlerChain {
        HandlerChain {
            handlers: self.handlers,
        }
    }
}
