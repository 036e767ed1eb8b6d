//! Handler chain: executors, the middleware that wraps them and a stack that
//! composes both
//!
//! A [`Handler`] is anything that can execute a [`Command`]. Closures of the
//! form `Fn(&mut Command) -> Result<T>` are handlers already. A
//! [`Middleware`] turns one handler into another of the same output type,
//! which is how the validation gate is interposed in front of a transport.

use crate::command::Command;
use crate::error::Result;
use crate::gate::ValidationGate;

/// Executes a command
pub trait Handler {
    type Output;

    fn handle(&self, command: &mut Command) -> Result<Self::Output>;
}

impl<F, T> Handler for F
where
    F: Fn(&mut Command) -> Result<T>,
{
    type Output = T;

    fn handle(&self, command: &mut Command) -> Result<T> {
        self(command)
    }
}

/// Wraps an inner handler, producing a handler with the same output
pub trait Middleware<H: Handler> {
    type Wrapped: Handler<Output = H::Output>;

    fn wrap(&self, inner: H) -> Self::Wrapped;
}

/// Type-erased handler as produced by [`HandlerStack::resolve`]
pub type DynHandler<T> = Box<dyn Fn(&mut Command) -> Result<T> + Send + Sync>;

type Layer<T> = Box<dyn FnOnce(DynHandler<T>) -> DynHandler<T> + Send>;

/// Ordered middleware layers over a terminal handler.
///
/// Layers are applied in push order, so the last layer pushed is the
/// outermost and sees the command first.
pub struct HandlerStack<T> {
    terminal: DynHandler<T>,
    layers: Vec<Layer<T>>,
}

impl<T: 'static> HandlerStack<T> {
    /// Create a stack whose innermost stage is `terminal`
    pub fn new<H>(terminal: H) -> Self
    where
        H: Handler<Output = T> + Send + Sync + 'static,
    {
        Self {
            terminal: erase(terminal),
            layers: Vec::new(),
        }
    }

    /// Add an outer layer
    pub fn push<M>(&mut self, middleware: M) -> &mut Self
    where
        M: Middleware<DynHandler<T>> + Send + 'static,
        M::Wrapped: Send + Sync + 'static,
    {
        self.layers
            .push(Box::new(move |inner: DynHandler<T>| erase(middleware.wrap(inner))));
        self
    }

    /// Add a validation gate as the next outer layer
    pub fn push_validation(&mut self, gate: ValidationGate) -> &mut Self {
        self.push(gate)
    }

    /// Number of middleware layers, excluding the terminal handler
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Compose every layer around the terminal handler
    pub fn resolve(self) -> DynHandler<T> {
        self.layers
            .into_iter()
            .fold(self.terminal, |inner, layer| layer(inner))
    }
}

impl<T> std::fmt::Debug for HandlerStack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerStack")
            .field("layers", &self.layers.len())
            .finish_non_exhaustive()
    }
}

fn erase<H>(handler: H) -> DynHandler<H::Output>
where
    H: Handler + Send + Sync + 'static,
{
    Box::new(move |command: &mut Command| handler.handle(command))
}
