//! Command handler registry.
//!
//! Handlers are looked up by exact, case-sensitive command name. The
//! registry owns every handler it stores; the server consults it read-only
//! while a tick is dispatching.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;

use serde_json::{Map, Value};

/// Failure reported by a command handler.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// Outcome of a single handler invocation.
pub type HandlerResult = Result<Value, HandlerError>;

/// Per-request information made available to handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandContext {
    peer: SocketAddr,
}

impl CommandContext {
    /// Builds a context for a request received from `peer`.
    #[must_use]
    pub const fn new(peer: SocketAddr) -> Self {
        Self { peer }
    }

    /// Address of the client that sent the request.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }
}

/// A named command that turns request parameters into a result value.
pub trait CommandHandler: Send {
    /// Name clients use in the `command` field.
    fn name(&self) -> &str;

    /// Executes the command.
    ///
    /// # Errors
    ///
    /// Any error is reported to the client as an error response carrying
    /// the error's display text.
    fn handle(&self, params: &Map<String, Value>, context: &CommandContext) -> HandlerResult;
}

impl<H> CommandHandler for Box<H>
where
    H: CommandHandler + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn handle(&self, params: &Map<String, Value>, context: &CommandContext) -> HandlerResult {
        (**self).handle(params, context)
    }
}

/// Handler backed by a closure. Built by [`command_fn`].
pub struct FnCommand<F> {
    name: String,
    handler: F,
}

impl<F> fmt::Debug for FnCommand<F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FnCommand")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> CommandHandler for FnCommand<F>
where
    F: Fn(&Map<String, Value>, &CommandContext) -> HandlerResult + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, params: &Map<String, Value>, context: &CommandContext) -> HandlerResult {
        (self.handler)(params, context)
    }
}

/// Wraps a closure as a named command handler.
///
/// ```rust
/// use hostlinkd::{HandlerRegistry, command_fn};
/// use serde_json::json;
///
/// let mut registry = HandlerRegistry::new();
/// let _ = registry.register(command_fn("version", |_params, _context| {
///     Ok(json!({"version": "1.0"}))
/// }));
/// assert!(registry.contains("version"));
/// ```
pub fn command_fn<F>(name: impl Into<String>, handler: F) -> FnCommand<F>
where
    F: Fn(&Map<String, Value>, &CommandContext) -> HandlerResult + Send,
{
    FnCommand {
        name: name.into(),
        handler,
    }
}

/// What happens when a name is registered twice.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationPolicy {
    /// The newer handler replaces the existing one.
    #[default]
    Replace,
    /// The existing handler is kept and the newer one is discarded.
    KeepExisting,
}

/// Result of [`HandlerRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Registration {
    /// The name was not previously registered.
    Inserted,
    /// An existing handler was replaced.
    Replaced,
    /// The name was taken and the policy kept the existing handler.
    Rejected,
}

/// Mapping from command name to handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn CommandHandler>>,
    policy: RegistrationPolicy,
}

impl HandlerRegistry {
    /// Creates an empty registry that replaces duplicates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with an explicit duplicate policy.
    #[must_use]
    pub fn with_policy(policy: RegistrationPolicy) -> Self {
        Self {
            handlers: HashMap::new(),
            policy,
        }
    }

    /// Duplicate-name policy in effect.
    #[must_use]
    pub const fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    /// Registers `handler` under its own name.
    pub fn register<H>(&mut self, handler: H) -> Registration
    where
        H: CommandHandler + 'static,
    {
        self.register_boxed(Box::new(handler))
    }

    /// Registers an already boxed handler.
    pub fn register_boxed(&mut self, handler: Box<dyn CommandHandler>) -> Registration {
        let name = handler.name().to_owned();
        match (self.handlers.contains_key(&name), self.policy) {
            (false, _) => {
                self.handlers.insert(name, handler);
                Registration::Inserted
            }
            (true, RegistrationPolicy::Replace) => {
                self.handlers.insert(name, handler);
                Registration::Replaced
            }
            (true, RegistrationPolicy::KeepExisting) => Registration::Rejected,
        }
    }

    /// Removes and returns the handler registered under `name`.
    pub fn unregister(&mut self, name: &str) -> Option<Box<dyn CommandHandler>> {
        self.handlers.remove(name)
    }

    /// Looks up the handler for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn CommandHandler> {
        self.handlers.get(name).map(|handler| &**handler)
    }

    /// Returns `true` when `name` has a handler.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered command names in ascending order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HandlerRegistry")
            .field("commands", &self.names())
            .field("policy", &self.policy)
            .finish()
    }
}
