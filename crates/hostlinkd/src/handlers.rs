//! Built-in commands available on every server.

use serde_json::{Map, Value, json};

use crate::registry::{CommandContext, CommandHandler, HandlerRegistry, HandlerResult};

/// Liveness check. Always answers `{"pong": true}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PingHandler;

impl CommandHandler for PingHandler {
    fn name(&self) -> &str {
        "ping"
    }

    fn handle(&self, _params: &Map<String, Value>, _context: &CommandContext) -> HandlerResult {
        Ok(json!({"pong": true}))
    }
}

/// Returns its parameters unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoHandler;

impl CommandHandler for EchoHandler {
    fn name(&self) -> &str {
        "echo"
    }

    fn handle(&self, params: &Map<String, Value>, _context: &CommandContext) -> HandlerResult {
        Ok(Value::Object(params.clone()))
    }
}

/// Registers `ping` and `echo`, subject to the registry's duplicate policy.
pub fn register_builtins(registry: &mut HandlerRegistry) {
    let _ = registry.register(PingHandler);
    let _ = registry.register(EchoHandler);
}
