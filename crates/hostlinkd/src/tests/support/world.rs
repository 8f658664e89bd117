//! BDD test world: a manually ticked server, one client and the responses it saw.

use std::net::TcpListener;
use std::time::Duration;

use hostlink_config::Config;
use hostlink_protocol::Response;
use serde_json::json;

use crate::handlers::register_builtins;
use crate::registry::{HandlerRegistry, command_fn};
use crate::server::{Server, ServerError};

use super::client::TestClient;
use super::config_loader::ephemeral_config;

/// Failure message produced by commands registered as failing.
pub const FAILURE_MESSAGE: &str = "deliberate failure";

/// Scenario world shared across BDD steps.
pub struct ServerWorld {
    config: Config,
    server: Server,
    client: Option<TestClient>,
    pub responses: Vec<Response>,
    pub start_error: Option<ServerError>,
    contender: Option<Server>,
    blocker: Option<TcpListener>,
}

impl ServerWorld {
    #[must_use]
    pub fn new() -> Self {
        let config = Config {
            client_timeout_seconds: 1.0,
            receive_buffer_size: 256,
            ..ephemeral_config()
        };
        let mut registry = HandlerRegistry::new();
        register_builtins(&mut registry);
        Self {
            server: Server::with_registry(config.clone(), registry),
            config,
            client: None,
            responses: Vec::new(),
            start_error: None,
            contender: None,
            blocker: None,
        }
    }

    pub fn start(&mut self) {
        self.server.start().expect("server should start");
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub fn register_constant(&mut self, name: &str, value: i64) {
        let _ = self
            .server
            .register_handler(command_fn(name, move |_params, _context| Ok(json!(value))));
    }

    pub fn register_failing(&mut self, name: &str) {
        let _ = self.server.register_handler(command_fn(name, |_params, _context| {
            Err(FAILURE_MESSAGE.into())
        }));
    }

    pub fn connect(&mut self) {
        self.client = Some(TestClient::connect(&mut self.server));
    }

    fn client(&mut self) -> (&mut TestClient, &mut Server) {
        let client = self.client.as_mut().expect("client should be connected");
        (client, &mut self.server)
    }

    /// Sends one frame and records the response.
    pub fn request(&mut self, frame: &[u8]) {
        let (client, server) = self.client();
        let response = client.request(server, frame);
        self.responses.push(response);
    }

    /// Sends raw bytes and records `count` responses.
    pub fn send_expecting(&mut self, bytes: &[u8], count: usize) {
        let (client, server) = self.client();
        client.send(bytes);
        let responses: Vec<_> = (0..count).map(|_| client.receive(server)).collect();
        self.responses.extend(responses);
    }

    /// Sends raw bytes without waiting for a reply.
    pub fn send_raw(&mut self, bytes: &[u8]) {
        let (client, _) = self.client();
        client.send(bytes);
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.server.tick(elapsed).expect("tick should succeed");
    }

    pub fn client_disconnected(&mut self) -> bool {
        let (client, server) = self.client();
        client.wait_closed(server)
    }

    /// Binds a plain listener on a free port and points a second server at it.
    pub fn occupy_port_and_start_contender(&mut self) {
        let blocker = TcpListener::bind(("127.0.0.1", 0)).expect("bind blocker");
        let port = blocker.local_addr().expect("blocker address").port();
        let mut contender = Server::new(Config {
            port,
            ..self.config.clone()
        });
        self.start_error = contender.start().err();
        self.contender = Some(contender);
        self.blocker = Some(blocker);
    }

    pub fn contender_running(&self) -> bool {
        self.contender.as_ref().is_some_and(Server::is_running)
    }

    #[must_use]
    pub fn last_response(&self) -> &Response {
        self.responses.last().expect("a response should be recorded")
    }
}
