use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};

use axum::{
    routing::{get, post},
    Extension, Router, Server,
};
use serde::Deserialize;
use slog::{info, Logger};

use delivery_engine::{Engine, MemoryGateway};

/// an error used when deserializing a [`Config`] instance from environment
/// variables, see [`Config::from_env()`]
pub use envy::Error as EnvError;

use crate::routes::{get_untargeted, post_request};

pub const DEFAULT_PORT: u16 = 8035;
pub const DEFAULT_IP_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0));

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// The port on which the delivery REST API will be accessible.
    #[serde(default = "default_port")]
    /// Defaults to `8035`: [`DEFAULT_PORT`]
    pub port: u16,
    /// The address on which the delivery REST API will be accessible.
    /// `0.0.0.0` can be used for Docker.
    /// `127.0.0.1` can be used for locally running servers.
    #[serde(default = "default_ip_addr")]
    /// Defaults to `0.0.0.0`: [`DEFAULT_IP_ADDR`]
    pub ip_addr: IpAddr,
}

impl Config {
    /// Deserialize the application [`Config`] from Environment variables.
    pub fn from_env() -> Result<Self, EnvError> {
        envy::from_env()
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_ip_addr() -> IpAddr {
    DEFAULT_IP_ADDR
}

/// The shared state of the application
pub struct State {
    pub engine: Engine<MemoryGateway>,
    pub logger: Logger,
}

pub struct Application {
    state: Arc<State>,
    config: Config,
}

impl Application {
    pub fn new(engine: Engine<MemoryGateway>, logger: Logger, config: Config) -> Self {
        Self {
            state: Arc::new(State { engine, logger }),
            config,
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let app = Router::new()
            .route("/request", post(post_request))
            .route("/request/untargeted", get(get_untargeted))
            .layer(Extension(self.state.clone()));

        let socket_addr = SocketAddr::new(self.config.ip_addr, self.config.port);
        info!(self.state.logger, "Server running"; "addr" => %socket_addr);

        Server::bind(&socket_addr)
            .serve(app.into_make_service())
            .await?;

        Ok(())
    }
}
