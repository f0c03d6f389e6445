use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3380;

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl ServerConfig {
    #[must_use]
    pub const fn new(listen: SocketAddr) -> Self {
        Self { listen }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
        }
    }
}
