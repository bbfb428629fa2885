//! Common test utilities, fixtures, and mocks
//! This module contains shared functionality used across different test categories

pub mod fixtures;
pub mod mocks;

use std::sync::{Arc, Once};
use std::time::Duration;

use cadence::Data;
use cadence::commands;
use cadence::player::{NodeClient, Player};
use cadence::registry::{Registry, RegistryOptions};
use tracing::Level;
use wiremock::MockServer;

static INIT: Once = Once::new();

/// Initialize tracing once for the whole test binary
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .init();
    });
}

/// A registry with the full command catalog and a player pointed at `server`
pub async fn registry_for(server: &MockServer) -> Arc<Registry> {
    init();

    let node = NodeClient::new(
        server.uri().parse().expect("mock server uri"),
        fixtures::NODE_PASSWORD,
        fixtures::SESSION_ID,
        Duration::from_secs(5),
    )
    .expect("node client");

    let data = Arc::new(Data::new());
    data.player.install(Player::new(node));

    let registry = Arc::new(Registry::new(
        RegistryOptions::new("!", Duration::from_secs(10)),
        data,
    ));
    for command in commands::all() {
        registry.add(command).await;
    }
    registry
}
