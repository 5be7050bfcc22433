//! MeshSense Core - Board-agnostic application logic
//!
//! This crate contains the logic that runs on the application core, written
//! against the traits in `meshsense-hal` and `meshsense-display` so it can
//! be tested on the host.
//!
//! # Modules
//!
//! - [`wifi`] - WiFi mode model and its persistence
//! - [`network`] - Network collaborator trait and connection details
//! - [`status`] - Status screen trait used to report progress
//! - [`provisioning`] - Boot-time mode selection flow
//! - [`config`] - `board.toml` parsing

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod network;
pub mod provisioning;
pub mod status;
pub mod wifi;

#[cfg(test)]
mod testing;

pub use config::{parse_board_config, BoardConfig, ConfigError};
pub use network::{AccessPointConfig, ApInfo, ConnectionInfo, NetworkError, NetworkLink, PortalConfig};
pub use provisioning::{Outcome, Provisioner, ProvisioningConfig, Selection};
pub use status::StatusScreen;
pub use wifi::{ModeStore, WifiMode};
