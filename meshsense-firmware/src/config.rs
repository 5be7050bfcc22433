//! Board configuration loading
//!
//! `board.toml` is compiled into the image and already validated by
//! `build.rs`, so a parse failure here means the two parsers disagree.
//! The firmware then falls back to the built-in defaults.

use defmt::*;
use meshsense_core::{parse_board_config, BoardConfig};

/// Embedded board configuration (edit board.toml and rebuild to customize)
const EMBEDDED_CONFIG: &str = include_str!("../board.toml");

pub fn load_board_config() -> BoardConfig {
    match parse_board_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Board config: {}", config.display);
            config
        }
        Err(e) => {
            warn!("board.toml rejected ({}), using defaults", e);
            BoardConfig::default()
        }
    }
}
