//! Build script for meshsense-firmware
//!
//! - Passes the esp-hal and defmt linker scripts
//! - Validates board.toml at compile time

use std::env;
use std::fs;
use std::path::Path;

fn main() {
    setup_linker();
    validate_config();
}

/// Link against the esp-hal memory layout (and defmt's section script)
fn setup_linker() {
    println!("cargo:rustc-link-arg=-Tlinkall.x");

    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=MESHSENSE_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=MESHSENSE_WIFI_PASSWORD");
}

/// Validate board.toml configuration at compile time
fn validate_config() {
    // Re-run if board.toml changes
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a board.toml configuration file.            ║\n\
            ║  Please create one in the meshsense-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_networks(&config, &mut errors);
    validate_provisioning(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board.toml                                       ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=board.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            // Width is counted in chars, matching the `{:<64}` padding
            let truncated = if line.chars().count() > 64 {
                let head: String = line.chars().take(61).collect();
                format!("{}...", head)
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only the sections the firmware parser knows are allowed
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        errors.push("board.toml must be a table".to_string());
        return;
    };

    for (name, value) in table {
        if !["display", "portal", "access_point", "provisioning"].contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(display) = config.get("display").and_then(|d| d.as_table()) else {
        return;
    };

    for key in ["width", "height"] {
        if let Some(value) = display.get(key) {
            match value.as_integer() {
                Some(v) if (1..=320).contains(&v) => {}
                _ => errors.push(format!("[display] {} must be 1-320", key)),
            }
        }
    }

    if let Some(value) = display.get("rotation") {
        match value.as_integer() {
            Some(v) if (0..=3).contains(&v) => {}
            _ => errors.push("[display] rotation must be 0-3".to_string()),
        }
    }

    if let Some(value) = display.get("submit_policy") {
        if !matches!(value.as_str(), Some("block" | "timeout" | "no_wait")) {
            errors.push("[display] submit_policy must be 'block', 'timeout' or 'no_wait'".into());
        }
    }

    if let Some(value) = display.get("render_mode") {
        if !matches!(value.as_str(), Some("poll" | "wait")) {
            errors.push("[display] render_mode must be 'poll' or 'wait'".to_string());
        }
    }

    if let Some(value) = display.get("poll_interval_ms") {
        match value.as_integer() {
            Some(v) if v > 0 => {}
            _ => errors.push("[display] poll_interval_ms must be positive".to_string()),
        }
    }
}

fn validate_networks(config: &toml::Value, errors: &mut Vec<String>) {
    for section in ["portal", "access_point"] {
        let Some(table) = config.get(section).and_then(|s| s.as_table()) else {
            continue;
        };

        if let Some(ssid) = table.get("ssid") {
            match ssid.as_str() {
                Some(s) if !s.is_empty() && s.len() <= 32 => {}
                _ => errors.push(format!("[{}] ssid must be 1-32 bytes", section)),
            }
        }

        if let Some(password) = table.get("password") {
            match password.as_str() {
                Some(p) if p.len() <= 64 => {
                    if section == "access_point" && p.len() < 8 {
                        errors.push("[access_point] password needs at least 8 characters".into());
                    }
                }
                _ => errors.push(format!("[{}] password must be at most 64 bytes", section)),
            }
        }
    }

    if let Some(timeout) = config.get("portal").and_then(|p| p.get("timeout_s")) {
        match timeout.as_integer() {
            Some(v) if (0..=65535).contains(&v) => {}
            _ => errors.push("[portal] timeout_s must be 0-65535".to_string()),
        }
    }
}

fn validate_provisioning(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.get("provisioning").and_then(|p| p.as_table()) else {
        return;
    };

    for (key, value) in table {
        let limit = if key == "reconnect_attempts" {
            i64::from(u8::MAX)
        } else {
            i64::from(u32::MAX)
        };
        match value.as_integer() {
            Some(v) if (0..=limit).contains(&v) => {}
            _ => errors.push(format!("[provisioning] {} must be 0-{}", key, limit)),
        }
    }
}
