//! Board configuration
//!
//! The firmware embeds `board.toml` and parses it at startup. This is a
//! minimal parser for the subset the file uses; it does NOT support
//! all of TOML.
//!
//! Supported:
//! - `[section]` headers
//! - `key = value` pairs with string and integer values
//! - Comments (`# ...`), including trailing ones
//!
//! Unknown keys are ignored so older firmware accepts newer files.
//!
//! ```toml
//! [display]
//! rotation = 3
//! render_mode = "wait"
//!
//! [access_point]
//! ssid = "MeshSense-Server"
//! password = "mesh1234"
//! ```

use embassy_time::Duration;
use heapless::String;
use meshsense_display::{DisplayConfig, RenderMode, Rotation, SubmitPolicy};

use crate::network::{AccessPointConfig, PortalConfig};
use crate::provisioning::ProvisioningConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// A line that is neither a header nor `key = value`
    InvalidLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String value does not fit its field
    ValueTooLong,
}

/// Everything the firmware reads from `board.toml`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardConfig {
    pub display: DisplayConfig,
    pub portal: PortalConfig,
    pub access_point: AccessPointConfig,
    pub provisioning: ProvisioningConfig,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Portal,
    AccessPoint,
    Provisioning,
}

/// Spellings of the display queue settings, resolved after parsing
#[derive(Default)]
struct QueueSettings {
    policy: Option<PolicyKind>,
    submit_timeout_ms: Option<u64>,
    render_mode: Option<ModeKind>,
    poll_interval_ms: Option<u64>,
}

#[derive(Clone, Copy)]
enum PolicyKind {
    Block,
    Timeout,
    NoWait,
}

#[derive(Clone, Copy)]
enum ModeKind {
    Poll,
    Wait,
}

/// Default submit timeout when `submit_policy = "timeout"` has no value
const DEFAULT_SUBMIT_TIMEOUT_MS: u64 = 250;

/// Parse `board.toml` contents, starting from the built-in defaults
pub fn parse_board_config(input: &str) -> Result<BoardConfig, ConfigError> {
    let mut config = BoardConfig::default();
    let mut queue = QueueSettings::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::InvalidLine)?;
        apply_value(section, key, value, &mut config, &mut queue)?;
    }

    resolve_queue(&queue, &mut config.display)?;
    Ok(config)
}

fn parse_section_header(line: &str) -> Result<Section, ConfigError> {
    let line = strip_comment(line);
    if !line.ends_with(']') {
        return Err(ConfigError::InvalidSection);
    }
    match line[1..line.len() - 1].trim() {
        "display" => Ok(Section::Display),
        "portal" => Ok(Section::Portal),
        "access_point" => Ok(Section::AccessPoint),
        "provisioning" => Ok(Section::Provisioning),
        _ => Err(ConfigError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut BoardConfig,
    queue: &mut QueueSettings,
) -> Result<(), ConfigError> {
    match section {
        Section::Display => {
            let d = &mut config.display;
            match key {
                "width" => d.width = parse_int(value)?,
                "height" => d.height = parse_int(value)?,
                "rotation" => {
                    let index: u8 = parse_int(value)?;
                    if index > 3 {
                        return Err(ConfigError::InvalidValue);
                    }
                    d.rotation = Rotation::from_index(index);
                }
                "submit_policy" => {
                    queue.policy = Some(match parse_string(value) {
                        "block" => PolicyKind::Block,
                        "timeout" => PolicyKind::Timeout,
                        "no_wait" => PolicyKind::NoWait,
                        _ => return Err(ConfigError::InvalidValue),
                    })
                }
                "submit_timeout_ms" => queue.submit_timeout_ms = Some(parse_int(value)?),
                "render_mode" => {
                    queue.render_mode = Some(match parse_string(value) {
                        "poll" => ModeKind::Poll,
                        "wait" => ModeKind::Wait,
                        _ => return Err(ConfigError::InvalidValue),
                    })
                }
                "poll_interval_ms" => queue.poll_interval_ms = Some(parse_int(value)?),
                _ => {} // Ignore unknown keys
            }
        }
        Section::Portal => {
            let p = &mut config.portal;
            match key {
                "ssid" => p.ssid = parse_bounded(value)?,
                "password" => p.password = parse_bounded(value)?,
                "timeout_s" => p.timeout_s = parse_int(value)?,
                _ => {}
            }
        }
        Section::AccessPoint => {
            let ap = &mut config.access_point;
            match key {
                "ssid" => ap.ssid = parse_bounded(value)?,
                "password" => {
                    let password: String<64> = parse_bounded(value)?;
                    // WPA2 needs at least 8 characters
                    if password.len() < 8 {
                        return Err(ConfigError::InvalidValue);
                    }
                    ap.password = password;
                }
                _ => {}
            }
        }
        Section::Provisioning => {
            let p = &mut config.provisioning;
            match key {
                "boot_pause_ms" => p.boot_pause_ms = parse_int(value)?,
                "reconnect_attempts" => p.reconnect_attempts = parse_int(value)?,
                "reconnect_interval_ms" => p.reconnect_interval_ms = parse_int(value)?,
                "failure_pause_ms" => p.failure_pause_ms = parse_int(value)?,
                "setup_notice_ms" => p.setup_notice_ms = parse_int(value)?,
                "settle_ms" => p.settle_ms = parse_int(value)?,
                "banner_ms" => p.banner_ms = parse_int(value)?,
                "restart_pause_ms" => p.restart_pause_ms = parse_int(value)?,
                "select_timeout_ms" => p.select_timeout_ms = parse_int(value)?,
                "button_poll_ms" => p.button_poll_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Root => {
            // No root-level keys
        }
    }

    Ok(())
}

fn resolve_queue(queue: &QueueSettings, display: &mut DisplayConfig) -> Result<(), ConfigError> {
    if let Some(policy) = queue.policy {
        display.submit_policy = match policy {
            PolicyKind::Block => SubmitPolicy::Block,
            PolicyKind::NoWait => SubmitPolicy::NoWait,
            PolicyKind::Timeout => SubmitPolicy::Timeout(Duration::from_millis(
                queue.submit_timeout_ms.unwrap_or(DEFAULT_SUBMIT_TIMEOUT_MS),
            )),
        };
    }

    if let Some(mode) = queue.render_mode {
        display.render_mode = match mode {
            ModeKind::Wait => RenderMode::WaitForSubmit,
            ModeKind::Poll => {
                let interval = queue.poll_interval_ms.unwrap_or(10);
                if interval == 0 {
                    return Err(ConfigError::InvalidValue);
                }
                RenderMode::Poll(Duration::from_millis(interval))
            }
        };
    }

    Ok(())
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Remove a trailing comment that is not inside a string
fn strip_comment(value: &str) -> &str {
    match value.find('#') {
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    }
}

fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

fn parse_bounded<const N: usize>(value: &str) -> Result<String<N>, ConfigError> {
    String::try_from(parse_string(value)).map_err(|_| ConfigError::ValueTooLong)
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BOARD_TOML: &str = r#"
# ESP32-S3 TFT Feather
[display]
width = 135
height = 240
rotation = 3          # landscape
submit_policy = "timeout"
submit_timeout_ms = 500
render_mode = "poll"
poll_interval_ms = 10

[portal]
ssid = "MeshSense-AP"
password = "password"
timeout_s = 180

[access_point]
ssid = "Mesh # Lab"
password = "mesh1234"

[provisioning]
select_timeout_ms = 5000
reconnect_attempts = 30
"#;

    #[test]
    fn test_parse_full_file() {
        let config = parse_board_config(BOARD_TOML).unwrap();
        assert_eq!(config.display.width, 135);
        assert_eq!(config.display.rotation, Rotation::Deg270);
        assert_eq!(
            config.display.submit_policy,
            SubmitPolicy::Timeout(Duration::from_millis(500))
        );
        assert_eq!(
            config.display.render_mode,
            RenderMode::Poll(Duration::from_millis(10))
        );
        assert_eq!(config.portal.ssid.as_str(), "MeshSense-AP");
        assert_eq!(config.portal.timeout_s, 180);
        // A '#' inside quotes is not a comment
        assert_eq!(config.access_point.ssid.as_str(), "Mesh # Lab");
        assert_eq!(config.provisioning.select_timeout_ms, 5000);
        assert_eq!(config.provisioning.reconnect_attempts, 30);
        // Untouched keys keep their defaults
        assert_eq!(config.provisioning.button_poll_ms, 100);
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_board_config("").unwrap(), BoardConfig::default());
        let defaults = BoardConfig::default();
        assert_eq!(defaults.display.render_mode, RenderMode::WaitForSubmit);
        assert_eq!(defaults.display.submit_policy, SubmitPolicy::Block);
        assert_eq!(defaults.access_point.password.as_str(), "mesh1234");
    }

    #[test]
    fn test_timeout_policy_default_duration() {
        let config = parse_board_config("[display]\nsubmit_policy = \"timeout\"\n").unwrap();
        assert_eq!(
            config.display.submit_policy,
            SubmitPolicy::Timeout(Duration::from_millis(DEFAULT_SUBMIT_TIMEOUT_MS))
        );
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert_eq!(
            parse_board_config("[stepper x]\nstep_pin = 3\n"),
            Err(ConfigError::InvalidSection)
        );
    }

    #[test]
    fn test_unknown_key_ignored() {
        let config = parse_board_config("[portal]\ncolor = \"teal\"\n").unwrap();
        assert_eq!(config.portal, PortalConfig::default());
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_board_config("[display]\nrotation = 7\n"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_board_config("[display]\nrender_mode = \"sometimes\"\n"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_board_config("[access_point]\npassword = \"short\"\n"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_board_config("[display]\nwidth = wide\n"),
            Err(ConfigError::InvalidValue)
        );
    }

    #[test]
    fn test_overlong_ssid() {
        let input = std::format!("[portal]\nssid = \"{}\"\n", "s".repeat(40));
        assert_eq!(parse_board_config(&input), Err(ConfigError::ValueTooLong));
    }

    #[test]
    fn test_garbage_line() {
        assert_eq!(
            parse_board_config("[display]\njust some words\n"),
            Err(ConfigError::InvalidLine)
        );
    }

    proptest! {
        #[test]
        fn prop_parser_never_panics(input in "(\\[?[a-z_ #=\"0-9]{0,20}\\]?\n){0,8}") {
            let _ = parse_board_config(&input);
        }
    }
}
