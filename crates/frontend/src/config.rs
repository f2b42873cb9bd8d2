use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DeskConfig {
    pub router: RouterConfig,
    pub history: HistoryConfig,
    pub layout: LayoutConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RouterConfig {
    /// Legacy first segment redirected to the modules page.
    pub legacy_module_alias: String,
    pub modules_route: String,
    pub home_page: String,
    pub title_capture_delay_ms: u32,
    pub settle_delay_ms: u32,
    pub settle_poll_ms: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HistoryConfig {
    pub persist_delay_ms: u32,
    /// First route segments never recorded in the persisted history.
    pub skip_routes: Vec<String>,
    pub persist_method: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LayoutConfig {
    pub default_tab_label: String,
    pub show_more_label: String,
    pub hide_details_label: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    pub last_route_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid desk configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Default configuration embedded in the bundle
const DEFAULT_CONFIG: &str = r#"
[router]
legacy_module_alias = "Module"
modules_route = "modules"
home_page = "home"
title_capture_delay_ms = 1000
settle_delay_ms = 100
settle_poll_ms = 50

[history]
persist_delay_ms = 10000
skip_routes = ["Form", "social", "setup-wizard", "recorder"]
persist_method = "frappe.desk.doctype.route_history.route_history.deferred_insert"

[layout]
default_tab_label = "Details"
show_more_label = "Show more details"
hide_details_label = "Hide details"

[storage]
last_route_key = "session_last_route"
"#;

/// Load the desk configuration.
///
/// An override document (typically injected by the boot payload) wins when
/// it parses; otherwise the embedded default is used.
pub fn load_config(override_toml: Option<&str>) -> Result<DeskConfig, ConfigError> {
    if let Some(contents) = override_toml {
        match toml::from_str::<DeskConfig>(contents) {
            Ok(config) => {
                log::info!("Loaded desk config from boot override");
                return Ok(config);
            }
            Err(e) => log::warn!("Desk config override rejected: {}", e),
        }
    }

    log::info!("Using default embedded desk configuration");
    let config: DeskConfig = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

impl Default for DeskConfig {
    fn default() -> Self {
        load_config(None).unwrap_or_else(|e| {
            log::error!("{}", e);
            Self {
                router: RouterConfig {
                    legacy_module_alias: "Module".into(),
                    modules_route: "modules".into(),
                    home_page: "home".into(),
                    title_capture_delay_ms: 1000,
                    settle_delay_ms: 100,
                    settle_poll_ms: 50,
                },
                history: HistoryConfig {
                    persist_delay_ms: 10000,
                    skip_routes: vec!["Form".into()],
                    persist_method: contracts::system::route_history::DEFERRED_INSERT_METHOD
                        .into(),
                },
                layout: LayoutConfig {
                    default_tab_label: "Details".into(),
                    show_more_label: "Show more details".into(),
                    hide_details_label: "Hide details".into(),
                },
                storage: StorageConfig {
                    last_route_key: "session_last_route".into(),
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<DeskConfig, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.router.home_page, "home");
        assert_eq!(config.router.title_capture_delay_ms, 1000);
        assert_eq!(config.history.persist_delay_ms, 10000);
        assert!(config.history.skip_routes.iter().any(|r| r == "Form"));
        assert_eq!(config.layout.default_tab_label, "Details");
        assert_eq!(config.storage.last_route_key, "session_last_route");
    }

    #[test]
    fn test_bad_override_falls_back_to_default() {
        let config = load_config(Some("[router]\nhome_page = 3")).unwrap();
        assert_eq!(config.router.modules_route, "modules");
    }

    #[test]
    fn test_override_wins() {
        let custom = DEFAULT_CONFIG.replace("home_page = \"home\"", "home_page = \"workspace\"");
        let config = load_config(Some(&custom)).unwrap();
        assert_eq!(config.router.home_page, "workspace");
    }
}
