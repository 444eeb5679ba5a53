use crate::domain::widget::{Coords, WidgetData, WidgetId};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub remote: RemoteSettings,
    pub dashboard: DashboardSettings,
    /// Widgets already persisted on the server, displayed on start-up
    #[serde(default)]
    pub widgets: Vec<PersistedWidget>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteSettings {
    pub base_url: String,
    /// Anti-forgery token sent with every mutating request
    pub token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub id: String,
    #[serde(default = "default_columns")]
    pub columns: u32,
    #[serde(default = "default_widget_margin")]
    pub widget_margin: u32,
    #[serde(default = "default_widget_height")]
    pub widget_height: u32,
    #[serde(default = "default_width")]
    pub default_width: u32,
    #[serde(default = "default_height")]
    pub default_height: u32,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
    #[serde(default = "default_widget_template")]
    pub widget_template: String,
    #[serde(default = "default_content_url")]
    pub content_url: String,
    #[serde(default = "default_configure_url")]
    pub configure_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersistedWidget {
    pub id: String,
    pub type_id: String,
    pub title: String,
    pub url: Option<String>,
    pub col: Option<u32>,
    pub row: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl PersistedWidget {
    pub fn into_parts(self) -> (WidgetData, Coords) {
        let mut data = WidgetData::new(self.type_id, self.title).with_id(WidgetId::new(self.id));
        if let Some(url) = self.url {
            data = data.with_url(url);
        }
        let coords = Coords {
            col: self.col,
            row: self.row,
            width: self.width,
            height: self.height,
        };
        (data, coords)
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_columns() -> u32 {
    4
}

fn default_widget_margin() -> u32 {
    5
}

fn default_widget_height() -> u32 {
    230
}

fn default_width() -> u32 {
    1
}

fn default_height() -> u32 {
    4
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_resize_debounce_ms() -> u64 {
    300
}

fn default_widget_template() -> String {
    concat!(
        r#"<li class="widget" data-id="${id}" data-typeid="${type_id}">"#,
        r#"<span class="widget-title">${title}</span>"#,
        r#"<div class="widget-lock"${lock}></div>"#,
        r#"<iframe class="widget-iframe" name="${id}" src="${src}"></iframe>"#,
        "</li>"
    )
    .to_string()
}

fn default_content_url() -> String {
    "ViewWidget-Start?DashboardID=${dashboard}&WidgetID=${widget}".to_string()
}

fn default_configure_url() -> String {
    "ViewWidget-Configure?DashboardID=${dashboard}&WidgetID=${widget}".to_string()
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace `${name}` placeholders in a template
pub fn fill_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
