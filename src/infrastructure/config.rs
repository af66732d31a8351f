use crate::domain::aggregate::Criterion;
use crate::domain::color::ColorConfig;
use crate::domain::series::SampleOrder;
use crate::domain::units::DEFAULT_DIVISOR;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Panel state as edited in the dashboard: map placement, layers and
/// how link statistics turn into colors.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    pub map_tile_url: String,
    pub lat: f64,
    pub lng: f64,
    pub zoom: f64,
    pub layers: Vec<LayerChoice>,
    pub hide_layers: bool,
    pub color: ColorConfig,
    pub legend: LegendConfig,
    pub tooltip: TooltipConfig,
    pub line: LineConfig,
    pub to_si: f64,
    pub sample_order: SampleOrder,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            map_tile_url: "http://api.tiles.mapbox.com/v4/mapbox.dark/{z}/{x}/{y}.png?access_token="
                .to_string(),
            lat: 33.0,
            lng: -80.0,
            zoom: 3.0,
            layers: Vec::new(),
            hide_layers: false,
            color: ColorConfig::default(),
            legend: LegendConfig::default(),
            tooltip: TooltipConfig::default(),
            line: LineConfig::default(),
            to_si: DEFAULT_DIVISOR,
            sample_order: SampleOrder::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LayerChoice {
    pub name: String,
    pub map_source: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LegendConfig {
    pub show: bool,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self { show: true }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TooltipConfig {
    pub show: bool,
    /// Ignore `to_si` and scale tooltip statistics by the default divisor.
    pub show_default: bool,
    pub content: String,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            show: true,
            show_default: true,
            content: " ".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LineConfig {
    pub selected: Criterion,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub influx: InfluxSettings,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub targets: Vec<TargetQuery>,
}

fn default_poll_interval() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
}

/// One endpoint series to poll; `${target}` in the query is replaced by `target`.
#[derive(Debug, Deserialize, Clone)]
pub struct TargetQuery {
    pub target: String,
    pub query: String,
}

pub fn load_panel_config() -> anyhow::Result<PanelConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/panel").required(false))
        .add_source(
            config::Environment::with_prefix("NETMAP")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// The feed is optional: without an `[influx]` table the service only
/// receives data over HTTP.
pub fn load_feed_config() -> anyhow::Result<Option<FeedConfig>> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/feed").required(false))
        .build()?;

    if settings.get_table("influx").is_err() {
        return Ok(None);
    }
    Ok(Some(settings.try_deserialize()?))
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::color::{ColorMode, ColorScheme, ScaleType};
    use config::{Config, File, FileFormat};

    fn parse<T: serde::de::DeserializeOwned>(toml: &str) -> T {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_prepare_query() {
        let mut vars = HashMap::new();
        vars.insert("target".to_string(), "chic.ae-1".to_string());

        let query = "SELECT value FROM interface WHERE \"port\"='${target}' AND time >= now() - 10m";
        let result = prepare_query(query, &vars);

        assert_eq!(
            result,
            "SELECT value FROM interface WHERE \"port\"='chic.ae-1' AND time >= now() - 10m"
        );
    }

    #[test]
    fn test_panel_defaults() {
        let panel: PanelConfig = parse("");
        assert_eq!(panel, PanelConfig::default());
        assert_eq!(panel.color.color_scheme, ColorScheme::Oranges);
        assert_eq!(panel.line.selected, Criterion::Current);
        assert_eq!(panel.to_si, 1_000_000_000.0);
        assert!(panel.tooltip.show_default);
        assert!(!panel.hide_layers);
    }

    #[test]
    fn test_panel_config() {
        let panel: PanelConfig = parse(
            r##"
            zoom = 5.0
            hide_layers = true
            to_si = 1000000.0
            sample_order = "oldest_first"

            [color]
            mode = "opacity"
            color_scale = "sqrt"
            exponent = 0.25
            color_scheme = "interpolateRdYlGn"
            card_color = "#00ff00"

            [line]
            selected = "Maximum"

            [[layers]]
            name = "Backbone"
            map_source = "config/topology/backbone.json"
            min = 0.0
            max = 100000000000.0
            "##,
        );

        assert_eq!(panel.zoom, 5.0);
        assert!(panel.hide_layers);
        assert_eq!(panel.sample_order, SampleOrder::OldestFirst);
        assert_eq!(panel.color.mode, ColorMode::Opacity);
        assert_eq!(panel.color.color_scale, ScaleType::Sqrt);
        assert_eq!(panel.color.color_scheme, ColorScheme::RdYlGn);
        assert_eq!(panel.line.selected, Criterion::Maximum);
        assert_eq!(panel.layers.len(), 1);
        assert_eq!(panel.layers[0].max, 100_000_000_000.0);
        assert_eq!(panel.lat, 33.0);
    }

    #[test]
    fn test_feed_config() {
        let feed: FeedConfig = parse(
            r#"
            [influx]
            host = "http://localhost:8086"
            token = "secret"
            database = "netflow"
            retention_policy = "autogen"

            [[targets]]
            target = "chic.ae-1"
            query = "SELECT value FROM interface WHERE \"port\"='${target}'"
            "#,
        );

        assert_eq!(feed.poll_interval_secs, 30);
        assert_eq!(feed.targets.len(), 1);
        assert_eq!(feed.influx.database, "netflow");
    }
}
