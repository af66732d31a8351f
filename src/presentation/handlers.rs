// HTTP request handlers
use crate::application::pipeline::{ProcessReport, RenderState};
use crate::domain::color::{ColorScheme, Legend};
use crate::domain::series::Series;
use crate::infrastructure::config::{LayerChoice, PanelConfig};
use crate::infrastructure::memory_map::InMemoryMap;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct DataErrorBody {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PanelStatus {
    pub render_state: RenderState,
    pub layer_ids: Vec<String>,
    pub cached_series: usize,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Data-received event from the host
pub async fn data_received(
    State(state): State<Arc<AppState>>,
    Json(series): Json<Vec<Series>>,
) -> Json<ProcessReport> {
    let report = state.panel.lock().await.on_data_received(series);
    if !report.errors.is_empty() {
        tracing::warn!("Data event finished with {} errors", report.errors.len());
    }
    Json(report)
}

/// Data-error event from the host
pub async fn data_error(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DataErrorBody>,
) -> StatusCode {
    state.panel.lock().await.on_data_error(&body.message);
    StatusCode::NO_CONTENT
}

/// Current map and link state
pub async fn get_layers(State(state): State<Arc<AppState>>) -> Json<InMemoryMap> {
    Json(state.panel.lock().await.map().clone())
}

pub async fn get_legend(State(state): State<Arc<AppState>>) -> Json<Legend> {
    Json(state.panel.lock().await.legend().clone())
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<PanelConfig> {
    Json(state.panel.lock().await.config().clone())
}

/// Replace the panel configuration and rebuild the map layers
pub async fn put_config(
    State(state): State<Arc<AppState>>,
    Json(config): Json<PanelConfig>,
) -> StatusCode {
    state.panel.lock().await.apply_config(config);
    StatusCode::NO_CONTENT
}

/// Append an empty layer choice for the editor to fill in
pub async fn add_layer_choice(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<PanelConfig>) {
    let mut panel = state.panel.lock().await;
    panel.add_layer_choice();
    (StatusCode::CREATED, Json(panel.config().clone()))
}

pub async fn remove_layer_choice(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<LayerChoice>, StatusCode> {
    match state.panel.lock().await.remove_layer_choice(index) {
        Some(removed) => Ok(Json(removed)),
        None => {
            tracing::warn!("No layer choice at index {}", index);
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// Palettes accepted by `color.color_scheme`
pub async fn get_color_schemes() -> Json<Vec<ColorScheme>> {
    Json(ColorScheme::ALL.to_vec())
}

/// Render lifecycle, live layer ids and the size of the replay cache
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<PanelStatus> {
    let panel = state.panel.lock().await;
    Json(PanelStatus {
        render_state: panel.render_state(),
        layer_ids: panel.layer_ids().to_vec(),
        cached_series: panel.recent_data().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::Panel;
    use crate::domain::series::DataPoint;
    use tokio::sync::{mpsc, Mutex};

    fn app_state() -> Arc<AppState> {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut config = PanelConfig::default();
        config.layers = vec![LayerChoice {
            name: "backbone".to_string(),
            map_source: "config/topology/backbone.json".to_string(),
            min: 0.0,
            max: 100.0,
        }];
        Arc::new(AppState {
            panel: Arc::new(Mutex::new(Panel::new(config, InMemoryMap::new(tx)))),
        })
    }

    #[tokio::test]
    async fn test_add_layer_choice_appends_blank_choice() {
        let state = app_state();

        let (status, Json(config)) = add_layer_choice(State(state.clone())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(config.layers.len(), 2);
        assert_eq!(config.layers[1], LayerChoice::default());
        assert_eq!(state.panel.lock().await.config().layers.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_layer_choice() {
        let state = app_state();

        let Json(removed) = remove_layer_choice(State(state.clone()), Path(0)).await.unwrap();

        assert_eq!(removed.name, "backbone");
        assert!(state.panel.lock().await.config().layers.is_empty());
    }

    #[tokio::test]
    async fn test_remove_layer_choice_out_of_range() {
        let state = app_state();

        let err = remove_layer_choice(State(state.clone()), Path(3)).await.unwrap_err();

        assert_eq!(err, StatusCode::NOT_FOUND);
        assert_eq!(state.panel.lock().await.config().layers.len(), 1);
    }

    #[tokio::test]
    async fn test_status_follows_render_lifecycle() {
        let state = app_state();

        let Json(status) = get_status(State(state.clone())).await;
        assert_eq!(status.render_state, RenderState::Unrendered);
        assert!(status.layer_ids.is_empty());

        let series = vec![Series::new("A1", vec![DataPoint::new(Some(1.0), 1)])];
        data_received(State(state.clone()), Json(series)).await;

        let Json(status) = get_status(State(state)).await;
        assert_eq!(status.render_state, RenderState::Active);
        assert_eq!(status.layer_ids, vec!["network_layer_1".to_string()]);
        assert_eq!(status.cached_series, 1);
    }

    #[tokio::test]
    async fn test_color_schemes_use_config_names() {
        let Json(schemes) = get_color_schemes().await;
        let names = serde_json::to_value(&schemes).unwrap();

        assert_eq!(schemes.len(), ColorScheme::ALL.len());
        assert_eq!(names[0], "interpolateOranges");
    }
}
