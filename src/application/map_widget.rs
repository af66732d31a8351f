// Map widget interface - The rendering surface the pipeline pushes link state into
use crate::domain::color::Legend;
use crate::domain::topology::Topology;
use serde::Serialize;

/// Readiness of a network layer. Only `Ready` layers take part in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerState {
    Uninitialized,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkLayerConfig {
    pub name: String,
    pub max: f64,
    pub min: f64,
    pub line_width: f64,
    pub map_source: String,
}

/// Emitted by the widget when a layer needs its topology loaded.
/// The loader answers by calling `Panel::on_layer_ready`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerLoadRequest {
    pub layer_id: String,
    pub map_source: String,
}

pub trait NetworkLayer {
    fn layer_id(&self) -> &str;

    fn state(&self) -> LayerState;

    /// Links are owned by the layer; callers borrow them for one event.
    fn topology_mut(&mut self) -> Option<&mut Topology>;

    fn max(&self) -> f64;

    fn min(&self) -> f64;

    fn toggle(&mut self, visible: bool);

    /// Commit mutated links to the renderer.
    fn update(&mut self);
}

pub trait MapWidget {
    type Layer: NetworkLayer;

    /// Create a layer in the `Uninitialized` state and return its id.
    fn add_network_layer(&mut self, config: NetworkLayerConfig) -> String;

    fn remove_layers(&mut self, layer_id: &str);

    fn layer_mut(&mut self, layer_id: &str) -> Option<&mut Self::Layer>;

    /// Attach a loaded topology and mark the layer `Ready`.
    /// Returns false when the layer no longer exists.
    fn install_topology(&mut self, layer_id: &str, topology: Topology) -> bool;

    fn set_map_url(&mut self, url: &str);

    fn adjust_zoom(&mut self, zoom: f64);

    fn set_center(&mut self, lat: f64, lng: f64);

    fn draw_legend(&mut self, legend: &Legend);
}
