// In-memory map widget - Holds rendered layer state for the HTTP surface
use crate::application::map_widget::{
    LayerLoadRequest, LayerState, MapWidget, NetworkLayer, NetworkLayerConfig,
};
use crate::application::pipeline::Panel;
use crate::domain::color::Legend;
use crate::domain::topology::Topology;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

pub type SharedPanel = Arc<Mutex<Panel<InMemoryMap>>>;

#[derive(Debug, Clone, Serialize)]
pub struct InMemoryLayer {
    layer_id: String,
    config: NetworkLayerConfig,
    state: LayerState,
    visible: bool,
    /// Number of commits pushed by the pipeline.
    revision: u64,
    topology: Option<Topology>,
}

impl InMemoryLayer {
    fn new(layer_id: String, config: NetworkLayerConfig) -> Self {
        Self {
            layer_id,
            config,
            state: LayerState::Uninitialized,
            visible: true,
            revision: 0,
            topology: None,
        }
    }
}

#[cfg(test)]
impl InMemoryLayer {
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn links(&self) -> &[crate::domain::link::Link] {
        self.topology.as_ref().map(Topology::links).unwrap_or_default()
    }
}

impl NetworkLayer for InMemoryLayer {
    fn layer_id(&self) -> &str {
        &self.layer_id
    }

    fn state(&self) -> LayerState {
        self.state
    }

    fn topology_mut(&mut self) -> Option<&mut Topology> {
        self.topology.as_mut()
    }

    fn max(&self) -> f64 {
        self.config.max
    }

    fn min(&self) -> f64 {
        self.config.min
    }

    fn toggle(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn update(&mut self) {
        self.revision += 1;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InMemoryMap {
    map_url: String,
    zoom: f64,
    center: (f64, f64),
    legend: Option<Legend>,
    layers: Vec<InMemoryLayer>,
    #[serde(skip)]
    next_layer: u64,
    #[serde(skip)]
    load_tx: mpsc::UnboundedSender<LayerLoadRequest>,
}

impl InMemoryMap {
    pub fn new(load_tx: mpsc::UnboundedSender<LayerLoadRequest>) -> Self {
        Self {
            map_url: String::new(),
            zoom: 0.0,
            center: (0.0, 0.0),
            legend: None,
            layers: Vec::new(),
            next_layer: 0,
            load_tx,
        }
    }
}

#[cfg(test)]
impl InMemoryMap {
    pub fn layer(&self, layer_id: &str) -> Option<&InMemoryLayer> {
        self.layers.iter().find(|l| l.layer_id == layer_id)
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    pub fn map_url(&self) -> &str {
        &self.map_url
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn center(&self) -> (f64, f64) {
        self.center
    }
}

impl MapWidget for InMemoryMap {
    type Layer = InMemoryLayer;

    fn add_network_layer(&mut self, config: NetworkLayerConfig) -> String {
        self.next_layer += 1;
        let layer_id = format!("network_layer_{}", self.next_layer);

        let request = LayerLoadRequest {
            layer_id: layer_id.clone(),
            map_source: config.map_source.clone(),
        };
        if self.load_tx.send(request).is_err() {
            tracing::warn!("Topology loader is gone, layer {} will stay uninitialized", layer_id);
        }

        self.layers.push(InMemoryLayer::new(layer_id.clone(), config));
        layer_id
    }

    fn remove_layers(&mut self, layer_id: &str) {
        self.layers.retain(|l| l.layer_id != layer_id);
    }

    fn layer_mut(&mut self, layer_id: &str) -> Option<&mut InMemoryLayer> {
        self.layers.iter_mut().find(|l| l.layer_id == layer_id)
    }

    fn install_topology(&mut self, layer_id: &str, topology: Topology) -> bool {
        let Some(layer) = self.layer_mut(layer_id) else {
            return false;
        };
        layer.topology = Some(topology);
        layer.state = LayerState::Ready;
        true
    }

    fn set_map_url(&mut self, url: &str) {
        self.map_url = url.to_string();
    }

    fn adjust_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    fn set_center(&mut self, lat: f64, lng: f64) {
        self.center = (lat, lng);
    }

    fn draw_legend(&mut self, legend: &Legend) {
        self.legend = Some(legend.clone());
    }
}
