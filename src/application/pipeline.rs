// Pipeline orchestrator - Runs every data-received event through the link coloring pipeline
use super::link_resolver::resolve_links;
use super::map_widget::{LayerState, MapWidget, NetworkLayer, NetworkLayerConfig};
use super::visibility::apply_visibility;
use crate::domain::aggregate::{aggregate, Aggregate, Criterion};
use crate::domain::color::{normalize, validate_domain, ColorScale, Legend, LEGEND_STEPS};
use crate::domain::error::PipelineError;
use crate::domain::link::SideUpdate;
use crate::domain::series::Series;
use crate::domain::topology::Topology;
use crate::domain::units::UnitNormalizer;
use crate::infrastructure::config::{LayerChoice, PanelConfig};
use serde::{Serialize, Serializer};
use std::collections::HashSet;

const LINE_WIDTH: f64 = 3.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderState {
    Unrendered,
    Initializing,
    Active,
}

/// Outcome of one pass over a data snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessReport {
    pub series: usize,
    pub links_updated: usize,
    pub layers_committed: usize,
    pub layers_skipped: usize,
    pub layers_hidden: usize,
    pub unmatched_series: usize,
    pub empty_series: usize,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<PipelineError>,
}

fn serialize_errors<S: Serializer>(errors: &[PipelineError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}

pub struct Panel<M: MapWidget> {
    config: PanelConfig,
    map: M,
    layer_ids: Vec<String>,
    recent_data: Vec<Series>,
    scale: ColorScale,
    legend: Legend,
    render_state: RenderState,
}

impl<M: MapWidget> Panel<M> {
    pub fn new(config: PanelConfig, map: M) -> Self {
        let scale = ColorScale::new(&config.color);
        let legend = scale.legend(LEGEND_STEPS);
        Self {
            config,
            map,
            layer_ids: Vec::new(),
            recent_data: Vec::new(),
            scale,
            legend,
            render_state: RenderState::Unrendered,
        }
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn layer_ids(&self) -> &[String] {
        &self.layer_ids
    }

    pub fn render_state(&self) -> RenderState {
        self.render_state
    }

    pub fn recent_data(&self) -> &[Series] {
        &self.recent_data
    }

    pub fn on_data_received(&mut self, data: Vec<Series>) -> ProcessReport {
        if self.render_state == RenderState::Unrendered {
            self.render();
        }

        let report = self.process_data(&data);
        self.recent_data = data;

        self.render_state = RenderState::Active;
        report
    }

    /// Drop the cached snapshot; links keep their last rendered state.
    pub fn on_data_error(&mut self, message: &str) {
        let err = PipelineError::DataFeed(message.to_string());
        tracing::warn!("{}, discarding {} cached series", err, self.recent_data.len());
        self.recent_data.clear();
    }

    /// A layer finished loading: attach its topology and replay the last
    /// snapshot so it does not stay uncolored until the next event.
    pub fn on_layer_ready(&mut self, layer_id: &str, topology: Topology) -> Option<ProcessReport> {
        if !self.layer_ids.iter().any(|id| id == layer_id) {
            tracing::debug!("Ignoring topology for removed layer {}", layer_id);
            return None;
        }
        if !self.map.install_topology(layer_id, topology) {
            tracing::warn!("Map widget rejected topology for layer {}", layer_id);
            return None;
        }

        tracing::info!(
            "Layer {} ready, replaying {} series",
            layer_id,
            self.recent_data.len()
        );
        let data = std::mem::take(&mut self.recent_data);
        let report = self.process_data(&data);
        self.recent_data = data;
        Some(report)
    }

    /// Push map settings and the legend to the widget and rebuild all layers.
    pub fn render(&mut self) {
        self.scale = ColorScale::new(&self.config.color);
        self.legend = self.scale.legend(LEGEND_STEPS);

        if self.config.legend.show {
            self.map.draw_legend(&self.legend);
        }
        self.map.set_map_url(&self.config.map_tile_url);
        self.map.adjust_zoom(self.config.zoom);
        self.map.set_center(self.config.lat, self.config.lng);

        for layer_id in self.layer_ids.drain(..) {
            self.map.remove_layers(&layer_id);
        }

        for choice in &self.config.layers {
            if choice.map_source.trim().is_empty() {
                tracing::debug!("Layer {:?} has no map source, not adding it", choice.name);
                continue;
            }
            let layer_id = self.map.add_network_layer(NetworkLayerConfig {
                name: choice.name.clone(),
                max: choice.max,
                min: choice.min,
                line_width: LINE_WIDTH,
                map_source: choice.map_source.clone(),
            });
            self.layer_ids.push(layer_id);
        }

        if self.render_state == RenderState::Unrendered {
            self.render_state = RenderState::Initializing;
        }
        tracing::info!("Rendered map with {} layers", self.layer_ids.len());
    }

    pub fn apply_config(&mut self, config: PanelConfig) {
        self.config = config;
        self.refresh();
    }

    pub fn add_layer_choice(&mut self) {
        self.config.layers.push(LayerChoice::default());
        self.refresh();
    }

    pub fn remove_layer_choice(&mut self, index: usize) -> Option<LayerChoice> {
        if index >= self.config.layers.len() {
            return None;
        }
        let removed = self.config.layers.remove(index);
        self.refresh();
        Some(removed)
    }

    fn refresh(&mut self) {
        if self.render_state == RenderState::Unrendered {
            self.scale = ColorScale::new(&self.config.color);
            self.legend = self.scale.legend(LEGEND_STEPS);
        } else {
            self.render();
        }
    }

    pub fn process_data(&mut self, data: &[Series]) -> ProcessReport {
        let mut report = ProcessReport {
            series: data.len(),
            ..ProcessReport::default()
        };

        let targets: HashSet<&str> = data.iter().map(|s| s.target.as_str()).collect();
        let criterion = self.config.line.selected;
        let normalizer = UnitNormalizer::new(self.config.to_si, self.config.tooltip.show_default);
        let aggregates: Vec<Aggregate> = data
            .iter()
            .map(|s| aggregate(&s.datapoints, self.config.sample_order))
            .collect();
        let mut matched = vec![false; data.len()];

        for layer_id in &self.layer_ids {
            let Some(layer) = self.map.layer_mut(layer_id) else {
                continue;
            };
            if layer.state() != LayerState::Ready {
                let err = PipelineError::MissingCapability {
                    layer_id: layer_id.clone(),
                };
                tracing::debug!("Skipping layer: {}", err);
                report.layers_skipped += 1;
                continue;
            }

            if self.config.hide_layers && apply_visibility(&mut *layer, &targets) == Some(false) {
                report.layers_hidden += 1;
            }

            let (layer_min, layer_max) = (layer.min(), layer.max());
            if let Err(err) = validate_domain(layer_min, layer_max) {
                tracing::warn!("Layer {}: {}", layer_id, err);
                report.errors.push(err);
                continue;
            }
            let Some(topology) = layer.topology_mut() else {
                report.layers_skipped += 1;
                continue;
            };

            for (i, (series, agg)) in data.iter().zip(&aggregates).enumerate() {
                let matches = resolve_links(&series.target, topology.links());
                if matches.is_empty() {
                    continue;
                }
                matched[i] = true;

                let Some(update) = side_update(agg, criterion, layer_min, layer_max, &self.scale, &normalizer)
                else {
                    let err = PipelineError::EmptyAggregate {
                        target: series.target.clone(),
                    };
                    tracing::debug!("Keeping previous link state: {}", err);
                    continue;
                };

                for m in matches {
                    topology.links_mut()[m.index].record(m.side, update.clone());
                    report.links_updated += 1;
                }
            }
        }

        for (series, (agg, was_matched)) in data.iter().zip(aggregates.iter().zip(&matched)) {
            if !was_matched {
                let err = PipelineError::NoMatch {
                    target: series.target.clone(),
                };
                tracing::debug!("{}", err);
                report.unmatched_series += 1;
            } else if agg.is_empty() {
                report.empty_series += 1;
            }
        }

        for layer_id in &self.layer_ids {
            if let Some(layer) = self.map.layer_mut(layer_id) {
                if layer.state() == LayerState::Ready {
                    layer.update();
                    report.layers_committed += 1;
                }
            }
        }

        tracing::debug!(
            "Processed {} series: {} link updates across {} layers",
            report.series,
            report.links_updated,
            report.layers_committed
        );
        report
    }
}

/// Turn one aggregate into the values written to a link side, or `None`
/// when the window held no samples.
fn side_update(
    agg: &Aggregate,
    criterion: Criterion,
    layer_min: f64,
    layer_max: f64,
    scale: &ColorScale,
    normalizer: &UnitNormalizer,
) -> Option<SideUpdate> {
    let value = agg.select(criterion)?;
    let cur = normalize(value, layer_min, layer_max).ok()?;

    Some(SideUpdate {
        cur,
        color: scale.color(cur),
        count: agg.count,
        min: normalizer.to_si(agg.min?),
        max: normalizer.to_si(agg.max?),
        sum: normalizer.to_si(agg.sum),
        avg: normalizer.to_si(agg.average()?),
        interval_ms: agg.interval,
    })
}
