// Topology loader - Resolves layer load requests and reports readiness to the panel
use super::memory_map::SharedPanel;
use crate::application::map_widget::LayerLoadRequest;
use crate::domain::topology::Topology;
use anyhow::{Context, Result};
use tokio::sync::mpsc;

/// Load a topology document from an http(s) URL or a local path.
pub async fn load_topology(map_source: &str) -> Result<Topology> {
    let json = if map_source.starts_with("http://") || map_source.starts_with("https://") {
        let response = reqwest::get(map_source)
            .await
            .context("Failed to fetch map source")?;
        if !response.status().is_success() {
            anyhow::bail!("Map source {} returned status {}", map_source, response.status());
        }
        response.text().await.context("Failed to read map source body")?
    } else {
        tokio::fs::read_to_string(map_source)
            .await
            .with_context(|| format!("Failed to read map source {}", map_source))?
    };

    Topology::from_json(&json).with_context(|| format!("Invalid topology in {}", map_source))
}

pub async fn run_topology_loader(mut rx: mpsc::UnboundedReceiver<LayerLoadRequest>, panel: SharedPanel) {
    while let Some(request) = rx.recv().await {
        let panel = panel.clone();

        tokio::spawn(async move {
            match load_topology(&request.map_source).await {
                Ok(topology) => {
                    tracing::debug!(
                        "Loaded {} links for layer {}",
                        topology.links().len(),
                        request.layer_id
                    );
                    let mut panel = panel.lock().await;
                    if let Some(report) = panel.on_layer_ready(&request.layer_id, topology) {
                        tracing::debug!("Replay for {}: {:?}", request.layer_id, report);
                    }
                }
                Err(e) => {
                    tracing::error!("Error loading layer {}: {:#}", request.layer_id, e);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::Panel;
    use crate::domain::series::{DataPoint, Series};
    use crate::infrastructure::config::{LayerChoice, PanelConfig};
    use crate::infrastructure::memory_map::InMemoryMap;
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    fn topology_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"links": [{{"name": "l1", "endpoints": ["A1", "Z1"]}}]}}"#).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_topology_from_file() {
        let file = topology_file();
        let topology = load_topology(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(topology.links()[0].endpoints[0], "A1");
    }

    #[tokio::test]
    async fn test_load_topology_missing_file() {
        assert!(load_topology("/nonexistent/topology.json").await.is_err());
    }

    #[tokio::test]
    async fn test_loader_marks_layer_ready_and_replays() {
        let file = topology_file();
        let (tx, rx) = mpsc::unbounded_channel();
        let mut config = PanelConfig::default();
        config.layers = vec![LayerChoice {
            name: "backbone".to_string(),
            map_source: file.path().to_str().unwrap().to_string(),
            min: 0.0,
            max: 100.0,
        }];
        let panel: SharedPanel = Arc::new(Mutex::new(Panel::new(config, InMemoryMap::new(tx))));

        let loader = tokio::spawn(run_topology_loader(rx, panel.clone()));
        panel
            .lock()
            .await
            .on_data_received(vec![Series::new("A1", vec![DataPoint::new(Some(42.0), 1)])]);

        let mut cur = None;
        for _ in 0..50 {
            {
                let panel = panel.lock().await;
                let layer_id = panel.layer_ids()[0].clone();
                cur = panel.map().layer(&layer_id).and_then(|l| l.links().first()).and_then(|l| l.az.cur);
            }
            if cur.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert_eq!(cur, Some(42.0));
        loader.abort();
    }
}
