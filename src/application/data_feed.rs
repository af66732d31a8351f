// Data feed trait - Source of data-received events for the panel
use super::map_widget::MapWidget;
use super::pipeline::Panel;
use crate::domain::series::Series;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[async_trait]
pub trait DataFeed: Send + Sync {
    /// Fetch the current window for every configured target.
    async fn fetch_series(&self) -> anyhow::Result<Vec<Series>>;
}

/// Deliver one fetch to the panel as a data-received or data-error event.
pub async fn deliver<M: MapWidget>(feed: &dyn DataFeed, panel: &Mutex<Panel<M>>) {
    match feed.fetch_series().await {
        Ok(series) => {
            let report = panel.lock().await.on_data_received(series);
            tracing::debug!("Feed update processed: {:?}", report);
        }
        Err(e) => {
            tracing::error!("Error fetching series: {:#}", e);
            panel.lock().await.on_data_error(&e.to_string());
        }
    }
}

/// Poll the feed forever. Events are delivered one at a time so runs of the
/// pipeline never overlap.
pub async fn run_poller<M>(feed: Arc<dyn DataFeed>, panel: Arc<Mutex<Panel<M>>>, every: Duration)
where
    M: MapWidget + Send,
{
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        deliver(feed.as_ref(), &panel).await;
    }
}
