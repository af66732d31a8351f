// InfluxDB data feed - Polls one time series per configured endpoint
use super::config::{prepare_query, FeedConfig, TargetQuery};
use crate::application::data_feed::DataFeed;
use crate::domain::series::{DataPoint, Series};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct InfluxFeed {
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    targets: Vec<TargetQuery>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxFeed {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            host: config.influx.host.trim_end_matches('/').to_string(),
            token: config.influx.token,
            database: config.influx.database,
            retention_policy: config.influx.retention_policy,
            targets: config.targets,
            client: reqwest::Client::new(),
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&epoch=ms&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }

    async fn query_target(&self, target: &TargetQuery) -> Result<Series> {
        let mut vars = HashMap::new();
        vars.insert("target".to_string(), target.target.clone());
        let query = prepare_query(&target.query, &vars);

        let response = self
            .execute_query(&query)
            .await
            .with_context(|| format!("Query for {} failed", target.target))?;
        Ok(Series::new(target.target.clone(), response_points(&response)))
    }
}

/// Parse a row timestamp: epoch milliseconds, or RFC3339 when the server
/// ignored the `epoch` parameter.
fn row_timestamp(value: &serde_json::Value) -> Option<i64> {
    if let Some(ms) = value.as_i64() {
        return Some(ms);
    }
    let text = value.as_str()?;
    chrono::DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|t| t.timestamp_millis())
}

/// Collect all rows of the first result, newest first. Null values are kept.
fn response_points(response: &InfluxQLResponse) -> Vec<DataPoint> {
    let mut points = Vec::new();
    let Some(series) = response.results.first().and_then(|r| r.series.as_ref()) else {
        return points;
    };

    for s in series {
        let time_idx = s.columns.iter().position(|c| c == "time").unwrap_or(0);
        let value_idx = s
            .columns
            .iter()
            .position(|c| c == "value" || c == "mean" || c == "last")
            .unwrap_or(1);

        for row in &s.values {
            if row.len() <= time_idx || row.len() <= value_idx {
                continue;
            }
            if let Some(time_ms) = row_timestamp(&row[time_idx]) {
                points.push(DataPoint::new(row[value_idx].as_f64(), time_ms));
            }
        }
    }

    points.sort_by(|a, b| b.timestamp_ms().cmp(&a.timestamp_ms()));
    points
}

#[async_trait]
impl DataFeed for InfluxFeed {
    async fn fetch_series(&self) -> Result<Vec<Series>> {
        let queries = self.targets.iter().map(|t| self.query_target(t));
        let results = futures::future::join_all(queries).await;

        let mut series = Vec::with_capacity(results.len());
        let mut last_error = None;
        for (target, result) in self.targets.iter().zip(results) {
            match result {
                Ok(s) => series.push(s),
                Err(e) => {
                    tracing::error!("Error fetching series {}: {:#}", target.target, e);
                    last_error = Some(e);
                }
            }
        }

        // A failing target only drops its own series; the fetch fails
        // when nothing came back at all.
        if series.is_empty() {
            if let Some(e) = last_error {
                return Err(e.context("Every target query failed"));
            }
        }

        tracing::debug!("Fetched {} series from InfluxDB", series.len());
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::InfluxSettings;

    fn feed_with(host: &str, targets: &[&str]) -> InfluxFeed {
        InfluxFeed::new(FeedConfig {
            influx: InfluxSettings {
                host: host.to_string(),
                token: "secret".to_string(),
                database: "netflow".to_string(),
                retention_policy: "autogen".to_string(),
            },
            poll_interval_secs: 30,
            targets: targets
                .iter()
                .map(|t| TargetQuery {
                    target: t.to_string(),
                    query: "SELECT value FROM interface WHERE \"port\"='${target}'".to_string(),
                })
                .collect(),
        })
    }

    fn feed() -> InfluxFeed {
        feed_with("http://localhost:8086/", &[])
    }

    /// Local stand-in for InfluxDB: queries mentioning "bad" get a 500,
    /// everything else gets one row.
    async fn spawn_influx_stub() -> String {
        use axum::extract::Query;
        use axum::http::StatusCode;
        use axum::routing::get;

        async fn query(Query(params): Query<HashMap<String, String>>) -> (StatusCode, String) {
            let q = params.get("q").cloned().unwrap_or_default();
            if q.contains("bad") {
                return (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
            }
            (
                StatusCode::OK,
                r#"{"results":[{"series":[{"columns":["time","value"],"values":[[1000, 5.0]]}]}]}"#
                    .to_string(),
            )
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route("/query", get(query));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_failed_target_skips_only_its_series() {
        let host = spawn_influx_stub().await;
        let feed = feed_with(&host, &["bad", "good"]);

        let series = feed.fetch_series().await.unwrap();

        assert_eq!(series, vec![Series::new("good", vec![DataPoint::new(Some(5.0), 1000)])]);
    }

    #[tokio::test]
    async fn test_fetch_fails_when_every_target_fails() {
        let host = spawn_influx_stub().await;
        let feed = feed_with(&host, &["bad.ae-1", "bad.ae-2"]);

        let err = feed.fetch_series().await.unwrap_err();

        assert!(format!("{:#}", err).contains("Query for bad.ae-"));
    }

    #[tokio::test]
    async fn test_no_targets_is_empty_fetch() {
        assert!(feed().fetch_series().await.unwrap().is_empty());
    }

    #[test]
    fn test_build_query_url() {
        let url = feed().build_query_url("SELECT value FROM interface");
        assert_eq!(
            url,
            "http://localhost:8086/query?db=netflow&rp=autogen&epoch=ms&q=SELECT%20value%20FROM%20interface"
        );
    }

    #[test]
    fn test_response_points_newest_first() {
        let response: InfluxQLResponse = serde_json::from_str(
            r#"{"results": [{"series": [{
                "name": "interface",
                "columns": ["time", "value"],
                "values": [[1000, 10.0], [2000, null], [3000, 30.5]]
            }]}]}"#,
        )
        .unwrap();

        let points = response_points(&response);
        assert_eq!(
            points,
            vec![
                DataPoint::new(Some(30.5), 3000),
                DataPoint::new(None, 2000),
                DataPoint::new(Some(10.0), 1000),
            ]
        );
    }

    #[test]
    fn test_response_points_rfc3339() {
        let response: InfluxQLResponse = serde_json::from_str(
            r#"{"results": [{"series": [{
                "columns": ["time", "mean"],
                "values": [["2024-01-01T00:00:01Z", 4.0], ["bogus", 5.0]]
            }]}]}"#,
        )
        .unwrap();

        let points = response_points(&response);
        assert_eq!(points, vec![DataPoint::new(Some(4.0), 1_704_067_201_000)]);
    }

    #[test]
    fn test_response_without_series() {
        let response: InfluxQLResponse = serde_json::from_str(r#"{"results": [{}]}"#).unwrap();
        assert!(response_points(&response).is_empty());
    }
}
