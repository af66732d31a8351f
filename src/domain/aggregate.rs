// Series aggregation - Summary statistics over one update window
use super::series::{DataPoint, SampleOrder};
use serde::{Deserialize, Serialize};

/// Statistic used to drive a link's color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criterion {
    Minimum,
    Maximum,
    Average,
    #[default]
    Current,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub sum: f64,
    pub count: usize,
    /// Most recent non-absent value.
    pub last: Option<f64>,
    /// Cadence between the two most recent samples, in milliseconds.
    /// Reported per link side as `interval_ms`.
    pub interval: Option<i64>,
}

impl Aggregate {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as f64)
    }

    pub fn select(&self, criterion: Criterion) -> Option<f64> {
        match criterion {
            Criterion::Minimum => self.min,
            Criterion::Maximum => self.max,
            Criterion::Average => self.average(),
            Criterion::Current => self.last,
        }
    }
}

/// Reduce a series window to its summary statistics in a single scan.
pub fn aggregate(points: &[DataPoint], order: SampleOrder) -> Aggregate {
    let mut agg = Aggregate::default();
    let scan = order.newest_first(points);
    let mut recent = scan.clone();

    for point in scan {
        let Some(value) = point.value() else {
            continue;
        };

        agg.sum += value;
        agg.count += 1;
        agg.min = Some(agg.min.map_or(value, |m| m.min(value)));
        agg.max = Some(agg.max.map_or(value, |m| m.max(value)));
        if agg.last.is_none() {
            agg.last = Some(value);
        }
    }

    if agg.count > 1 {
        if let (Some(newest), Some(previous)) = (recent.next(), recent.next()) {
            let delta = newest.timestamp_ms() - previous.timestamp_ms();
            if delta >= 0 {
                agg.interval = Some(delta);
            } else {
                tracing::warn!(
                    "Samples are not in {:?} order (delta {}ms), dropping interval",
                    order,
                    delta
                );
            }
        }
    }

    agg
}
