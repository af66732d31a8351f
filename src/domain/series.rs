// Time series domain models
use serde::{Deserialize, Serialize};

/// One `[value, timestamp]` sample as delivered by the host.
/// Absent values (`null`) are kept so positions stay aligned with timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint(pub Option<f64>, pub i64);

impl DataPoint {
    pub fn new(value: Option<f64>, timestamp_ms: i64) -> Self {
        Self(value, timestamp_ms)
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub target: String,
    #[serde(default)]
    pub datapoints: Vec<DataPoint>,
}

impl Series {
    pub fn new(target: impl Into<String>, datapoints: Vec<DataPoint>) -> Self {
        Self {
            target: target.into(),
            datapoints,
        }
    }
}

/// Chronological layout of `Series::datapoints`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SampleOrder {
    /// Iterate samples from the most recent to the oldest.
    pub fn newest_first<'a>(&self, points: &'a [DataPoint]) -> NewestFirst<'a> {
        match self {
            SampleOrder::NewestFirst => NewestFirst::Forward(points.iter()),
            SampleOrder::OldestFirst => NewestFirst::Backward(points.iter().rev()),
        }
    }
}

/// Borrowing iterator returned by [`SampleOrder::newest_first`].
#[derive(Debug, Clone)]
pub enum NewestFirst<'a> {
    Forward(std::slice::Iter<'a, DataPoint>),
    Backward(std::iter::Rev<std::slice::Iter<'a, DataPoint>>),
}

impl<'a> Iterator for NewestFirst<'a> {
    type Item = &'a DataPoint;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            NewestFirst::Forward(it) => it.next(),
            NewestFirst::Backward(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            NewestFirst::Forward(it) => it.size_hint(),
            NewestFirst::Backward(it) => it.size_hint(),
        }
    }
}

impl ExactSizeIterator for NewestFirst<'_> {}
