// Domain layer - Telemetry aggregation and link coloring rules
pub mod aggregate;
pub mod color;
pub mod error;
pub mod link;
pub mod series;
pub mod topology;
pub mod units;
