// Application layer - Use cases driving the telemetry overlay
pub mod data_feed;
pub mod link_resolver;
pub mod map_widget;
pub mod pipeline;
pub mod visibility;
