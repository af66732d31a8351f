// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod influx_feed;
pub mod memory_map;
pub mod topology_loader;
