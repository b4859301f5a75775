//! Websocket plot-data feed: wire messages and a reconnecting client.

pub mod dto;
pub mod plot_data_client;

pub use dto::*;
pub use plot_data_client::*;
