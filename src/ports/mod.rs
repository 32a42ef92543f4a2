//! Port traits separating the pipeline from file formats.

pub mod config_port;
pub mod data_port;
pub mod output_port;
