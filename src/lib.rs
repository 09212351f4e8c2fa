pub mod api;
pub mod archive;
pub mod audio;
pub mod config;
pub mod humanize;
pub mod notify;
pub mod observability;
pub mod pipeline;
pub mod sources;
pub mod tool;
