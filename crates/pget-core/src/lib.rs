pub mod chunker;
pub mod config;
pub mod downloader;
pub mod fetch_head;
pub mod logging;
pub mod progress;
pub mod storage;
pub mod url_model;
