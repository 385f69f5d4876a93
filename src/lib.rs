pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod nav;
pub mod net;
pub mod normalize;
pub mod ui;
