pub mod app;
pub mod meter;
