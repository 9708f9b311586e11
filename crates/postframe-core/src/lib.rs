pub mod compositor;
pub mod config;
pub mod consts;
pub mod error;
pub mod geometry;
pub mod raster;
pub mod transform;
