pub mod params;
pub mod state;

pub use params::TransformParams;
pub use state::TransformState;
