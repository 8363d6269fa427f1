pub mod bridge;
pub mod model;

pub use bridge::DisplayBridge;
pub use model::LiveModel;
