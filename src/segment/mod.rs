/// Segment construction from clip configs.
pub mod builder;
/// Layered segment model.
pub mod model;
