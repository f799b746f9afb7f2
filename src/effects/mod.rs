/// Premultiplied RGBA8 compositing primitives.
pub mod composite;
