//! Frame compositing and the render loop.

/// Frame buffers.
pub mod backend;
/// Software timeline compositor.
pub mod cpu;
/// Timeline-to-sink render loop with audio mixing.
pub mod pipeline;
