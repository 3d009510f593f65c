//! Decoded frames and the frame-sequence pipeline.

pub mod frame;
pub mod pipeline;
pub mod source;
