//! Output encoding.
//!
//! The assembler turns a transformed frame sequence back into one still image or animation.

pub mod assembler;
