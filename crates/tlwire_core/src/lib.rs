//! Public library API for compiling TL schemas and transcoding TL wire data.

/// TL schema parsing, type registry, and binary encode/decode engine.
pub mod tl;
