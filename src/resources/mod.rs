//! Filesystem primitives consumed by the link resolution engine.
pub mod fs;
pub mod link;
