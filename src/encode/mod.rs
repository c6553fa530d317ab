//! Frame sinks.
//!
//! Sinks consume rendered frames in timeline order and are fed by [`crate::Stage::render_range`].

pub(crate) mod ffmpeg;
pub(crate) mod sink;
