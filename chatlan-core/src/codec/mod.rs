pub mod envelope;
pub mod sdp;
