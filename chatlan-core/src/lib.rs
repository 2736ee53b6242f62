//! Data model and codecs for ChatLan: serverless group chat over direct peer
//! links whose setup data travels by QR code or copy and paste.

pub mod codec;
pub mod error;
pub mod model;
pub mod store;

pub use error::{EnvelopeError, FrameError, ProfileStoreError};
pub use model::*;
