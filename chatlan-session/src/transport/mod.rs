mod engine;
mod rtc_engine;
mod transport_config;
mod transport_event;

pub use engine::*;
pub use rtc_engine::*;
pub use transport_config::*;
pub use transport_event::*;
