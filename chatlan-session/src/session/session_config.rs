use std::time::Duration;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// How long a handshake may take before its channel opens.
    pub handshake_timeout: Duration,
    pub sweep_interval: Duration,
    pub command_capacity: usize,
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(120),
            sweep_interval: Duration::from_secs(1),
            command_capacity: 100,
            event_capacity: 256,
        }
    }
}
