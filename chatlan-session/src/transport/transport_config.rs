/// Settings for the WebRTC backed engine.
#[derive(Clone, Debug, Default)]
pub struct TransportConfig {
    /// STUN servers. Empty means local candidates only, which is all an
    /// offline LAN needs.
    pub ice_servers: Vec<String>,
    /// Also offer loopback candidates; useful when both ends run on one host.
    pub include_loopback: bool,
}
