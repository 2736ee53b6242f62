use async_trait::async_trait;
use chatlan_session::EngineError;
use chatlan_session::transport::DataLink;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Open channel that remembers every frame sent on it.
#[derive(Default)]
pub struct RecordingLink {
    sent: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl RecordingLink {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DataLink for RecordingLink {
    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    async fn send_text(&self, text: &str) -> Result<(), EngineError> {
        if !self.is_open() {
            return Err(EngineError::ChannelNotOpen);
        }
        self.sent.lock().unwrap().push(text.to_owned());
        Ok(())
    }
}
