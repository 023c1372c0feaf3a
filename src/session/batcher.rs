/// Coalesces output chunks so they are rendered at most once per frame.
///
/// The first chunk after a flush schedules the next one; later chunks just
/// queue behind it.
#[derive(Debug, Default)]
pub struct FrameBatcher {
    pending: Vec<u8>,
    chunks: usize,
    scheduled: bool,
}

impl FrameBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chunk. Returns true if this chunk scheduled a flush.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        self.pending.extend_from_slice(chunk);
        self.chunks += 1;
        !std::mem::replace(&mut self.scheduled, true)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Chunks queued since the last flush
    pub fn queued_chunks(&self) -> usize {
        self.chunks
    }

    /// Take everything queued since the last flush
    pub fn take(&mut self) -> Option<Vec<u8>> {
        if !self.scheduled {
            return None;
        }
        self.scheduled = false;
        self.chunks = 0;
        Some(std::mem::take(&mut self.pending))
    }

    /// Drop queued output without rendering it
    pub fn clear(&mut self) {
        self.pending.clear();
        self.chunks = 0;
        self.scheduled = false;
    }
}
