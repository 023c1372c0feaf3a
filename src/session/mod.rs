//! Session registry and the per-session I/O pipeline.
//!
//! Output flows `PtyEvent → FrameBatcher → Utf8StreamDecoder → OutputBuffer`,
//! flushed at most once per display frame. Resizes are debounced and the
//! initial prompt is injected exactly once.

pub mod batcher;
pub mod buffer;
pub mod debounce;
pub mod decoder;
pub mod error;
pub mod injection;
pub mod input;
pub mod key;
pub mod registry;
#[allow(clippy::module_inception)]
pub mod session;

pub use batcher::FrameBatcher;
pub use buffer::OutputBuffer;
pub use debounce::Debouncer;
pub use decoder::Utf8StreamDecoder;
pub use error::SessionError;
pub use injection::InitialInput;
pub use input::encode_input;
pub use key::SessionKey;
pub use registry::{SessionRegistry, SpawnParams};
pub use session::Session;
