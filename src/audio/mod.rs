// Audio module - tone rendering, WAV export and playback backends

#[cfg(feature = "playback")]
pub mod cpal_player;
pub mod player;
pub mod synth;
pub mod wav;

// Re-export commonly used types for convenience
#[cfg(feature = "playback")]
pub use cpal_player::CpalPlayer;
pub use player::{RecordingPlayer, TonePlayer};
pub use synth::{frame_count, render_tone};
pub use wav::write_tone_wav;
