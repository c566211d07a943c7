// TonePlayer - seam between the test session and audio output

use crate::audiometry::ToneParameters;
use crate::error::AudioError;

/// Renders trial tones to some output
///
/// Implementations must stop on their own after `tone.duration_ms`; the
/// session never waits on playback.
pub trait TonePlayer {
    /// Start playing `tone`, cutting off anything still sounding
    fn play(&mut self, tone: &ToneParameters) -> Result<(), AudioError>;

    /// Silence output immediately
    fn stop(&mut self) {}
}

/// Headless player that records every tone it is asked to play
#[derive(Debug, Default, Clone)]
pub struct RecordingPlayer {
    played: Vec<ToneParameters>,
    stops: usize,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tones in the order they were played
    pub fn played(&self) -> &[ToneParameters] {
        &self.played
    }

    pub fn last(&self) -> Option<&ToneParameters> {
        self.played.last()
    }

    pub fn stop_count(&self) -> usize {
        self.stops
    }
}

impl TonePlayer for RecordingPlayer {
    fn play(&mut self, tone: &ToneParameters) -> Result<(), AudioError> {
        self.played.push(*tone);
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

impl<P: TonePlayer + ?Sized> TonePlayer for Box<P> {
    fn play(&mut self, tone: &ToneParameters) -> Result<(), AudioError> {
        (**self).play(tone)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
