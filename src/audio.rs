//! Completion chime played through the default audio output.

use rodio::source::{SineWave, Source, Zero};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::time::Duration;
use thiserror::Error;

const SAMPLE_RATE: u32 = 44_100;
const VOLUME: f32 = 0.25;
const GAP: Duration = Duration::from_millis(40);

/// One tone of the chime.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Note {
    hz: f32,
    millis: u64,
}

/// Rising C major arpeggio, last note held.
const CHIME: [Note; 3] = [
    Note { hz: 523.25, millis: 120 },
    Note { hz: 659.25, millis: 120 },
    Note { hz: 783.99, millis: 260 },
];

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("Could not queue chime: {0}")]
    Play(#[from] rodio::PlayError),
}

/// Owns the output stream; dropping it silences anything still queued.
pub struct AudioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioPlayer {
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Queues the chime and returns without waiting for it.
    pub fn play_chime(&self) {
        if let Err(e) = self.queue(&CHIME) {
            tracing::warn!(error = %e, "failed to play chime");
        }
    }

    fn queue(&self, notes: &[Note]) -> Result<(), AudioError> {
        let sink = Sink::try_new(&self.handle)?;
        for (i, note) in notes.iter().enumerate() {
            if i > 0 {
                sink.append(Zero::<f32>::new(1, SAMPLE_RATE).take_duration(GAP));
            }
            let duration = Duration::from_millis(note.millis);
            sink.append(
                SineWave::new(note.hz)
                    .take_duration(duration)
                    .fade_in(duration / 8)
                    .amplify(VOLUME),
            );
        }
        sink.detach();
        Ok(())
    }
}
