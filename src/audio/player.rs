use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::engine::AudioEngine;
use crate::error::AudioError;

/// rodio-backed [`AudioEngine`].
///
/// The output stream is opened on the first `load` and kept for the life of
/// the player; each loaded track gets its own sink.
pub struct AudioPlayer {
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
    volume: f32,
    start_time: Option<Instant>,
    played: Duration,
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self {
            output: None,
            sink: None,
            volume: 1.0,
            start_time: None,
            played: Duration::ZERO,
        }
    }
}

impl AudioPlayer {
    pub fn is_paused(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| sink.is_paused())
    }

    /// Time the current track has been audible, excluding paused spans.
    pub fn progress(&self) -> Duration {
        match self.start_time {
            Some(start) if !self.is_paused() => self.played + start.elapsed(),
            _ => self.played,
        }
    }

    fn handle(&mut self) -> Result<&OutputStreamHandle, AudioError> {
        let output = match self.output.take() {
            Some(output) => output,
            None => {
                let output = OutputStream::try_default()?;
                info!("Opened default audio output");
                output
            }
        };
        Ok(&self.output.insert(output).1)
    }
}

impl AudioEngine for AudioPlayer {
    fn load(&mut self, path: &Path) -> Result<(), AudioError> {
        self.stop();

        let source = Decoder::new(BufReader::new(File::open(path)?))?;
        let sink = Sink::try_new(self.handle()?)?;
        sink.pause();
        sink.set_volume(self.volume);
        sink.append(source);

        debug!(path = %path.display(), "Loaded track");
        self.sink = Some(sink);
        Ok(())
    }

    fn play(&mut self) {
        if let Some(sink) = &self.sink {
            if sink.is_paused() || self.start_time.is_none() {
                sink.play();
                self.start_time = Some(Instant::now());
            }
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            if !sink.is_paused() {
                sink.pause();
                if let Some(start) = self.start_time.take() {
                    self.played += start.elapsed();
                }
            }
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.start_time = None;
        self.played = Duration::ZERO;
    }

    fn set_volume(&mut self, fraction: f32) {
        self.volume = fraction.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }
}
