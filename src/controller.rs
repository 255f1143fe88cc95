//! Playlist and playback bookkeeping.
//!
//! [`PlayerState`] holds the playlist, cursor and mode flags and computes the
//! next cursor for each intent. [`Controller`] applies those transitions,
//! drives an [`AudioEngine`] and queues [`ControllerEvent`]s for the UI to
//! pick up on its next frame.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::audio::engine::AudioEngine;
use crate::error::{ControllerError, Result};
use crate::utils::album_art::find_album_art;
use crate::utils::file_scanner::{AudioFileScanner, ScanOptions};

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// The playlist was replaced; re-render the track list.
    PlaylistChanged,
    /// The track at this index was loaded and started.
    NowPlaying(usize),
    ModesChanged { shuffle: bool, repeat: bool },
    /// Cover for the current track, or `None` to clear the art area.
    AlbumArtChanged(Option<PathBuf>),
    VolumeChanged(u8),
    /// A search found nothing; informational only.
    NoMatch(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    pub playlist: Vec<PathBuf>,
    pub cursor: usize,
    pub shuffle: bool,
    /// Stored and toggled but not consulted when advancing.
    pub repeat: bool,
    pub volume: u8,
}

impl PlayerState {
    fn ensure_tracks(&self) -> Result<usize> {
        match self.playlist.len() {
            0 => Err(ControllerError::EmptyPlaylist),
            len => Ok(len),
        }
    }

    /// Replaces the playlist and moves the cursor back to the first track.
    pub fn replace_playlist(&mut self, playlist: Vec<PathBuf>) {
        self.playlist = playlist;
        self.cursor = 0;
    }

    /// Whether `index` is the track under the cursor.
    pub fn is_current(&self, index: usize) -> bool {
        index < self.playlist.len() && index == self.cursor
    }

    pub fn current_track(&self) -> Option<&Path> {
        self.playlist.get(self.cursor).map(PathBuf::as_path)
    }

    /// Next cursor: uniform random under shuffle (may pick the current
    /// track again), otherwise the following track with wrap-around.
    pub fn next_index<R: Rng>(&self, rng: &mut R) -> Result<usize> {
        let len = self.ensure_tracks()?;
        if self.shuffle {
            Ok(rng.gen_range(0..len))
        } else {
            Ok((self.cursor + 1) % len)
        }
    }

    /// Previous cursor with wrap-around. Shuffle does not apply.
    pub fn previous_index(&self) -> Result<usize> {
        let len = self.ensure_tracks()?;
        Ok((self.cursor + len - 1) % len)
    }

    pub fn checked_index(&self, index: usize) -> Result<usize> {
        let len = self.ensure_tracks()?;
        if index < len {
            Ok(index)
        } else {
            Err(ControllerError::IndexOutOfRange { index, len })
        }
    }

    /// Lowest index whose full path contains `query`, ignoring case.
    pub fn find(&self, query: &str) -> Option<usize> {
        let query = query.to_lowercase();
        self.playlist
            .iter()
            .position(|path| path.to_string_lossy().to_lowercase().contains(&query))
    }

    pub fn display_names(&self) -> Vec<String> {
        self.playlist.iter().map(|path| display_name(path)).collect()
    }
}

/// File name shown for a track in the list and the song label.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Clamps a slider value into `0..=100`.
pub fn clamp_volume(percent: i32) -> u8 {
    percent.clamp(0, 100) as u8
}

pub struct Controller<E: AudioEngine> {
    state: PlayerState,
    engine: E,
    rng: StdRng,
    scan_options: ScanOptions,
    events: Vec<ControllerEvent>,
}

impl<E: AudioEngine> Controller<E> {
    pub fn new(engine: E, scan_options: ScanOptions) -> Self {
        Self::with_rng(engine, scan_options, StdRng::from_entropy())
    }

    pub fn with_rng(engine: E, scan_options: ScanOptions, rng: StdRng) -> Self {
        Self {
            state: PlayerState::default(),
            engine,
            rng,
            scan_options,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Takes every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Scans `dir` and makes the result the new playlist. Returns the number
    /// of tracks found.
    pub fn select_folder(&mut self, dir: &Path) -> usize {
        let tracks = AudioFileScanner::scan_directory(dir, &self.scan_options);
        info!(dir = %dir.display(), tracks = tracks.len(), "Loaded folder");
        self.load_playlist(tracks);
        self.state.playlist.len()
    }

    pub fn load_playlist(&mut self, tracks: Vec<PathBuf>) {
        self.state.replace_playlist(tracks);
        self.events.push(ControllerEvent::PlaylistChanged);
        self.events
            .push(ControllerEvent::AlbumArtChanged(self.album_art()));
    }

    /// Cover image for the track under the cursor.
    pub fn album_art(&self) -> Option<PathBuf> {
        self.state.current_track().and_then(find_album_art)
    }

    /// Loads and starts the track under the cursor.
    ///
    /// Engine failures are logged and otherwise swallowed; the song label is
    /// only updated when the track actually loaded.
    pub fn play(&mut self) -> Result<()> {
        let index = self.state.checked_index(self.state.cursor)?;
        let path = self.state.playlist[index].clone();

        match self.engine.load(&path) {
            Ok(()) => {
                self.engine.play();
                info!(index, track = %path.display(), "Playing");
                self.events.push(ControllerEvent::NowPlaying(index));
            }
            Err(err) => warn!(track = %path.display(), "Could not play track: {err}"),
        }
        self.events
            .push(ControllerEvent::AlbumArtChanged(find_album_art(&path)));
        Ok(())
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    /// Continues a paused track without reloading it.
    pub fn resume(&mut self) {
        self.engine.play();
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn next(&mut self) -> Result<()> {
        self.state.cursor = self.state.next_index(&mut self.rng)?;
        self.play()
    }

    pub fn previous(&mut self) -> Result<()> {
        self.state.cursor = self.state.previous_index()?;
        self.play()
    }

    pub fn select_track(&mut self, index: usize) -> Result<()> {
        self.state.cursor = self.state.checked_index(index)?;
        self.play()
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.state.shuffle = !self.state.shuffle;
        self.push_modes();
        self.state.shuffle
    }

    pub fn toggle_repeat(&mut self) -> bool {
        self.state.repeat = !self.state.repeat;
        self.push_modes();
        self.state.repeat
    }

    fn push_modes(&mut self) {
        debug!(
            shuffle = self.state.shuffle,
            repeat = self.state.repeat,
            "Modes changed"
        );
        self.events.push(ControllerEvent::ModesChanged {
            shuffle: self.state.shuffle,
            repeat: self.state.repeat,
        });
    }

    /// Sets the volume, clamping to `0..=100`. Returns the applied value.
    pub fn set_volume(&mut self, percent: i32) -> u8 {
        let volume = clamp_volume(percent);
        self.state.volume = volume;
        self.engine.set_volume(f32::from(volume) / 100.0);
        self.events.push(ControllerEvent::VolumeChanged(volume));
        volume
    }

    /// Jumps to and plays the first track whose path contains `query`.
    /// Returns the matched index, or `None` after queueing `NoMatch`.
    pub fn search(&mut self, query: &str) -> Result<Option<usize>> {
        match self.state.find(query) {
            Some(index) => {
                self.state.cursor = index;
                self.play()?;
                Ok(Some(index))
            }
            None => {
                debug!(query, "No matching track");
                self.events.push(ControllerEvent::NoMatch(query.to_string()));
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Load(PathBuf),
        Play,
        Pause,
        Stop,
        Volume(f32),
    }

    #[derive(Default)]
    struct FakeEngine {
        calls: Vec<Call>,
        fail_loads: bool,
    }

    impl AudioEngine for FakeEngine {
        fn load(&mut self, path: &Path) -> std::result::Result<(), AudioError> {
            if self.fail_loads {
                return Err(AudioError::Io(std::io::Error::from(
                    std::io::ErrorKind::NotFound,
                )));
            }
            self.calls.push(Call::Load(path.to_path_buf()));
            Ok(())
        }
        fn play(&mut self) {
            self.calls.push(Call::Play);
        }
        fn pause(&mut self) {
            self.calls.push(Call::Pause);
        }
        fn stop(&mut self) {
            self.calls.push(Call::Stop);
        }
        fn set_volume(&mut self, fraction: f32) {
            self.calls.push(Call::Volume(fraction));
        }
    }

    fn controller(paths: &[&str]) -> Controller<FakeEngine> {
        let mut c = Controller::with_rng(
            FakeEngine::default(),
            ScanOptions::default(),
            StdRng::seed_from_u64(7),
        );
        c.load_playlist(paths.iter().map(PathBuf::from).collect());
        c.drain_events();
        c
    }

    #[test]
    fn next_steps_through_two_tracks_and_wraps() {
        let mut c = controller(&["/a/song1.mp3", "/b/song2.wav"]);
        c.next().unwrap();
        assert_eq!(c.state().cursor, 1);
        c.next().unwrap();
        assert_eq!(c.state().cursor, 0);
    }

    #[test]
    fn next_len_times_returns_to_start() {
        for len in 1..6 {
            let paths: Vec<String> = (0..len).map(|i| format!("/m/{i}.mp3")).collect();
            let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
            for start in 0..len {
                let mut c = controller(&refs);
                c.select_track(start).unwrap();
                for _ in 0..len {
                    c.next().unwrap();
                }
                assert_eq!(c.state().cursor, start, "len {len}, start {start}");
            }
        }
    }

    #[test]
    fn previous_then_next_restores_cursor() {
        let mut c = controller(&["/m/a.mp3", "/m/b.mp3", "/m/c.mp3"]);
        for start in 0..3 {
            c.select_track(start).unwrap();
            c.previous().unwrap();
            c.next().unwrap();
            assert_eq!(c.state().cursor, start);
        }
    }

    #[test]
    fn previous_wraps_to_last_track() {
        let mut c = controller(&["/m/a.mp3", "/m/b.mp3", "/m/c.mp3"]);
        c.previous().unwrap();
        assert_eq!(c.state().cursor, 2);
    }

    #[test]
    fn shuffle_picks_indices_within_playlist() {
        let mut c = controller(&["/m/a.mp3", "/m/b.mp3", "/m/c.mp3", "/m/d.mp3"]);
        assert!(c.toggle_shuffle());
        let mut seen = [false; 4];
        for _ in 0..200 {
            c.next().unwrap();
            seen[c.state().cursor] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn previous_ignores_shuffle() {
        let mut c = controller(&["/m/a.mp3", "/m/b.mp3", "/m/c.mp3"]);
        c.toggle_shuffle();
        c.select_track(1).unwrap();
        c.previous().unwrap();
        assert_eq!(c.state().cursor, 0);
    }

    #[test]
    fn repeat_does_not_change_advancing() {
        let mut c = controller(&["/m/a.mp3", "/m/b.mp3"]);
        assert!(c.toggle_repeat());
        c.select_track(1).unwrap();
        c.next().unwrap();
        assert_eq!(c.state().cursor, 0);
        c.previous().unwrap();
        assert_eq!(c.state().cursor, 1);
    }

    #[test]
    fn toggling_modes_twice_restores_them() {
        let mut c = controller(&["/m/a.mp3"]);
        c.toggle_shuffle();
        c.toggle_shuffle();
        c.toggle_repeat();
        c.toggle_repeat();
        assert!(!c.state().shuffle);
        assert!(!c.state().repeat);

        let events = c.drain_events();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            ControllerEvent::ModesChanged {
                shuffle: true,
                repeat: false
            }
        );
    }

    #[test]
    fn play_loads_track_under_cursor_and_reports_it() {
        let mut c = controller(&["/m/a.mp3", "/m/b.mp3"]);
        c.select_track(1).unwrap();

        assert_eq!(
            c.engine().calls,
            vec![Call::Load(PathBuf::from("/m/b.mp3")), Call::Play]
        );
        assert_eq!(
            c.drain_events(),
            vec![
                ControllerEvent::NowPlaying(1),
                ControllerEvent::AlbumArtChanged(None)
            ]
        );
    }

    #[test]
    fn failed_load_is_swallowed_without_now_playing() {
        let mut c = controller(&["/m/missing.mp3"]);
        c.engine.fail_loads = true;

        assert_eq!(c.play(), Ok(()));
        assert!(c.engine().calls.is_empty());
        assert_eq!(c.drain_events(), vec![ControllerEvent::AlbumArtChanged(None)]);
    }

    #[test]
    fn empty_playlist_reports_explicit_error() {
        let mut c = controller(&[]);
        assert_eq!(c.play(), Err(ControllerError::EmptyPlaylist));
        assert_eq!(c.next(), Err(ControllerError::EmptyPlaylist));
        assert_eq!(c.previous(), Err(ControllerError::EmptyPlaylist));
        assert_eq!(c.select_track(0), Err(ControllerError::EmptyPlaylist));
        c.toggle_shuffle();
        assert_eq!(c.next(), Err(ControllerError::EmptyPlaylist));
        assert!(c.engine().calls.is_empty());
    }

    #[test]
    fn pause_resume_and_stop_forward_without_tracks() {
        let mut c = controller(&[]);
        c.pause();
        c.resume();
        c.stop();
        assert_eq!(c.engine().calls, vec![Call::Pause, Call::Play, Call::Stop]);
    }

    #[test]
    fn select_track_out_of_range_leaves_cursor() {
        let mut c = controller(&["/m/a.mp3", "/m/b.mp3"]);
        c.select_track(1).unwrap();
        assert_eq!(
            c.select_track(2),
            Err(ControllerError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(c.state().cursor, 1);
    }

    #[test]
    fn volume_boundaries_are_accepted_and_outliers_clamped() {
        let mut c = controller(&[]);
        assert_eq!(c.set_volume(0), 0);
        assert_eq!(c.set_volume(100), 100);
        assert_eq!(c.set_volume(-5), 0);
        assert_eq!(c.set_volume(250), 100);
        assert_eq!(c.set_volume(42), 42);
        assert_eq!(c.state().volume, 42);
        assert_eq!(
            c.engine().calls,
            vec![
                Call::Volume(0.0),
                Call::Volume(1.0),
                Call::Volume(0.0),
                Call::Volume(1.0),
                Call::Volume(0.42),
            ]
        );
    }

    #[test]
    fn search_picks_lowest_case_insensitive_match() {
        let mut c = controller(&["/rock/Intro.mp3", "/jazz/Blue.ogg", "/jazz/blue_two.wav"]);
        assert_eq!(c.search("BLUE"), Ok(Some(1)));
        assert_eq!(c.state().cursor, 1);
        // directories are part of the searched text
        assert_eq!(c.search("rock"), Ok(Some(0)));
        assert_eq!(c.state().cursor, 0);
    }

    #[test]
    fn search_without_match_only_signals() {
        let mut c = controller(&["/m/a.mp3", "/m/b.mp3"]);
        c.select_track(1).unwrap();
        c.drain_events();
        let calls_before = c.engine().calls.len();

        assert_eq!(c.search("zzz"), Ok(None));
        assert_eq!(c.state().cursor, 1);
        assert_eq!(c.engine().calls.len(), calls_before);
        assert_eq!(
            c.drain_events(),
            vec![ControllerEvent::NoMatch("zzz".to_string())]
        );
    }

    #[test]
    fn find_matches_exactly_the_lowest_index() {
        let state = PlayerState {
            playlist: vec!["/x/AbC.mp3".into(), "/x/abc.wav".into(), "/x/d.ogg".into()],
            ..PlayerState::default()
        };
        assert_eq!(state.find("abc"), Some(0));
        assert_eq!(state.find("D.OGG"), Some(2));
        assert_eq!(state.find(""), Some(0));
        assert_eq!(state.find("nope"), None);
        assert_eq!(PlayerState::default().find(""), None);
    }

    #[test]
    fn folder_scan_finds_track_and_its_cover() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("track.mp3"), b"x").unwrap();
        fs::write(dir.path().join("track.jpg"), b"x").unwrap();

        let mut c = controller(&[]);
        assert_eq!(c.select_folder(dir.path()), 1);
        assert_eq!(c.state().playlist, vec![dir.path().join("track.mp3")]);
        assert_eq!(c.album_art(), Some(dir.path().join("track.jpg")));
        assert_eq!(
            c.drain_events(),
            vec![
                ControllerEvent::PlaylistChanged,
                ControllerEvent::AlbumArtChanged(Some(dir.path().join("track.jpg"))),
            ]
        );
    }

    #[test]
    fn reselecting_folder_resets_cursor() {
        let big = tempdir().unwrap();
        for name in ["a.mp3", "b.mp3", "c.mp3"] {
            fs::write(big.path().join(name), b"x").unwrap();
        }
        let small = tempdir().unwrap();
        fs::write(small.path().join("only.wav"), b"x").unwrap();

        let mut c = controller(&[]);
        c.select_folder(big.path());
        c.select_track(2).unwrap();
        c.select_folder(small.path());

        assert_eq!(c.state().cursor, 0);
        assert_eq!(c.state().current_track(), Some(small.path().join("only.wav").as_path()));
    }

    #[test]
    fn empty_folder_clears_playlist_and_art() {
        let dir = tempdir().unwrap();
        let mut c = controller(&["/m/a.mp3"]);
        assert_eq!(c.select_folder(dir.path()), 0);
        assert!(c.state().playlist.is_empty());
        assert_eq!(
            c.drain_events(),
            vec![
                ControllerEvent::PlaylistChanged,
                ControllerEvent::AlbumArtChanged(None)
            ]
        );
    }

    #[test]
    fn cursor_track_is_the_only_current_one() {
        let mut c = controller(&["/m/a.mp3", "/m/a.mp3", "/m/b.mp3"]);
        c.select_track(1).unwrap();
        c.stop();

        let state = c.state();
        assert!(!state.is_current(0));
        assert!(state.is_current(1));
        assert!(!state.is_current(2));
        assert!(!PlayerState::default().is_current(0));
    }

    #[test]
    fn moving_to_a_track_with_cover_reports_its_art() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        fs::write(dir.path().join("b.mp3"), b"x").unwrap();
        fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        fs::write(dir.path().join("c.mp3"), b"x").unwrap();

        let mut c = controller(&[]);
        c.select_folder(dir.path());
        c.drain_events();

        c.next().unwrap();
        assert_eq!(
            c.drain_events(),
            vec![
                ControllerEvent::NowPlaying(1),
                ControllerEvent::AlbumArtChanged(Some(dir.path().join("b.jpg"))),
            ]
        );

        c.next().unwrap();
        assert_eq!(
            c.drain_events(),
            vec![
                ControllerEvent::NowPlaying(2),
                ControllerEvent::AlbumArtChanged(None),
            ]
        );

        assert_eq!(c.search("B.MP3"), Ok(Some(1)));
        assert_eq!(
            c.drain_events(),
            vec![
                ControllerEvent::NowPlaying(1),
                ControllerEvent::AlbumArtChanged(Some(dir.path().join("b.jpg"))),
            ]
        );
    }

    #[test]
    fn display_names_are_file_names() {
        let state = PlayerState {
            playlist: vec!["/a/song1.mp3".into(), "/b/c/song2.wav".into()],
            ..PlayerState::default()
        };
        assert_eq!(state.display_names(), vec!["song1.mp3", "song2.wav"]);
    }
}
