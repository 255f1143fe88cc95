use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions accepted as playable audio, compared case-insensitively.
pub const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "ogg", "wav"];

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Depth cap below the chosen folder; `None` walks the whole tree.
    pub max_depth: Option<usize>,
    pub follow_links: bool,
}

pub struct AudioFileScanner;

impl AudioFileScanner {
    /// Recursively collects audio files under `dir` in discovery order.
    ///
    /// Within each folder, files come before subfolders and both are sorted
    /// by name, so the order does not depend on the file system. Links to
    /// files are listed even when `follow_links` is off. Unreadable entries
    /// are skipped.
    pub fn scan_directory(dir: &Path, options: &ScanOptions) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(options.follow_links)
            .sort_by(|a, b| {
                a.file_type()
                    .is_dir()
                    .cmp(&b.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            });
        if let Some(depth) = options.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut audio_files = Vec::new();
        for entry in walker.into_iter() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry: {err}");
                    continue;
                }
            };

            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if is_file && Self::is_audio_file(entry.path()) {
                audio_files.push(entry.into_path());
            }
        }

        debug!(dir = %dir.display(), found = audio_files.len(), "Scanned folder");
        audio_files
    }

    pub fn is_audio_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                AUDIO_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
    }
}
