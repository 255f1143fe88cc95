use std::fs::File;
use std::path::Path;
use std::time::Duration;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::DurationError;

/// Reads the total length of an audio file from its container header.
pub fn probe_duration(path: &Path) -> Result<Duration, DurationError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension() {
        hint.with_extension(&extension.to_string_lossy());
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let params = probed
        .format
        .default_track()
        .map(|track| &track.codec_params)
        .ok_or(DurationError::Unknown)?;

    match (params.n_frames, params.sample_rate) {
        (Some(n_frames), Some(sample_rate)) if sample_rate > 0 => {
            Ok(Duration::from_secs_f64(n_frames as f64 / sample_rate as f64))
        }
        _ => Err(DurationError::Unknown),
    }
}
