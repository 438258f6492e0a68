//! Audio metadata probing
//!
//! Uses symphonia for format-agnostic duration extraction (MP3, FLAC, AAC,
//! WAV, OGG, ...). Decoding is blocking work, so the async entry point runs
//! it on the blocking pool; the caller suspends once and resumes exactly once
//! with the duration or a decode failure.

use mixtape_common::{Error, Result};
use std::path::{Path, PathBuf};
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Probe the duration (in seconds) of an audio file
pub async fn probe_duration(path: PathBuf) -> Result<f64> {
    tokio::task::spawn_blocking(move || probe_duration_sync(&path))
        .await
        .map_err(|e| Error::Internal(format!("Metadata task failed: {}", e)))?
}

/// Blocking duration probe
///
/// Fast path reads the frame count the container declares; formats that do
/// not declare one (typically MP3) fall back to a packet walk, which parses
/// but never decodes the stream.
fn probe_duration_sync(path: &Path) -> Result<f64> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Decode(format!("Failed to open audio file: {}", e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Format hint from the file extension
    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::Decode(format!("Unreadable audio: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Decode("No audio track found in file".to_string()))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    if let Some(n_frames) = params.n_frames {
        if let Some(tb) = params.time_base {
            let time = tb.calc_time(n_frames);
            return Ok(time.seconds as f64 + time.frac);
        }
        if let Some(rate) = params.sample_rate {
            return Ok(n_frames as f64 / rate as f64);
        }
    }

    // Packet walk fallback
    let tb = params
        .time_base
        .ok_or_else(|| Error::Decode("Track has no time base".to_string()))?;
    let mut total_ts = 0u64;
    loop {
        match format.next_packet() {
            Ok(packet) => {
                if packet.track_id() == track_id {
                    total_ts += packet.dur();
                }
            }
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(Error::Decode(format!("Failed reading audio: {}", e))),
        }
    }

    let time = tb.calc_time(total_ts);
    Ok(time.seconds as f64 + time.frac)
}
