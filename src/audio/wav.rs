//! In-process WAV engine on top of `hound`

use async_trait::async_trait;
use hound::{SampleFormat, WavReader, WavWriter};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{AudioEngine, AudioError};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Sample-exact truncation and concatenation of PCM/float WAV files
///
/// Every part passed to `concat` must share the first part's spec.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEngine;

impl WavEngine {
    pub fn new() -> Self {
        Self
    }
}

fn frames_to_duration(frames: u32, sample_rate: u32) -> Duration {
    let nanos = u128::from(frames) * NANOS_PER_SEC / u128::from(sample_rate.max(1));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

fn duration_to_frames(limit: Duration, sample_rate: u32) -> u64 {
    let frames = limit.as_nanos() * u128::from(sample_rate) / NANOS_PER_SEC;
    u64::try_from(frames).unwrap_or(u64::MAX)
}

fn copy_samples<R, W>(
    reader: &mut WavReader<R>,
    writer: &mut WavWriter<W>,
    max_samples: u64,
) -> Result<(), AudioError>
where
    R: Read,
    W: Write + Seek,
{
    let limit = usize::try_from(max_samples).unwrap_or(usize::MAX);
    match reader.spec().sample_format {
        SampleFormat::Float => {
            for sample in reader.samples::<f32>().take(limit) {
                writer.write_sample(sample?)?;
            }
        }
        SampleFormat::Int => {
            for sample in reader.samples::<i32>().take(limit) {
                writer.write_sample(sample?)?;
            }
        }
    }
    Ok(())
}

fn probe_wav(path: &Path) -> Result<Duration, AudioError> {
    let reader = WavReader::open(path)?;
    Ok(frames_to_duration(reader.duration(), reader.spec().sample_rate))
}

fn truncate_wav(source: &Path, limit: Duration, dest: &Path) -> Result<(), AudioError> {
    let mut reader = WavReader::open(source)?;
    let spec = reader.spec();
    let max_samples =
        duration_to_frames(limit, spec.sample_rate).saturating_mul(u64::from(spec.channels));

    let mut writer = WavWriter::create(dest, spec)?;
    copy_samples(&mut reader, &mut writer, max_samples)?;
    writer.finalize()?;
    Ok(())
}

fn concat_wav(parts: &[PathBuf], dest: &Path) -> Result<(), AudioError> {
    let first = parts.first().ok_or(AudioError::EmptyMix)?;
    let spec = WavReader::open(first)?.spec();

    let mut writer = WavWriter::create(dest, spec)?;
    for part in parts {
        let mut reader = WavReader::open(part)?;
        if reader.spec() != spec {
            return Err(AudioError::FormatMismatch { path: part.clone() });
        }
        copy_samples(&mut reader, &mut writer, u64::MAX)?;
    }
    writer.finalize()?;
    Ok(())
}

async fn blocking<T, F>(work: F) -> Result<T, AudioError>
where
    F: FnOnce() -> Result<T, AudioError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AudioError::Task(e.to_string()))?
}

#[async_trait]
impl AudioEngine for WavEngine {
    fn format(&self) -> &'static str {
        "wav"
    }

    async fn probe(&self, path: &Path) -> Result<Duration, AudioError> {
        let path = path.to_path_buf();
        blocking(move || probe_wav(&path)).await
    }

    async fn truncate(
        &self,
        source: &Path,
        limit: Duration,
        dest: &Path,
    ) -> Result<(), AudioError> {
        let (source, dest) = (source.to_path_buf(), dest.to_path_buf());
        blocking(move || truncate_wav(&source, limit, &dest)).await
    }

    async fn concat(&self, parts: &[PathBuf], dest: &Path) -> Result<(), AudioError> {
        let (parts, dest) = (parts.to_vec(), dest.to_path_buf());
        blocking(move || concat_wav(&parts, &dest)).await
    }
}
