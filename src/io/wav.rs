use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use super::{to_f32, AudioSink};
use crate::error::SinkError;

/// File name written inside a save directory.
pub const WAV_FILE_NAME: &str = "seq.wav";

/// Writes the signal as a mono 32-bit float WAV file.
///
/// Amplitudes are written as rendered unless normalization is enabled, so a
/// file exported in mT/m still reads back in mT/m.
#[derive(Debug, Clone)]
pub struct WavSink {
    path: PathBuf,
    normalize: bool,
}

impl WavSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            normalize: false,
        }
    }

    /// Sink writing `seq.wav` inside `dir`, creating the directory on write.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(WAV_FILE_NAME))
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioSink for WavSink {
    fn consume(&mut self, samples: &[f64], rate: u32) -> Result<(), SinkError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|source| SinkError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }

        let spec = WavSpec {
            channels: 1,
            sample_rate: rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&self.path, spec)?;
        for sample in to_f32(samples, self.normalize) {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        log::info!(
            "Wrote {} samples at {rate} Hz to {}",
            samples.len(),
            self.path.display()
        );
        Ok(())
    }
}
