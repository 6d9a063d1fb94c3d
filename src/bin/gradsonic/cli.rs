//! Command line options layered over a [`ListenConfig`]

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::Result as EyreResult;

use gradsonic::{GradientUnit, GridPolicy, ListenConfig, RateSource, TimeRange, TimeUnit};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GridArg {
    Global,
    PerSegment,
}

impl From<GridArg> for GridPolicy {
    fn from(arg: GridArg) -> Self {
        match arg {
            GridArg::Global => GridPolicy::Global,
            GridArg::PerSegment => GridPolicy::PerSegment,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "gradsonic", version, about = "Listen to the gradients of a block sequence")]
pub struct Args {
    /// Timeline description (JSON)
    pub timeline: PathBuf,

    /// Listen options (TOML); flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Time window in seconds, e.g. `--range 0 0.5` or `--range 1 inf`
    #[arg(long, num_args = 2, value_names = ["START", "END"], allow_negative_numbers = true)]
    pub range: Option<Vec<f64>>,

    /// Unit for reported times: s, ms or us
    #[arg(long)]
    pub time_disp: Option<TimeUnit>,

    /// Amplitude unit: kHz/m or mT/m
    #[arg(long)]
    pub grad_disp: Option<GradientUnit>,

    /// Output sample rate in Hz
    #[arg(long)]
    pub rate: Option<u32>,

    /// Sample at the reciprocal of the gradient raster time instead of --rate
    #[arg(long)]
    pub raster_rate: bool,

    /// Query grid policy
    #[arg(long, value_enum)]
    pub grid: Option<GridArg>,

    /// Track durations per block instead of assuming blocks are only appended
    #[arg(long)]
    pub general: bool,

    /// Play on the default output device
    #[arg(long)]
    pub play: bool,

    /// Directory to write seq.wav into
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Open the terminal preview after rendering
    #[arg(long)]
    pub preview: bool,
}

impl Args {
    /// Override `config` with every flag that was given.
    pub fn apply(&self, mut config: ListenConfig) -> EyreResult<ListenConfig> {
        if let Some(values) = &self.range {
            config.time_range = TimeRange::from_values(values)?;
        }
        if let Some(unit) = self.time_disp {
            config.time_disp = unit;
        }
        if let Some(unit) = self.grad_disp {
            config.grad_disp = unit;
        }
        if let Some(rate) = self.rate {
            config.rate = rate;
        }
        if self.raster_rate {
            config.rate_source = RateSource::Raster;
        }
        if let Some(grid) = self.grid {
            config.grid = grid.into();
        }
        if self.general {
            config.append_only = false;
        }
        if self.play {
            config.play = true;
        }
        if let Some(dir) = &self.save {
            config.save_path = Some(dir.clone());
        }
        Ok(config)
    }
}
