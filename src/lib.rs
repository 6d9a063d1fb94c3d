pub mod config; // Listen options and validation
pub mod error;
pub mod io; // Audio sinks (buffer, wav, playback)
pub mod listen;
pub mod render; // Breakpoint expansion, assembly and resampling
pub mod sequence; // Blocks, timelines and duration accounting
pub mod system;

pub use config::{GradientUnit, GridPolicy, ListenConfig, RateSource, TimeRange, TimeUnit};
pub use error::{ConfigError, Error, LoadError, Result, SinkError};
pub use listen::{listen, ListenExt, Rendered};
pub use sequence::{
    Block, BlockId, BlockTimeline, Channel, ChannelDescriptor, DurationCache, Timeline,
};
pub use system::{SystemConstants, SystemLimits};

/// Sample rate used when the caller does not ask for one.
pub const DEFAULT_RATE: u32 = 44_100;
