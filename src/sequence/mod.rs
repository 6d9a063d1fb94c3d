pub mod block;
pub mod duration;
pub mod timeline;

pub use block::{ArbitraryShape, Block, Channel, ChannelDescriptor, DescriptorFault, Trapezoid};
pub use duration::DurationCache;
pub use timeline::{BlockId, BlockTimeline, Timeline, TimelineId};
