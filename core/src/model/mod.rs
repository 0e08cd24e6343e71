pub mod adjoint;
pub mod event;
pub mod station;
pub mod trace;
pub mod window;

pub use adjoint::{
    AdjSrcType, AdjointRecord, AdjointRecordParameters, AdjointSource, ChannelWeights,
    StationAdjoint,
};
pub use event::{Event, Origin};
pub use station::{ChannelMetadata, StationGroup, StationMetadata, StationRecord};
pub use trace::{Stream, Trace, TraceId, TraceStats};
pub use window::{Window, WindowSet};
