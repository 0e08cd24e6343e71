pub mod archive;
pub mod dispatch;
pub mod preparer;
pub mod refine;

pub use archive::{check_input_file, check_output_file, Archive, ArchiveReader, OutputWriter};
pub use dispatch::{
    DispatchSummary, FailurePolicy, MatchedPairDispatcher, PairDispatcher, StationFn,
};
pub use preparer::{AdjointPreparer, RunState, DEFAULT_COMPONENTS};
pub use refine::{refine_param, refine_process_params, select_event};
