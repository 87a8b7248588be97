mod all_analysis;
mod analysis;
mod common;

pub use all_analysis::AllAnalysisCommand;
pub use analysis::AnalysisCommand;
pub use common::CommonArgs;
pub use common::init_tracing;
