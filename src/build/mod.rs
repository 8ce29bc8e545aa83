mod driver;
mod feedback;
mod orchestrator;
mod paths;

pub use driver::{BuildResult, FailedStep, TargetBuilder, TargetState};
pub use feedback::FeedbackAnalyzer;
pub use orchestrator::{BuildOptions, BuildReport, build_project, run};
pub use paths::{CompileUnit, PathResolver};
