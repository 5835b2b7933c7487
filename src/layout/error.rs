use thiserror::Error;

/// Layout failures are reported to the caller; the session keeps its
/// previous working layout so the diagram does not disappear.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("flow graph contains a cycle involving stage {stage}")]
    CyclicTopology { stage: &'static str },
    #[error("canvas too small for layout: {width}x{height}")]
    DegenerateCanvas { width: i64, height: i64 },
}
