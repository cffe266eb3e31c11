//! Stage orchestration over the generative backend: isolation, outfit
//! composition, and composite refinement.

pub mod composition;
pub mod isolation;
pub mod refinement;

pub use composition::CompositionStage;
pub use isolation::IsolationStage;
pub use refinement::RefinementSession;
