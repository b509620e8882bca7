// ============================================================
// Application Layer
// ============================================================
// Orchestrates the other layers to run one of the two
// workflows. No sampling math and no printing beyond final
// results — only coordination.

// The training workflow
pub mod train_use_case;

// The inference workflow
pub mod infer_use_case;
