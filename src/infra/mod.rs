// ============================================================
// Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns used by both workflows:
//
//   matrix_store.rs — the self-describing binary format for
//                     the phi and theta matrices
//
//   reports.rs      — plain-text bipartitions / top-words /
//                     convergence-diagnostic exports

/// Binary phi/theta persistence
pub mod matrix_store;

/// Plain-text report writers
pub mod reports;
