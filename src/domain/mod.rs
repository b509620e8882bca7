// ============================================================
// Domain Layer
// ============================================================
// Pure structs and traits defining what the system operates on.
//
// Rules for this layer:
//   - No file I/O
//   - No sampling math
//   - Only plain Rust structs, enums, and traits

// A document in word-id form
pub mod document;

// An ordered set of documents plus derived dimensions
pub mod corpus;

// The corpus-loading seam
pub mod traits;
