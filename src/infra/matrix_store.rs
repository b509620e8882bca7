// ============================================================
// Infra — Binary Matrix Store
// ============================================================
// Saves and restores the phi/theta matrices in a small
// self-describing binary format:
//
//   bytes 0..4   magic  "LDAM"
//   bytes 4..8   format version, u32 little-endian
//   bytes 8..16  rows,  u64 little-endian
//   bytes 16..24 cols,  u64 little-endian
//   bytes 24..   rows*cols f64 values, row-major, little-endian
//
// Little-endian f64 bit patterns round-trip exactly, so a
// loaded matrix is bit-for-bit the one that was saved.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

const MAGIC: [u8; 4] = *b"LDAM";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 24;

/// Serialize a rectangular matrix. Ragged input is a caller bug and
/// is rejected rather than silently truncated.
pub fn save_matrix(path: &Path, matrix: &[Vec<f64>]) -> Result<()> {
    let rows = matrix.len();
    let cols = matrix.first().map_or(0, Vec::len);
    if matrix.iter().any(|row| row.len() != cols) {
        bail!("matrix for '{}' has ragged rows", path.display());
    }

    let mut bytes = Vec::with_capacity(HEADER_LEN + rows * cols * 8);
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    bytes.extend_from_slice(&(rows as u64).to_le_bytes());
    bytes.extend_from_slice(&(cols as u64).to_le_bytes());
    for row in matrix {
        for &value in row {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }

    fs::write(path, bytes)
        .with_context(|| format!("Cannot write matrix to '{}'", path.display()))
}

/// Load a matrix written by `save_matrix`, verifying magic, version,
/// and payload length before trusting the dimensions.
pub fn load_matrix(path: &Path) -> Result<Vec<Vec<f64>>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Cannot read matrix from '{}'", path.display()))?;

    if bytes.len() < HEADER_LEN {
        bail!("'{}' is too short to be a matrix file", path.display());
    }
    if bytes[0..4] != MAGIC {
        bail!("'{}' is not a matrix file (bad magic)", path.display());
    }
    let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    if version != VERSION {
        bail!("'{}' has unsupported format version {version}", path.display());
    }
    let rows = u64::from_le_bytes(bytes[8..16].try_into().unwrap()) as usize;
    let cols = u64::from_le_bytes(bytes[16..24].try_into().unwrap()) as usize;

    let expected = HEADER_LEN + rows.checked_mul(cols).and_then(|n| n.checked_mul(8))
        .with_context(|| format!("'{}' declares absurd dimensions", path.display()))?;
    if bytes.len() != expected {
        bail!(
            "'{}' declares {rows}x{cols} but holds {} payload bytes",
            path.display(),
            bytes.len() - HEADER_LEN,
        );
    }

    let mut matrix = Vec::with_capacity(rows);
    let mut offset = HEADER_LEN;
    for _ in 0..rows {
        let mut row = Vec::with_capacity(cols);
        for _ in 0..cols {
            row.push(f64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap()));
            offset += 8;
        }
        matrix.push(row);
    }
    Ok(matrix)
}
