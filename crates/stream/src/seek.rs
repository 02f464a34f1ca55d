//! Cursor movement
//!
//! Every mode is checked on its own against the stream length. A rejected
//! seek leaves the cursor where it was; nothing is clamped.

use crate::error::{Result, StreamError};

/// Seek origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekMode {
    /// From the start of the stream; target must be below the length
    Begin,
    /// Forward from the cursor; target must be below the length
    Relative,
    /// Backward from the end; `0` lands exactly on the length
    End,
}

/// Resolve a seek to an absolute position
pub fn resolve(current: usize, length: usize, offset: i64, mode: SeekMode) -> Result<usize> {
    let rejected = || StreamError::Seek {
        offset,
        mode,
        length,
    };

    if offset < 0 {
        return Err(rejected());
    }
    let offset = usize::try_from(offset).map_err(|_| rejected())?;

    match mode {
        SeekMode::Begin => {
            if offset >= length {
                return Err(rejected());
            }
            Ok(offset)
        }
        SeekMode::Relative => {
            let target = current.checked_add(offset).ok_or_else(rejected)?;
            if target >= length {
                return Err(rejected());
            }
            Ok(target)
        }
        SeekMode::End => length.checked_sub(offset).ok_or_else(rejected),
    }
}
