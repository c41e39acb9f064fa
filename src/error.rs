use std::collections::TryReserveError;
use std::fmt;

#[derive(Debug)]
pub enum FireError {
    /// The frame buffer pool could not be allocated.
    Alloc {
        bytes: usize,
        source: TryReserveError,
    },
}

impl fmt::Display for FireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireError::Alloc { bytes, .. } => {
                write!(f, "failed to allocate {} bytes of frame buffer memory", bytes)
            }
        }
    }
}

impl std::error::Error for FireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FireError::Alloc { source, .. } => Some(source),
        }
    }
}
