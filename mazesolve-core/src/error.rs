//! Typed failure modes for the loader. Everything else that can go
//! "wrong" in a solver (no path, a soft reconstruction gap) is modeled
//! as data — a phase token or a logged diagnostic — not an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MazeError {
    #[error("malformed maze blob: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
