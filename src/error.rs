/// Fatal errors. Everything else (blocked moves, full mailboxes, closed
/// queues) is a normal outcome, not an error.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("could not read map {}: {source}", path.display())]
    MapRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("map {} has no character spawn", path.display())]
    NoCharacter { path: PathBuf },

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}
