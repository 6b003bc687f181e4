use std::io;
use thiserror::Error;

/// Startup failures that abort before the alternate screen is entered.
#[derive(Debug, Error)]
pub(crate) enum InitError {
    #[error("stdout is not a terminal")]
    NotATerminal,

    #[error("terminal too small: {cols}x{rows} (need at least {min_cols}x{min_rows})")]
    TooSmall {
        cols: u16,
        rows: u16,
        min_cols: u16,
        min_rows: u16,
    },

    #[error("could not query terminal size")]
    Size(#[source] io::Error),
}

#[derive(Debug, Error)]
pub(crate) enum AudioError {
    #[error("audio command is empty")]
    EmptyCommand,

    #[error("failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}
