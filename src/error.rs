use thiserror::Error;
use std::path::PathBuf;

#[derive(Error, Debug)]
pub enum VcatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Standard output is a TTY!")]
    StdoutIsTty,

    #[error("Standard error is not a TTY!")]
    StderrNotTty,

    #[error("Invalid terminal width: {width} (max: {max})")]
    InvalidWidth { width: u16, max: u16 },

    #[error("{}: Is a directory.", .0.display())]
    IsDirectory(PathBuf),

    #[error("{}: {}", path.display(), source)]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, VcatError>;
