#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read config file {path}: {source}", path = path.display())]
    ConfigRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    ConfigParse(serde_json::Error),
    #[error("failed to prepare library root {path}: {source}", path = path.display())]
    LibraryRoot {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to query free space: {0}")]
    FreeSpace(std::io::Error),
    #[error(transparent)]
    Files(#[from] holdings_files::FilesError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
