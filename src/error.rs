#[derive(Debug, thiserror::Error)]
pub enum OpfError {
    #[error("cannot list connections: {0}")]
    Platform(String),
    #[error("procfs error: {0}")]
    Procfs(#[source] std::io::Error),
    #[error("libproc error: {0}")]
    Libproc(String),
    #[error("output error: {0}")]
    Output(#[source] std::io::Error),
}
