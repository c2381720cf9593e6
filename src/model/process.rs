/// Result of looking a pid up in the live process table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessLookup {
    /// The process is alive; carries its name.
    Found(String),
    /// The process does not exist, usually because it exited after the snapshot.
    NotFound,
    /// The process exists but the OS refused to describe it.
    AccessDenied,
}

impl ProcessLookup {
    /// Name to show in scan listings. Failed lookups collapse to `"unknown"`.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Found(name) => name.as_str(),
            Self::NotFound | Self::AccessDenied => "unknown",
        }
    }

    /// Name to show in verbose reports, where access denial is spelled out.
    pub fn verbose_name(&self) -> &str {
        match self {
            Self::Found(name) => name.as_str(),
            Self::NotFound => "unknown",
            Self::AccessDenied => "access denied",
        }
    }
}

/// Result of a termination request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminateOutcome {
    Terminated,
    PermissionDenied,
    NotFound,
}
