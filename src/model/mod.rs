pub mod process;
pub mod record;

pub use process::{ProcessLookup, TerminateOutcome};
pub use record::{
    ConnectionRecord, EnrichedPortRecord, Enrichment, FilterCriteria, Owner, PortRecord,
    ScanResult, Snapshot,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

/// Socket state as reported by the kernel. Only shown in debug logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocketState {
    // TCP states
    Closed,
    Listen,
    SynSent,
    SynReceived,
    Established,
    CloseWait,
    LastAck,
    FinWait1,
    FinWait2,
    Closing,
    TimeWait,
    // UDP states
    Bound,
    Connected,
}

impl std::fmt::Display for SocketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::Listen => write!(f, "LISTEN"),
            Self::SynSent => write!(f, "SYN_SENT"),
            Self::SynReceived => write!(f, "SYN_RECEIVED"),
            Self::Established => write!(f, "ESTABLISHED"),
            Self::CloseWait => write!(f, "CLOSE_WAIT"),
            Self::LastAck => write!(f, "LAST_ACK"),
            Self::FinWait1 => write!(f, "FIN_WAIT_1"),
            Self::FinWait2 => write!(f, "FIN_WAIT_2"),
            Self::Closing => write!(f, "CLOSING"),
            Self::TimeWait => write!(f, "TIME_WAIT"),
            Self::Bound => write!(f, "BOUND"),
            Self::Connected => write!(f, "CONNECTED"),
        }
    }
}
