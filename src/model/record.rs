use std::net::IpAddr;

use serde::Serialize;

use super::{Protocol, SocketState};

/// Who holds a socket, as far as the snapshot could tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Pid(u32),
    /// Some process holds the socket but the OS did not reveal which one,
    /// typically because it belongs to another user.
    Hidden,
    /// No process holds the socket. The kernel keeps it on its own, as with
    /// TCP sockets in TIME_WAIT.
    Unowned,
}

impl Owner {
    pub fn pid(self) -> Option<u32> {
        match self {
            Self::Pid(pid) => Some(pid),
            Self::Hidden | Self::Unowned => None,
        }
    }
}

/// One open socket as seen by the OS at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub protocol: Protocol,
    pub local_ip: IpAddr,
    pub local_port: u16,
    pub state: SocketState,
    pub owner: Owner,
}

/// Point-in-time list of open sockets, in the order the OS reported them.
///
/// A snapshot is never mutated after capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<ConnectionRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<ConnectionRecord>) -> Self {
        Self { records }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConnectionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<ConnectionRecord>> for Snapshot {
    fn from(records: Vec<ConnectionRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a ConnectionRecord;
    type IntoIter = std::slice::Iter<'a, ConnectionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Exact-match criteria on the local endpoint. `None` fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub ip: Option<IpAddr>,
    pub port: Option<u16>,
}

impl FilterCriteria {
    pub fn by_ip(ip: Option<IpAddr>) -> Self {
        Self { ip, port: None }
    }

    pub fn endpoint(ip: IpAddr, port: u16) -> Self {
        Self {
            ip: Some(ip),
            port: Some(port),
        }
    }

    pub fn matches(&self, record: &ConnectionRecord) -> bool {
        self.ip.is_none_or(|ip| record.local_ip == ip)
            && self.port.is_none_or(|port| record.local_port == port)
    }
}

/// Whether scan results carry process identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Enrichment {
    #[default]
    Off,
    ProcessNames,
}

/// Scan output row without process identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortRecord {
    #[serde(rename = "IP")]
    pub ip: IpAddr,
    #[serde(rename = "Port")]
    pub port: u16,
}

/// Scan output row with the owning process resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedPortRecord {
    #[serde(rename = "IP")]
    pub ip: IpAddr,
    #[serde(rename = "Port")]
    pub port: u16,
    #[serde(rename = "PID")]
    pub pid: Option<u32>,
    #[serde(rename = "Process Name")]
    pub process_name: String,
}

impl From<&ConnectionRecord> for PortRecord {
    fn from(record: &ConnectionRecord) -> Self {
        Self {
            ip: record.local_ip,
            port: record.local_port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
    Plain(Vec<PortRecord>),
    Enriched(Vec<EnrichedPortRecord>),
}

impl ScanResult {
    pub fn len(&self) -> usize {
        match self {
            Self::Plain(rows) => rows.len(),
            Self::Enriched(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn record(ip: [u8; 4], port: u16) -> ConnectionRecord {
        ConnectionRecord {
            protocol: Protocol::Tcp,
            local_ip: IpAddr::V4(Ipv4Addr::from(ip)),
            local_port: port,
            state: SocketState::Listen,
            owner: Owner::Hidden,
        }
    }

    #[test]
    fn empty_criteria_match_everything() {
        let criteria = FilterCriteria::default();
        assert!(criteria.matches(&record([127, 0, 0, 1], 80)));
        assert!(criteria.matches(&record([10, 0, 0, 1], 22)));
    }

    #[test]
    fn ip_criteria_is_exact() {
        let criteria = FilterCriteria::by_ip(Some("10.0.0.1".parse().unwrap()));
        assert!(criteria.matches(&record([10, 0, 0, 1], 22)));
        assert!(!criteria.matches(&record([10, 0, 0, 2], 22)));
        // No subnet semantics: the unspecified address is not a wildcard.
        assert!(!criteria.matches(&record([0, 0, 0, 0], 22)));
    }

    #[test]
    fn endpoint_criteria_requires_both() {
        let criteria = FilterCriteria::endpoint("10.0.0.1".parse().unwrap(), 22);
        assert!(criteria.matches(&record([10, 0, 0, 1], 22)));
        assert!(!criteria.matches(&record([10, 0, 0, 1], 23)));
        assert!(!criteria.matches(&record([10, 0, 0, 2], 22)));
    }

    #[test]
    fn only_known_owners_have_a_pid() {
        assert_eq!(Owner::Pid(42).pid(), Some(42));
        assert_eq!(Owner::Hidden.pid(), None);
        assert_eq!(Owner::Unowned.pid(), None);
    }

    #[test]
    fn scan_result_len() {
        assert!(ScanResult::Plain(Vec::new()).is_empty());
        let rows = vec![PortRecord::from(&record([127, 0, 0, 1], 80))];
        assert_eq!(ScanResult::Plain(rows).len(), 1);
    }

    #[test]
    fn plain_record_serializes_without_process_fields() {
        let row = PortRecord::from(&record([127, 0, 0, 1], 8080));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["IP"], "127.0.0.1");
        assert_eq!(json["Port"], 8080);
        assert!(json.get("PID").is_none());
        assert!(json.get("Process Name").is_none());
    }
}
