//! Filter and enrichment over a captured [`Snapshot`].
//!
//! All functions here are pure with respect to the snapshot: they never
//! reorder it, never deduplicate it, and only touch the OS through the
//! injected [`ProcessResolver`].

use std::net::IpAddr;

use crate::model::{
    ConnectionRecord, EnrichedPortRecord, Enrichment, FilterCriteria, Owner, PortRecord,
    ProcessLookup, ScanResult, Snapshot,
};
use crate::process::ProcessResolver;

/// List the snapshot's records, optionally restricted to one local IP.
///
/// With `Enrichment::Off` the resolver is never called and the rows carry
/// no process fields at all. With `Enrichment::ProcessNames` every retained
/// row is resolved; failed lookups are named `"unknown"`.
pub fn scan(
    snapshot: &Snapshot,
    ip: Option<IpAddr>,
    enrichment: Enrichment,
    resolver: &dyn ProcessResolver,
) -> ScanResult {
    let criteria = FilterCriteria::by_ip(ip);
    let retained = snapshot.iter().filter(|r| criteria.matches(r));

    match enrichment {
        Enrichment::Off => ScanResult::Plain(retained.map(PortRecord::from).collect()),
        Enrichment::ProcessNames => ScanResult::Enriched(
            retained
                .map(|record| {
                    let lookup = lookup_owner(record, resolver);
                    EnrichedPortRecord {
                        ip: record.local_ip,
                        port: record.local_port,
                        pid: record.owner.pid(),
                        process_name: lookup.display_name().to_string(),
                    }
                })
                .collect(),
        ),
    }
}

/// First record, in snapshot order, bound to exactly `ip`:`port`.
///
/// Several sockets may share an endpoint; only the first is ever returned.
pub fn check(snapshot: &Snapshot, ip: IpAddr, port: u16) -> Option<&ConnectionRecord> {
    let criteria = FilterCriteria::endpoint(ip, port);
    snapshot.iter().find(|r| criteria.matches(r))
}

/// Resolve the owner of `record`.
///
/// A hidden owner is access denied. A socket no process holds has no
/// process to find. Neither case reaches the resolver.
pub fn lookup_owner(record: &ConnectionRecord, resolver: &dyn ProcessResolver) -> ProcessLookup {
    match record.owner {
        Owner::Pid(pid) => resolver.resolve(pid),
        Owner::Hidden => ProcessLookup::AccessDenied,
        Owner::Unowned => ProcessLookup::NotFound,
    }
}
