//! Established TCP connections from `/proc/net/tcp{,6}`.
//!
//! Sockets are tied to processes through the `socket:[inode]` links under
//! `/proc/<pid>/fd`. Connections whose owner cannot be determined are left
//! out.

#![cfg_attr(not(target_os = "linux"), allow(dead_code))]

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use vigil_core::ConnectionInfo;

/// Kernel state code for `TCP_ESTABLISHED`.
const ESTABLISHED: &str = "01";

/// One established socket read from a kernel TCP table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TcpEntry {
    pub remote: SocketAddr,
    pub inode: u64,
}

/// Established sockets in a `/proc/net/tcp` or `/proc/net/tcp6` table.
pub(crate) fn parse_table(contents: &str) -> Vec<TcpEntry> {
    contents.lines().skip(1).filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<TcpEntry> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 10 || fields[3] != ESTABLISHED {
        return None;
    }
    let remote = parse_socket_addr(fields[2])?;
    let inode = fields[9].parse().ok().filter(|&inode| inode != 0)?;
    Some(TcpEntry { remote, inode })
}

/// Decode `ADDR:PORT` as printed by the kernel: the address as native-endian
/// 32-bit hex words, the port as big-endian hex.
fn parse_socket_addr(field: &str) -> Option<SocketAddr> {
    let (addr, port) = field.split_once(':')?;
    let port = u16::from_str_radix(port, 16).ok()?;
    let ip = match addr.len() {
        8 => IpAddr::V4(Ipv4Addr::from(u32::from_str_radix(addr, 16).ok()?.to_ne_bytes())),
        32 => {
            let mut octets = [0u8; 16];
            for (chunk, word) in octets.chunks_exact_mut(4).zip(0..4) {
                let hex = addr.get(word * 8..word * 8 + 8)?;
                chunk.copy_from_slice(&u32::from_str_radix(hex, 16).ok()?.to_ne_bytes());
            }
            let v6 = Ipv6Addr::from(octets);
            v6.to_ipv4_mapped().map_or(IpAddr::V6(v6), IpAddr::V4)
        }
        _ => return None,
    };
    Some(SocketAddr::new(ip, port))
}

/// The inode of a `socket:[N]` fd link target.
pub(crate) fn socket_inode(target: &str) -> Option<u64> {
    target
        .strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

/// Pair table entries with the processes that own their sockets.
pub(crate) fn attribute(
    entries: &[TcpEntry],
    owners: &BTreeMap<u64, u32>,
    names: &BTreeMap<u32, String>,
) -> Vec<ConnectionInfo> {
    entries
        .iter()
        .filter_map(|entry| {
            let pid = owners.get(&entry.inode)?;
            let process = names.get(pid)?;
            Some(ConnectionInfo {
                process: process.clone(),
                remote_addr: entry.remote.to_string(),
            })
        })
        .collect()
}

/// Established connections owned by the given processes (pid to name).
#[cfg(target_os = "linux")]
pub(crate) fn established(names: &BTreeMap<u32, String>) -> Vec<ConnectionInfo> {
    use tracing::debug;

    let mut entries = Vec::new();
    for table in ["/proc/net/tcp", "/proc/net/tcp6"] {
        match std::fs::read_to_string(table) {
            Ok(contents) => entries.extend(parse_table(&contents)),
            Err(error) => debug!(table, %error, "tcp table unavailable"),
        }
    }
    if entries.is_empty() {
        return Vec::new();
    }

    let mut owners = BTreeMap::new();
    for &pid in names.keys() {
        // Other users' fd directories are unreadable without privileges.
        let Ok(fds) = std::fs::read_dir(format!("/proc/{pid}/fd")) else {
            continue;
        };
        for fd in fds.flatten() {
            if let Ok(target) = std::fs::read_link(fd.path())
                && let Some(inode) = target.to_str().and_then(socket_inode)
            {
                owners.insert(inode, pid);
            }
        }
    }

    attribute(&entries, &owners, names)
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn established(_names: &BTreeMap<u32, String>) -> Vec<ConnectionInfo> {
    Vec::new()
}
