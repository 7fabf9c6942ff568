//! ICMP echo over unprivileged datagram sockets
//!
//! Datagram ICMP sockets (`SOCK_DGRAM` + `IPPROTO_ICMP`) let an ordinary user
//! send echo requests on Linux and macOS. On Linux the kernel rewrites the
//! identifier field, so replies are matched on sequence number only; the socket
//! is connected to the target so unrelated peers never reach us.
//!
//! Sized probes are measured as whole IP packets: the echo payload is shrunk by
//! the IP and ICMP header lengths so the datagram on the wire is exactly the
//! requested size, and it leaves with the don't-fragment bit set.

use crate::error::{ProbeError, ProbeResult};
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{ErrorKind, Read};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Payload size of a regular echo request, as sent by `ping`
pub const DEFAULT_ECHO_PAYLOAD: usize = 56;

const ICMP_HEADER_LEN: usize = 8;
const IPV4_HEADER_LEN: usize = 20;
const IPV6_HEADER_LEN: usize = 40;
const RECV_BUFFER_LEN: usize = 65_536;

const ICMPV4_ECHO_REPLY: u8 = 0;
const ICMPV4_ECHO_REQUEST: u8 = 8;
const ICMPV6_ECHO_REQUEST: u8 = 128;
const ICMPV6_ECHO_REPLY: u8 = 129;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    V4,
    V6,
}

impl Family {
    fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }

    /// IP plus ICMP header bytes of an echo request without options
    fn packet_overhead(self) -> usize {
        ICMP_HEADER_LEN
            + match self {
                Family::V4 => IPV4_HEADER_LEN,
                Family::V6 => IPV6_HEADER_LEN,
            }
    }
}

/// A matched echo reply
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoReply {
    pub rtt: Duration,
    /// Bytes of the reply as delivered by the socket
    pub bytes: usize,
}

/// Sends echo requests and waits for the matching reply
#[derive(Debug, Clone)]
pub struct IcmpPinger {
    identifier: u16,
    sequence: Arc<AtomicU16>,
}

impl Default for IcmpPinger {
    fn default() -> Self {
        Self::new()
    }
}

impl IcmpPinger {
    pub fn new() -> Self {
        Self {
            identifier: (std::process::id() & 0xffff) as u16,
            sequence: Arc::new(AtomicU16::new(1)),
        }
    }

    fn next_sequence(&self) -> u16 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    /// Send one echo request carrying `payload_len` bytes.
    ///
    /// `Ok(None)` means no reply arrived within `timeout`.
    pub async fn ping(
        &self,
        host: &str,
        payload_len: usize,
        timeout: Duration,
    ) -> ProbeResult<Option<EchoReply>> {
        let addr = resolve_host(host).await?;
        let sequence = self.next_sequence();
        let packet = build_echo_request(Family::of(&addr), self.identifier, sequence, payload_len);

        send_blocking(addr, sequence, packet, false, timeout).await
    }

    /// Send one unfragmentable echo request whose IP datagram is `packet_size`
    /// bytes long.
    ///
    /// `Ok(None)` means no reply arrived within `timeout`, or the local stack
    /// already knows the packet exceeds the path MTU.
    pub async fn probe_packet(
        &self,
        host: &str,
        packet_size: usize,
        timeout: Duration,
    ) -> ProbeResult<Option<EchoReply>> {
        let addr = resolve_host(host).await?;
        let family = Family::of(&addr);
        let sequence = self.next_sequence();
        let packet = sized_request(family, self.identifier, sequence, packet_size).ok_or_else(|| {
            ProbeError::sample(format!(
                "a {} byte packet cannot hold the {} bytes of IP and ICMP headers",
                packet_size,
                family.packet_overhead()
            ))
        })?;

        send_blocking(addr, sequence, packet, true, timeout).await
    }
}

async fn send_blocking(
    addr: IpAddr,
    sequence: u16,
    packet: Vec<u8>,
    dont_fragment: bool,
    timeout: Duration,
) -> ProbeResult<Option<EchoReply>> {
    tokio::task::spawn_blocking(move || echo_blocking(addr, sequence, &packet, dont_fragment, timeout))
        .await
        .map_err(|e| ProbeError::Panicked(e.to_string()))?
}

/// Resolve `host` to its first address; literal IPs skip the lookup
pub async fn resolve_host(host: &str) -> ProbeResult<IpAddr> {
    if let Ok(addr) = host.parse::<IpAddr>() {
        return Ok(addr);
    }

    let mut addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| ProbeError::unavailable(format!("cannot resolve target {}: {}", host, e)))?;

    addrs
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| ProbeError::unavailable(format!("no address found for target {}", host)))
}

fn echo_blocking(
    addr: IpAddr,
    sequence: u16,
    packet: &[u8],
    dont_fragment: bool,
    timeout: Duration,
) -> ProbeResult<Option<EchoReply>> {
    let family = Family::of(&addr);
    let (domain, protocol) = match family {
        Family::V4 => (Domain::IPV4, Protocol::ICMPV4),
        Family::V6 => (Domain::IPV6, Protocol::ICMPV6),
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(protocol))
        .map_err(|e| ProbeError::unavailable(format!("cannot open ICMP socket: {}", e)))?;
    if dont_fragment {
        set_dont_fragment(&socket, family)
            .map_err(|e| ProbeError::unavailable(format!("cannot forbid fragmentation: {}", e)))?;
    }
    socket.connect(&SocketAddr::new(addr, 0).into())?;

    let started = Instant::now();
    // No deadline when `timeout` reaches past what `Instant` can represent
    let deadline = started.checked_add(timeout);
    match socket.send(packet) {
        Ok(_) => {}
        Err(e) if exceeds_path_mtu(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let mut buffer = vec![0u8; RECV_BUFFER_LEN];
    loop {
        let read_timeout = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Ok(None);
                }
                Some(remaining)
            }
            None => None,
        };
        socket.set_read_timeout(read_timeout)?;

        let read = match (&socket).read(&mut buffer) {
            Ok(read) => read,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Ok(None)
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            // A "fragmentation needed" report from a router on the path
            Err(e) if exceeds_path_mtu(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if parse_echo_reply(family, &buffer[..read]) == Some(sequence) {
            return Ok(Some(EchoReply {
                rtt: started.elapsed(),
                bytes: read,
            }));
        }
    }
}

/// Forbid fragmentation so oversized packets are dropped instead of split
#[cfg(target_os = "linux")]
fn set_dont_fragment(socket: &Socket, family: Family) -> std::io::Result<()> {
    use std::os::fd::AsRawFd;

    let (level, name, value) = match family {
        Family::V4 => (libc::IPPROTO_IP, libc::IP_MTU_DISCOVER, libc::IP_PMTUDISC_DO),
        Family::V6 => (libc::IPPROTO_IPV6, libc::IPV6_MTU_DISCOVER, libc::IPV6_PMTUDISC_DO),
    };

    // SAFETY: the descriptor stays open for the duration of the call and the
    // option value is a live c_int of the advertised length.
    let rc = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            level,
            name,
            &value as *const libc::c_int as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };

    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(target_os = "linux"))]
fn set_dont_fragment(_socket: &Socket, _family: Family) -> std::io::Result<()> {
    Err(std::io::Error::new(
        ErrorKind::Unsupported,
        "path MTU probing needs IP_MTU_DISCOVER, which this platform lacks",
    ))
}

#[cfg(target_os = "linux")]
fn exceeds_path_mtu(error: &std::io::Error) -> bool {
    error.raw_os_error() == Some(libc::EMSGSIZE)
}

#[cfg(not(target_os = "linux"))]
fn exceeds_path_mtu(_error: &std::io::Error) -> bool {
    false
}

/// Echo request whose IP datagram totals `packet_size` bytes; `None` when the
/// headers alone do not fit
fn sized_request(family: Family, identifier: u16, sequence: u16, packet_size: usize) -> Option<Vec<u8>> {
    let payload_len = packet_size.checked_sub(family.packet_overhead())?;
    Some(build_echo_request(family, identifier, sequence, payload_len))
}

/// Build an echo request with a patterned payload
fn build_echo_request(family: Family, identifier: u16, sequence: u16, payload_len: usize) -> Vec<u8> {
    let mut packet = Vec::with_capacity(ICMP_HEADER_LEN + payload_len);
    packet.push(match family {
        Family::V4 => ICMPV4_ECHO_REQUEST,
        Family::V6 => ICMPV6_ECHO_REQUEST,
    });
    packet.push(0);
    packet.extend_from_slice(&[0, 0]);
    packet.extend_from_slice(&identifier.to_be_bytes());
    packet.extend_from_slice(&sequence.to_be_bytes());
    packet.extend((0..payload_len).map(|i| (i & 0xff) as u8));

    // ICMPv6 checksums cover a pseudo-header; the kernel fills those in
    if family == Family::V4 {
        let sum = checksum(&packet);
        packet[2..4].copy_from_slice(&sum.to_be_bytes());
    }
    packet
}

/// Sequence number of an echo reply, if `datagram` is one
fn parse_echo_reply(family: Family, datagram: &[u8]) -> Option<u16> {
    let icmp = match family {
        // Some platforms hand back the IPv4 header as well
        Family::V4 if datagram.len() >= IPV4_HEADER_LEN && datagram[0] >> 4 == 4 => {
            let header_len = ((datagram[0] & 0x0f) as usize) * 4;
            datagram.get(header_len..)?
        }
        _ => datagram,
    };

    if icmp.len() < ICMP_HEADER_LEN {
        return None;
    }

    let expected = match family {
        Family::V4 => ICMPV4_ECHO_REPLY,
        Family::V6 => ICMPV6_ECHO_REPLY,
    };
    if icmp[0] != expected {
        return None;
    }

    Some(u16::from_be_bytes([icmp[6], icmp[7]]))
}

/// RFC 1071 internet checksum
fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum += u16::from_be_bytes([word[0], word[1]]) as u32;
    }
    if let [last] = words.remainder() {
        sum += (*last as u32) << 8;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}
