use std::fmt;
use std::io::{self, Read, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use tracing::debug;

use super::errors::ResolveError;
use super::protocol::{DnsPacket, DnsRCode};

pub const DNS_PORT: u16 = 53;

// Big enough for the 4096-byte payload we advertise via EDNS
const MAX_RESPONSE_SIZE: usize = 4096;

// Where the next hop's query should go. Referrals hand us either glue
// addresses or bare nameserver hostnames that still need a bootstrap lookup
// through the platform resolver.
#[derive(Clone, PartialEq, Debug)]
pub enum Nameserver {
    Ip(Ipv4Addr),
    Name(String),
}

impl fmt::Display for Nameserver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Nameserver::Ip(ip) => write!(f, "{}", ip),
            Nameserver::Name(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Protocol {
    Udp,
    Tcp,
}

// The seam beneath the transport: real sockets in production, recorded
// transcripts in tests. Implementations exchange raw query bytes for raw
// response bytes against a single server.
pub trait Exchange {
    fn send_udp(&self, query: &[u8], server: Ipv4Addr) -> io::Result<Vec<u8>>;
    fn send_tcp(&self, query: &[u8], server: Ipv4Addr) -> io::Result<Vec<u8>>;
    // Resolve a nameserver hostname to an address using the platform's own
    // resolver. Only referral targets without glue go through here.
    fn bootstrap(&self, name: &str) -> io::Result<Ipv4Addr>;
}

// The standard-library socket implementation. Sockets are created per
// exchange and dropped on every exit path; nothing is pooled.
pub struct WireExchange {
    timeout: Duration,
}

impl WireExchange {
    pub fn new(timeout: Duration) -> WireExchange {
        WireExchange { timeout }
    }
}

impl Default for WireExchange {
    fn default() -> WireExchange {
        WireExchange::new(Duration::from_secs(3))
    }
}

impl Exchange for WireExchange {
    fn send_udp(&self, query: &[u8], server: Ipv4Addr) -> io::Result<Vec<u8>> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect((server, DNS_PORT))?;
        socket.send(query)?;

        // Wait out the timeout for a datagram whose transaction id echoes
        // the query's; anything else on the port is somebody else's answer
        let deadline = Instant::now() + self.timeout;
        let mut buf = [0u8; MAX_RESPONSE_SIZE];
        loop {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .filter(|d| !d.is_zero())
                .ok_or_else(|| io::Error::new(io::ErrorKind::TimedOut, "UDP receive timed out"))?;
            socket.set_read_timeout(Some(remaining))?;
            let amt = socket.recv(&mut buf)?;
            if amt >= 2 && buf[0..2] == query[0..2] {
                return Ok(buf[..amt].to_vec());
            }
            debug!(server = %server, "Discarding datagram with mismatched id");
        }
    }

    fn send_tcp(&self, query: &[u8], server: Ipv4Addr) -> io::Result<Vec<u8>> {
        let addr = SocketAddr::from((server, DNS_PORT));
        let mut stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        // RFC 1035 section 4.2.2: TCP messages carry a two-byte length
        // prefix in network order
        let len = query.len() as u16;
        let mut framed = Vec::with_capacity(query.len() + 2);
        framed.extend_from_slice(&len.to_be_bytes());
        framed.extend_from_slice(query);
        stream.write_all(&framed)?;

        let mut len_bytes = [0u8; 2];
        stream.read_exact(&mut len_bytes)?;
        let response_len = u16::from_be_bytes(len_bytes) as usize;
        let mut response = vec![0u8; response_len];
        stream.read_exact(&mut response)?;
        Ok(response)
    }

    fn bootstrap(&self, name: &str) -> io::Result<Ipv4Addr> {
        // ToSocketAddrs consults the system resolver, which is exactly the
        // bootstrap behavior we want for glueless referrals
        let addrs = (name, DNS_PORT).to_socket_addrs()?;
        for addr in addrs {
            if let IpAddr::V4(ip) = addr.ip() {
                return Ok(ip);
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no IPv4 address for nameserver {}", name),
        ))
    }
}

// The answer to one hop's query, paired with where it came from: the
// walker records the server address into the redirection history, and the
// report needs the wire size of the final message.
#[derive(Clone, PartialEq, Debug)]
pub struct ServerResponse {
    pub packet: DnsPacket,
    pub server: Ipv4Addr,
    pub wire_len: usize,
}

pub struct Transport<E: Exchange> {
    exchange: E,
}

impl<E: Exchange> Transport<E> {
    pub fn new(exchange: E) -> Transport<E> {
        Transport { exchange }
    }

    // Works through the candidate list in order until one server produces a
    // NOERROR response to `packet`. Per-server failures (bootstrap misses,
    // socket errors, timeouts, garbled or mismatched responses, non-zero
    // rcodes) advance to the next candidate; exhausting the list is a
    // resolution failure for `zone`.
    pub fn query(
        &self,
        zone: &str,
        packet: &DnsPacket,
        servers: &[Nameserver],
        protocol: Protocol,
    ) -> Result<ServerResponse, ResolveError> {
        let query_bytes = packet.to_bytes();
        for server in servers {
            let ip = match server {
                Nameserver::Ip(ip) => *ip,
                Nameserver::Name(name) => match self.exchange.bootstrap(name) {
                    Ok(ip) => ip,
                    Err(err) => {
                        debug!(nameserver = %name, error = %err, "Bootstrap resolution failed");
                        continue;
                    }
                },
            };
            match self.exchange_once(&query_bytes, packet.id, ip, protocol) {
                Ok(response) => {
                    if response.packet.flags.rcode == DnsRCode::NoError {
                        return Ok(response);
                    }
                    debug!(
                        server = %ip,
                        rcode = ?response.packet.flags.rcode,
                        "Server answered with an error rcode"
                    );
                }
                Err(err) => {
                    debug!(server = %ip, error = %err, "Exchange failed");
                }
            }
        }
        Err(ResolveError::Resolution {
            zone: zone.to_string(),
            servers: servers.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn exchange_once(
        &self,
        query: &[u8],
        id: u16,
        server: Ipv4Addr,
        protocol: Protocol,
    ) -> io::Result<ServerResponse> {
        let bytes = match protocol {
            Protocol::Udp => self.exchange.send_udp(query, server)?,
            Protocol::Tcp => self.exchange.send_tcp(query, server)?,
        };
        let mut response = Self::parse_response(&bytes, id, server)?;
        if response.packet.flags.tc_bit {
            if protocol == Protocol::Tcp {
                // A truncated TCP response is nonsense; fail the candidate
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "TC bit set on a TCP response",
                ));
            }
            // UDP truncation: same server again, over TCP
            debug!(server = %server, "Response truncated, retrying over TCP");
            let bytes = self.exchange.send_tcp(query, server)?;
            response = Self::parse_response(&bytes, id, server)?;
            if response.packet.flags.tc_bit {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "TC bit set on a TCP response",
                ));
            }
        }
        Ok(response)
    }

    fn parse_response(bytes: &[u8], id: u16, server: Ipv4Addr) -> io::Result<ServerResponse> {
        let packet = DnsPacket::from_bytes(bytes)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        if packet.id != id {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "response id does not match query",
            ));
        }
        Ok(ServerResponse {
            packet,
            server,
            wire_len: bytes.len(),
        })
    }
}
