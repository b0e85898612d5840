// The referral walker: drives the descent from the root servers to an
// authoritative answer, one zone cut per hop, recording which server
// produced each referral so the DNSSEC validator can retrace the path.

mod report;
mod root;

pub use report::Resolution;
pub use root::ROOT_SERVERS;

use std::env;
use std::fs;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::dnssec::{ChainValidator, TrustAnchor};
use super::errors::ResolveError;
use super::protocol::{names, DnsPacket, DnsRecordData, DnsResourceRecord, DnsRRType};
use super::transport::{Exchange, Nameserver, Protocol, Transport, WireExchange};

// How many CNAME restarts we'll follow before declaring the chain circular
const MAX_ALIAS_DEPTH: usize = 8;

// Everything a resolver needs up front. Root hints and trust anchors are
// plain data here so tests can substitute their own hierarchy.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    pub root_hints: Vec<Ipv4Addr>,
    pub trust_anchors: Vec<TrustAnchor>,
    pub dnssec: bool,
    // Per-attempt socket timeout
    pub timeout: Duration,
    // Where per-query log files land; None disables them
    pub log_dir: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> ResolverConfig {
        ResolverConfig {
            root_hints: ROOT_SERVERS.to_vec(),
            trust_anchors: TrustAnchor::root_anchors(),
            dnssec: false,
            timeout: Duration::from_secs(3),
            log_dir: default_log_dir(),
        }
    }
}

// The original tool kept its logs/ directory beside the script; we keep it
// beside the executable, falling back to the working directory when the
// executable path is unavailable.
fn default_log_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("logs")))
        .or_else(|| Some(PathBuf::from("logs")))
}

// One entry of the redirection history: the server that answered a hop,
// plus the zone that server was reached as an authority for (the root for
// hop zero, then the owner name of each delegation followed). The DNSSEC
// validator replays DNSKEY/DS queries against these.
#[derive(Clone, PartialEq, Debug)]
pub struct Hop {
    pub server: Ipv4Addr,
    pub zone: Vec<String>,
}

// What a completed walk hands back: the final response, the records of the
// requested type pulled from it, and the path taken.
pub(crate) struct Walk {
    pub qname: Vec<String>,
    pub records: Vec<DnsResourceRecord>,
    pub response: DnsPacket,
    pub history: Vec<Hop>,
    pub wire_len: usize,
}

pub struct Resolver<E: Exchange> {
    config: ResolverConfig,
    transport: Transport<E>,
    cancel: Option<Arc<AtomicBool>>,
    logs: Vec<String>,
}

impl Resolver<WireExchange> {
    pub fn new(config: ResolverConfig) -> Resolver<WireExchange> {
        let exchange = WireExchange::new(config.timeout);
        Resolver::with_exchange(config, exchange)
    }
}

impl<E: Exchange> Resolver<E> {
    // Construction seam for tests: any Exchange implementation, typically a
    // recorded transcript
    pub fn with_exchange(config: ResolverConfig, exchange: E) -> Resolver<E> {
        Resolver {
            config,
            transport: Transport::new(exchange),
            cancel: None,
            logs: Vec::new(),
        }
    }

    // Cooperative cancellation: the flag is checked between I/O operations,
    // never mid-exchange
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        self.cancel = Some(flag);
    }

    pub fn resolve(&mut self, hostname: &str, rtype: &str) -> Result<Resolution, ResolveError> {
        // Type validation happens before any socket is touched
        let qtype = match rtype {
            "A" => DnsRRType::A,
            "NS" => DnsRRType::NS,
            "MX" => DnsRRType::MX,
            other => return Err(ResolveError::ResourceRecordType(other.to_string())),
        };

        let when = chrono::Local::now().format("%a %b %d %H:%M:%S %Y").to_string();
        let started = Instant::now();

        let qname = normalize_hostname(hostname);
        let display = names::display_name(&qname);
        self.logs.clear();
        self.log(format!("Querying '{}' for {}-record\n", display, rtype));

        let walk = self.walk(&qname, qtype, 0)?;

        if self.config.dnssec {
            let validator = ChainValidator::new(&self.transport, &self.config.trust_anchors);
            validator.check_trust(&walk.qname, &walk.response, &walk.history)?;
        }

        let resolution = Resolution {
            qname: names::display_name(&walk.qname),
            qtype: rtype.to_string(),
            records: walk.records,
            query_time_ms: started.elapsed().as_millis(),
            when,
            msg_size: walk.wire_len,
        };

        self.log(resolution.to_string());
        self.flush_logs(&walk.qname, rtype);
        Ok(resolution)
    }

    fn walk(&mut self, qname: &[String], qtype: DnsRRType, depth: usize) -> Result<Walk, ResolveError> {
        let display = names::display_name(qname);
        let mut servers: Vec<Nameserver> = self
            .config
            .root_hints
            .iter()
            .map(|ip| Nameserver::Ip(*ip))
            .collect();
        // The zone of authority the current candidates were reached for;
        // hop zero talks to the root
        let mut zone: Vec<String> = Vec::new();
        let mut history: Vec<Hop> = Vec::new();
        let mut last = None;

        // One hop per non-root label is the deepest any referral chain for
        // this name can go
        let hops = qname.len().max(1);
        for _ in 0..hops {
            self.check_cancelled()?;
            let query = DnsPacket::query(rand::random(), qname.to_vec(), qtype, self.config.dnssec);
            let response = self.transport.query(&display, &query, &servers, Protocol::Udp)?;
            self.log(format!("Redirecting to {}", response.server));
            history.push(Hop {
                server: response.server,
                zone: zone.clone(),
            });

            // An alias answer restarts the whole descent at the target name
            if let Some(target) = cname_target(&response.packet, qtype) {
                if depth >= MAX_ALIAS_DEPTH {
                    return Err(ResolveError::Resolution {
                        zone: display.clone(),
                        servers: servers.iter().map(|s| s.to_string()).collect(),
                    });
                }
                debug!(cname = %names::display_name(&target), "Following CNAME");
                return self.walk(&target, qtype, depth + 1);
            }

            // An answer of the requested type means this server was
            // authoritative; the walk is over
            if response.packet.answers.iter().any(|rr| rr.rr_type == qtype) {
                let records = records_of_type(&response.packet, qtype);
                return Ok(Walk {
                    qname: qname.to_vec(),
                    records,
                    wire_len: response.wire_len,
                    response: response.packet,
                    history,
                });
            }

            // Otherwise this is a referral: prefer glue addresses from the
            // additional section, fall back to bare NS names the transport
            // will bootstrap-resolve
            let ns_targets: Vec<Vec<String>> = response
                .packet
                .nameservers
                .iter()
                .filter_map(|rr| match &rr.record {
                    DnsRecordData::NS(target) => Some(target.clone()),
                    _ => None,
                })
                .collect();
            let glue: Vec<Ipv4Addr> = response
                .packet
                .addl_recs
                .iter()
                .filter(|rr| ns_targets.iter().any(|t| names_equal_rr(rr, t)))
                .filter_map(|rr| match &rr.record {
                    DnsRecordData::A(ip) => Some(*ip),
                    _ => None,
                })
                .collect();
            let child_zone = response
                .packet
                .nameservers
                .iter()
                .find(|rr| rr.rr_type == DnsRRType::NS)
                .map(|rr| rr.name.clone());

            if !glue.is_empty() {
                servers = glue.into_iter().map(Nameserver::Ip).collect();
            } else if !ns_targets.is_empty() {
                servers = ns_targets
                    .iter()
                    .map(|t| Nameserver::Name(names::display_name(t)))
                    .collect();
            } else {
                // Neither an answer nor a referral; whatever this response
                // holds is as far as the hierarchy goes
                last = Some(response);
                break;
            }
            if let Some(child) = child_zone {
                zone = child;
            }
            last = Some(response);
        }

        // The hop allowance is spent. NS answers often sit in the authority
        // section of the last referral; A and MX need one more query
        // against the servers the walk ended on.
        let mut final_response = match last {
            Some(response) => response,
            None => {
                return Err(ResolveError::Resolution {
                    zone: display,
                    servers: servers.iter().map(|s| s.to_string()).collect(),
                })
            }
        };
        let mut records = records_of_type(&final_response.packet, qtype);
        if records.is_empty() && (qtype == DnsRRType::A || qtype == DnsRRType::MX) {
            self.check_cancelled()?;
            let query = DnsPacket::query(rand::random(), qname.to_vec(), qtype, self.config.dnssec);
            let response = self.transport.query(&display, &query, &servers, Protocol::Udp)?;
            self.log(format!("Redirecting to {}", response.server));
            history.push(Hop {
                server: response.server,
                zone: zone.clone(),
            });
            records = records_of_type(&response.packet, qtype);
            final_response = response;
        }

        if records.is_empty() {
            return Err(ResolveError::Resolution {
                zone: display,
                servers: servers.iter().map(|s| s.to_string()).collect(),
            });
        }

        Ok(Walk {
            qname: qname.to_vec(),
            records,
            wire_len: final_response.wire_len,
            response: final_response.packet,
            history,
        })
    }

    fn check_cancelled(&self) -> Result<(), ResolveError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(ResolveError::Cancelled),
            _ => Ok(()),
        }
    }

    fn log(&mut self, message: String) {
        self.logs.push(message);
    }

    fn flush_logs(&self, qname: &[String], rtype: &str) {
        let dir = match &self.config.log_dir {
            Some(dir) => dir,
            None => return,
        };
        let path = dir.join(format!("{}-{}.txt", qname.join("."), rtype));
        let result = fs::create_dir_all(dir).and_then(|_| fs::write(&path, self.logs.join("\n")));
        if let Err(err) = result {
            warn!(path = %path.display(), error = %err, "Could not write query log");
        }
    }
}

// Strips URL dressing the original tool tolerated: scheme prefixes, one
// leading www., trailing dots. What remains becomes the label vector.
pub fn normalize_hostname(hostname: &str) -> Vec<String> {
    let mut name = hostname.trim();
    for scheme in ["https://", "http://"] {
        name = name.strip_prefix(scheme).unwrap_or(name);
    }
    name = name.strip_prefix("www.").unwrap_or(name);
    let name = name.trim_end_matches('.');
    name.split('.')
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

// Answers can land in the answer or the authority section depending on how
// the final server is configured; both count for the returned RRSet.
fn records_of_type(packet: &DnsPacket, qtype: DnsRRType) -> Vec<DnsResourceRecord> {
    packet
        .answers
        .iter()
        .chain(packet.nameservers.iter())
        .filter(|rr| rr.rr_type == qtype)
        .cloned()
        .collect()
}

// A CNAME only redirects when the response carries no records of the
// requested type alongside it.
fn cname_target(packet: &DnsPacket, qtype: DnsRRType) -> Option<Vec<String>> {
    if packet.answers.iter().any(|rr| rr.rr_type == qtype) {
        return None;
    }
    packet.answers.iter().find_map(|rr| match &rr.record {
        DnsRecordData::CNAME(target) => Some(target.clone()),
        _ => None,
    })
}

fn names_equal_rr(rr: &DnsResourceRecord, name: &[String]) -> bool {
    rr.rr_type == DnsRRType::A && names::names_equal(&rr.name, name)
}
