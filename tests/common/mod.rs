#![allow(dead_code)]

// A scripted stand-in for the socket layer: responses are keyed by
// (question, type, server) and served back with the query's id and question
// echoed, the way a real server would. Keeps the end-to-end walker and
// validator tests entirely off the network.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::net::Ipv4Addr;
use std::rc::Rc;

use mydig::dns::protocol::{
    names, DnsClass, DnsFlags, DnsPacket, DnsRCode, DnsRecordData, DnsResourceRecord, DnsRRType,
};
use mydig::dns::transport::Exchange;

#[derive(Default)]
pub struct QueryLog {
    pub udp: RefCell<Vec<(String, Ipv4Addr)>>,
    pub tcp: RefCell<Vec<(String, Ipv4Addr)>>,
}

struct Entry {
    packet: DnsPacket,
    truncate_udp: bool,
}

pub struct ReplayExchange {
    replies: HashMap<(String, u16, Ipv4Addr), Entry>,
    bootstrap: HashMap<String, Ipv4Addr>,
    pub log: Rc<QueryLog>,
}

impl ReplayExchange {
    pub fn new() -> ReplayExchange {
        ReplayExchange {
            replies: HashMap::new(),
            bootstrap: HashMap::new(),
            log: Rc::new(QueryLog::default()),
        }
    }

    pub fn add(&mut self, qname: &str, qtype: DnsRRType, server: Ipv4Addr, packet: DnsPacket) {
        self.replies.insert(
            (qname.to_lowercase(), qtype.to_u16(), server),
            Entry {
                packet,
                truncate_udp: false,
            },
        );
    }

    // Same as `add`, but the UDP path serves a TC=1 stub so the transport
    // has to come back over TCP for the real thing
    pub fn add_truncated(
        &mut self,
        qname: &str,
        qtype: DnsRRType,
        server: Ipv4Addr,
        packet: DnsPacket,
    ) {
        self.replies.insert(
            (qname.to_lowercase(), qtype.to_u16(), server),
            Entry {
                packet,
                truncate_udp: true,
            },
        );
    }

    pub fn add_bootstrap(&mut self, name: &str, ip: Ipv4Addr) {
        self.bootstrap.insert(name.to_lowercase(), ip);
    }

    fn serve(&self, query_bytes: &[u8], server: Ipv4Addr, tcp: bool) -> io::Result<Vec<u8>> {
        let query = DnsPacket::from_bytes(query_bytes)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let question = query
            .questions
            .first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "query without question"))?;
        let qname = names::display_name(&question.qname).to_lowercase();

        let side = if tcp { &self.log.tcp } else { &self.log.udp };
        side.borrow_mut().push((qname.clone(), server));

        let entry = self
            .replies
            .get(&(qname.clone(), question.qtype.to_u16(), server))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no scripted reply for {} at {}", qname, server),
                )
            })?;

        let mut packet = if !tcp && entry.truncate_udp {
            truncation_stub()
        } else {
            entry.packet.clone()
        };
        packet.id = query.id;
        packet.questions = query.questions.clone();
        Ok(packet.to_bytes())
    }
}

impl Exchange for ReplayExchange {
    fn send_udp(&self, query: &[u8], server: Ipv4Addr) -> io::Result<Vec<u8>> {
        self.serve(query, server, false)
    }

    fn send_tcp(&self, query: &[u8], server: Ipv4Addr) -> io::Result<Vec<u8>> {
        self.serve(query, server, true)
    }

    fn bootstrap(&self, name: &str) -> io::Result<Ipv4Addr> {
        self.bootstrap
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no bootstrap for {}", name))
            })
    }
}

// For tests that must finish without touching the network at all
pub struct PanickingExchange;

impl Exchange for PanickingExchange {
    fn send_udp(&self, _query: &[u8], server: Ipv4Addr) -> io::Result<Vec<u8>> {
        panic!("unexpected UDP exchange with {}", server);
    }

    fn send_tcp(&self, _query: &[u8], server: Ipv4Addr) -> io::Result<Vec<u8>> {
        panic!("unexpected TCP exchange with {}", server);
    }

    fn bootstrap(&self, name: &str) -> io::Result<Ipv4Addr> {
        panic!("unexpected bootstrap resolution of {}", name);
    }
}

pub fn labels(name: &str) -> Vec<String> {
    name.trim_end_matches('.')
        .split('.')
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn response(rcode: DnsRCode) -> DnsPacket {
    DnsPacket {
        id: 0,
        flags: DnsFlags {
            qr_bit: true,
            rcode,
            ..DnsFlags::query_flags()
        },
        questions: vec![],
        answers: vec![],
        nameservers: vec![],
        addl_recs: vec![],
    }
}

fn truncation_stub() -> DnsPacket {
    let mut packet = response(DnsRCode::NoError);
    packet.flags.tc_bit = true;
    packet
}

pub fn a_record(owner: &str, ip: Ipv4Addr) -> DnsResourceRecord {
    DnsResourceRecord {
        name: labels(owner),
        rr_type: DnsRRType::A,
        class: DnsClass::IN,
        ttl: 300,
        record: DnsRecordData::A(ip),
    }
}

pub fn ns_record(owner: &str, target: &str) -> DnsResourceRecord {
    DnsResourceRecord {
        name: labels(owner),
        rr_type: DnsRRType::NS,
        class: DnsClass::IN,
        ttl: 172800,
        record: DnsRecordData::NS(labels(target)),
    }
}

pub fn cname_record(owner: &str, target: &str) -> DnsResourceRecord {
    DnsResourceRecord {
        name: labels(owner),
        rr_type: DnsRRType::CNAME,
        class: DnsClass::IN,
        ttl: 300,
        record: DnsRecordData::CNAME(labels(target)),
    }
}

pub fn mx_record(owner: &str, preference: u16, exchange: &str) -> DnsResourceRecord {
    DnsResourceRecord {
        name: labels(owner),
        rr_type: DnsRRType::MX,
        class: DnsClass::IN,
        ttl: 3600,
        record: DnsRecordData::MX {
            preference,
            exchange: labels(exchange),
        },
    }
}

// A referral: NS records in authority, any glue in additional
pub fn referral(zone: &str, nameservers: &[(&str, Option<Ipv4Addr>)]) -> DnsPacket {
    let mut packet = response(DnsRCode::NoError);
    for (target, glue) in nameservers {
        packet.nameservers.push(ns_record(zone, target));
        if let Some(ip) = glue {
            packet.addl_recs.push(a_record(target, *ip));
        }
    }
    packet
}

pub fn answer(records: Vec<DnsResourceRecord>) -> DnsPacket {
    let mut packet = response(DnsRCode::NoError);
    packet.flags.aa_bit = true;
    packet.answers = records;
    packet
}
