// End-to-end referral walks over recorded transcripts: every scenario here
// runs the real walker and transport against the replay shim, so nothing
// talks to the network.

mod common;

use std::net::Ipv4Addr;

use common::*;
use mydig::dns::protocol::{DnsRecordData, DnsRRType};
use mydig::dns::{ResolveError, Resolver, ResolverConfig};

const ROOT: Ipv4Addr = Ipv4Addr::new(198, 41, 0, 4);
const TLD: Ipv4Addr = Ipv4Addr::new(192, 5, 6, 30);
const AUTH: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 1);

fn config() -> ResolverConfig {
    ResolverConfig {
        root_hints: vec![ROOT],
        dnssec: false,
        log_dir: None,
        ..ResolverConfig::default()
    }
}

#[test]
fn walks_referrals_with_glue_to_an_answer() {
    let mut exchange = ReplayExchange::new();
    exchange.add(
        "example.com.",
        DnsRRType::A,
        ROOT,
        referral("com", &[("a.gtld-servers.net", Some(TLD))]),
    );
    exchange.add(
        "example.com.",
        DnsRRType::A,
        TLD,
        referral("example.com", &[("ns1.example.com", Some(AUTH))]),
    );
    exchange.add(
        "example.com.",
        DnsRRType::A,
        AUTH,
        answer(vec![a_record("example.com", Ipv4Addr::new(93, 184, 216, 34))]),
    );

    let mut resolver = Resolver::with_exchange(config(), exchange);
    // URL dressing is stripped before the walk starts
    let resolution = resolver
        .resolve("https://www.example.com.", "A")
        .expect("resolution failed");

    assert_eq!(resolution.qname, "example.com.");
    assert_eq!(resolution.records.len(), 1);
    assert_eq!(
        resolution.records[0].record,
        DnsRecordData::A(Ipv4Addr::new(93, 184, 216, 34))
    );
    assert!(resolution.msg_size > 0);
    assert!(resolution.to_string().contains("93.184.216.34"));
}

#[test]
fn ns_answers_come_from_the_authority_section() {
    let edu = Ipv4Addr::new(192, 5, 6, 40);
    let stonybrook = Ipv4Addr::new(130, 245, 27, 2);
    let mut exchange = ReplayExchange::new();
    exchange.add(
        "cs.stonybrook.edu.",
        DnsRRType::NS,
        ROOT,
        referral("edu", &[("a.edu-servers.net", Some(edu))]),
    );
    exchange.add(
        "cs.stonybrook.edu.",
        DnsRRType::NS,
        edu,
        referral("stonybrook.edu", &[("nocnoc.stonybrook.edu", Some(stonybrook))]),
    );
    // The zone's server names the delegation in its authority section
    exchange.add(
        "cs.stonybrook.edu.",
        DnsRRType::NS,
        stonybrook,
        referral(
            "cs.stonybrook.edu",
            &[("ns1.cs.stonybrook.edu", None), ("ns2.cs.stonybrook.edu", None)],
        ),
    );

    let mut resolver = Resolver::with_exchange(config(), exchange);
    let resolution = resolver
        .resolve("cs.stonybrook.edu", "NS")
        .expect("resolution failed");

    assert!(resolution.records.len() >= 2);
    assert!(resolution
        .records
        .iter()
        .all(|rr| rr.rr_type == DnsRRType::NS));
}

#[test]
fn mx_answers_preserve_preference_order() {
    let mut exchange = ReplayExchange::new();
    exchange.add(
        "gmail.com.",
        DnsRRType::MX,
        ROOT,
        referral("com", &[("a.gtld-servers.net", Some(TLD))]),
    );
    exchange.add(
        "gmail.com.",
        DnsRRType::MX,
        TLD,
        referral("gmail.com", &[("ns1.google.com", Some(AUTH))]),
    );
    exchange.add(
        "gmail.com.",
        DnsRRType::MX,
        AUTH,
        answer(vec![
            mx_record("gmail.com", 5, "gmail-smtp-in.l.google.com"),
            mx_record("gmail.com", 10, "alt1.gmail-smtp-in.l.google.com"),
            mx_record("gmail.com", 20, "alt2.gmail-smtp-in.l.google.com"),
            mx_record("gmail.com", 30, "alt3.gmail-smtp-in.l.google.com"),
            mx_record("gmail.com", 40, "alt4.gmail-smtp-in.l.google.com"),
        ]),
    );

    let mut resolver = Resolver::with_exchange(config(), exchange);
    let resolution = resolver.resolve("gmail.com", "MX").expect("resolution failed");

    let preferences: Vec<u16> = resolution
        .records
        .iter()
        .filter_map(|rr| match &rr.record {
            DnsRecordData::MX { preference, .. } => Some(*preference),
            _ => None,
        })
        .collect();
    assert_eq!(preferences, vec![5, 10, 20, 30, 40]);
}

#[test]
fn glueless_referrals_go_through_bootstrap() {
    let org = Ipv4Addr::new(199, 19, 56, 1);
    let mut exchange = ReplayExchange::new();
    exchange.add(
        "example.org.",
        DnsRRType::A,
        ROOT,
        referral("org", &[("b0.org.afilias-nst.org", None)]),
    );
    exchange.add_bootstrap("b0.org.afilias-nst.org.", org);
    exchange.add(
        "example.org.",
        DnsRRType::A,
        org,
        referral("example.org", &[("ns1.example.org", Some(AUTH))]),
    );
    exchange.add(
        "example.org.",
        DnsRRType::A,
        AUTH,
        answer(vec![a_record("example.org", Ipv4Addr::new(10, 9, 8, 7))]),
    );

    let mut resolver = Resolver::with_exchange(config(), exchange);
    let resolution = resolver.resolve("example.org", "A").expect("resolution failed");
    assert_eq!(
        resolution.records[0].record,
        DnsRecordData::A(Ipv4Addr::new(10, 9, 8, 7))
    );
}

#[test]
fn exhausted_candidates_surface_a_resolution_error() {
    use mydig::dns::protocol::DnsRCode;

    let root_b = Ipv4Addr::new(199, 9, 14, 201);
    let mut exchange = ReplayExchange::new();
    exchange.add(
        "no-such-tld-xyzzy.",
        DnsRRType::A,
        ROOT,
        response(DnsRCode::NXDomain),
    );
    exchange.add(
        "no-such-tld-xyzzy.",
        DnsRRType::A,
        root_b,
        response(DnsRCode::Refused),
    );

    let mut config = config();
    config.root_hints = vec![ROOT, root_b];
    let mut resolver = Resolver::with_exchange(config, exchange);
    let err = resolver
        .resolve("no-such-tld-xyzzy.", "A")
        .expect_err("resolution should fail");

    match err {
        ResolveError::Resolution { zone, servers } => {
            assert_eq!(zone, "no-such-tld-xyzzy.");
            assert_eq!(servers.len(), 2);
        }
        other => panic!("wrong error: {:?}", other),
    }
}

#[test]
fn unsupported_types_fail_before_any_network_io() {
    let mut resolver = Resolver::with_exchange(config(), PanickingExchange);
    let err = resolver
        .resolve("example.com", "TXT")
        .expect_err("TXT must be rejected");
    assert_eq!(err, ResolveError::ResourceRecordType("TXT".to_string()));
}

#[test]
fn udp_truncation_forces_a_tcp_retry() {
    let mut exchange = ReplayExchange::new();
    exchange.add_truncated(
        "com.",
        DnsRRType::NS,
        ROOT,
        answer(vec![
            ns_record("com", "a.gtld-servers.net"),
            ns_record("com", "b.gtld-servers.net"),
        ]),
    );
    let log = exchange.log.clone();

    let mut resolver = Resolver::with_exchange(config(), exchange);
    let resolution = resolver.resolve("com", "NS").expect("resolution failed");

    assert_eq!(resolution.records.len(), 2);
    // One UDP attempt that came back truncated, then the TCP retry
    assert_eq!(log.udp.borrow().len(), 1);
    assert_eq!(log.tcp.borrow().len(), 1);
}

#[test]
fn cname_answers_restart_the_walk_at_the_target() {
    let ts = Ipv4Addr::new(10, 0, 0, 53);
    let mut exchange = ReplayExchange::new();
    exchange.add(
        "alias.test.",
        DnsRRType::A,
        ROOT,
        referral("test", &[("ns.test", Some(ts))]),
    );
    exchange.add(
        "alias.test.",
        DnsRRType::A,
        ts,
        answer(vec![cname_record("alias.test", "real.test")]),
    );
    exchange.add(
        "real.test.",
        DnsRRType::A,
        ROOT,
        referral("test", &[("ns.test", Some(ts))]),
    );
    exchange.add(
        "real.test.",
        DnsRRType::A,
        ts,
        answer(vec![a_record("real.test", Ipv4Addr::new(10, 0, 0, 9))]),
    );

    let mut resolver = Resolver::with_exchange(config(), exchange);
    let resolution = resolver.resolve("alias.test", "A").expect("resolution failed");

    // The walk restarted at the canonical name
    assert_eq!(resolution.qname, "real.test.");
    assert_eq!(
        resolution.records[0].record,
        DnsRecordData::A(Ipv4Addr::new(10, 0, 0, 9))
    );
}

#[test]
fn repeated_resolutions_return_identical_rdata() {
    let build = || {
        let mut exchange = ReplayExchange::new();
        exchange.add(
            "example.com.",
            DnsRRType::A,
            ROOT,
            referral("com", &[("a.gtld-servers.net", Some(TLD))]),
        );
        exchange.add(
            "example.com.",
            DnsRRType::A,
            TLD,
            referral("example.com", &[("ns1.example.com", Some(AUTH))]),
        );
        exchange.add(
            "example.com.",
            DnsRRType::A,
            AUTH,
            answer(vec![a_record("example.com", Ipv4Addr::new(93, 184, 216, 34))]),
        );
        exchange
    };

    let mut first = Resolver::with_exchange(config(), build());
    let mut second = Resolver::with_exchange(config(), build());
    let a = first.resolve("example.com", "A").expect("resolution failed");
    let b = second.resolve("example.com", "A").expect("resolution failed");
    let rdata = |r: &mydig::dns::Resolution| -> Vec<DnsRecordData> {
        r.records.iter().map(|rr| rr.record.clone()).collect()
    };
    assert_eq!(rdata(&a), rdata(&b));
}
