use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};

use crate::name;
use crate::record::{RData, ResourceRecord};
use crate::records::{ARecord, AaaaRecord, NsRecord, SoaRecord};
use crate::value::{self, hostmaster_mailbox};
use crate::{ZoneError, DEFAULT_ANCHOR, META_LABEL};

/// External key-value store serving JSON domain values.
///
/// Implementations must be safe for concurrent invocation; the backend calls
/// into the source from whatever context `lookup` runs on.
pub trait NameSource: Send + Sync {
    fn lookup_json(&self, key: &str) -> Result<String, ZoneError>;
}

/// Backend configuration. Frozen once the backend is constructed.
#[derive(Clone, Debug)]
pub struct Config {
    //CanonicalNameservers  Absolute nameserver names published at the apex.
    //                      When empty, the backend synthesizes a self
    //                      nameserver and enables the meta-domain.
    pub canonical_nameservers: Vec<String>,
    //VanityIPs     Addresses published as apex A/AAAA records
    pub vanity_ips: Vec<IpAddr>,
    //Hostmaster    Mailbox for the apex SOA; a default is derived when empty
    pub hostmaster: String,
    //SelfIP        Address served beneath the meta-domain
    pub self_ip: Ipv4Addr,
    //FakeNames     In-memory key to JSON store used by tests
    pub fake_names: HashMap<String, String>,
    //FakesOnly     Serve exclusively from fake_names
    pub fakes_only: bool,
    //Anchor        Label marking the zone boundary
    pub anchor: String,
    //TTLs          Apex SOA, apex NS and remaining synthesized records
    pub soa_ttl: u32,
    pub ns_ttl: u32,
    pub default_ttl: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            canonical_nameservers: Vec::new(),
            vanity_ips: Vec::new(),
            hostmaster: String::new(),
            self_ip: Ipv4Addr::new(127, 127, 127, 127),
            fake_names: HashMap::new(),
            fakes_only: false,
            anchor: DEFAULT_ANCHOR.to_owned(),
            soa_ttl: 86400,
            ns_ttl: 86400,
            default_ttl: 86400,
        }
    }
}

/// Resolves query names against the name store and synthesizes the apex.
///
/// Re-entrant but not internally concurrent: all state is read-only after
/// construction, so `lookup` may be called from many contexts at once.
pub struct Backend {
    cfg: Config,
    source: Option<Box<dyn NameSource>>,
}

impl Backend {
    /// Construct a backend without an external name source; lookups are
    /// served from the fake map only.
    pub fn new(cfg: Config) -> Result<Backend, ZoneError> {
        Backend::with_source(cfg, None)
    }

    /// Construct a backend backed by an external name source.
    pub fn with_source(
        cfg: Config,
        source: Option<Box<dyn NameSource>>,
    ) -> Result<Backend, ZoneError> {
        if !name::validate_owner_label(&cfg.anchor) {
            return Err(ZoneError::InvalidDomainName);
        }

        for ns in &cfg.canonical_nameservers {
            if !name::validate_host_name(ns) {
                return Err(ZoneError::InvalidDomainName);
            }
        }

        if !cfg.hostmaster.is_empty() && !name::validate_email(&cfg.hostmaster) {
            return Err(ZoneError::InvalidDomainName);
        }

        Ok(Backend { cfg, source })
    }

    /// Look up all records for a query name.
    ///
    /// The full record set for the owner is returned; filtering by query
    /// type is the hosting layer's concern.
    pub fn lookup(&self, qname: &str) -> Result<Vec<ResourceRecord>, ZoneError> {
        //Queries arrive in arbitrary case; the grammars are lowercase-only.
        let qname = qname.to_ascii_lowercase();

        let (subname, basename, rootname) =
            name::split_by_floating_anchor(&qname, &self.cfg.anchor)?;
        debug!(
            "lookup {:?}: subname={:?} basename={:?} rootname={:?}",
            qname, subname, basename, rootname
        );

        if basename.is_empty() {
            return Ok(self.apex_records(&format!("{}.", rootname)));
        }

        if basename == META_LABEL {
            //The meta-domain exists only while this instance is
            //authoritative for its own apex, i.e. not delegating.
            if self.cfg.canonical_nameservers.is_empty() {
                let owner = format!("{}.", qname.trim_end_matches('.'));
                return Ok(vec![ResourceRecord::new(
                    owner,
                    self.cfg.default_ttl,
                    RData::A(ARecord {
                        ip: self.cfg.self_ip,
                    }),
                )]);
            }

            return Err(ZoneError::NoSuchDomain);
        }

        let key = name::basename_to_key(&basename)?;
        let json = self.resolve_json(&key).map_err(|e| match e {
            ZoneError::NotFound => ZoneError::NoSuchDomain,
            other => other,
        })?;

        let resolver = |key: &str| self.resolve_json(key);
        let mut sink = |e: value::ValueError, is_warning: bool| {
            if is_warning {
                warn!("value {}: {}", key, e);
            } else {
                error!("value {}: {}", key, e);
            }
        };

        let value = match value::parse_value(&key, &json, Some(&resolver), &mut sink) {
            Some(v) => v,
            None => return Err(ZoneError::NoResults),
        };

        //Subname labels select the matching child subtree, rightmost first.
        let mut selected = &value;
        if !subname.is_empty() {
            for label in subname.rsplit('.') {
                selected = selected.map.get(label).ok_or(ZoneError::NoSuchDomain)?;
            }
        }

        let owner = format!("{}.", qname.trim_end_matches('.'));
        let apex = format!("{}.{}.", basename, rootname);
        let rrs = selected.records_with_sink(&owner, &apex, &mut sink);

        if rrs.is_empty() {
            return Err(ZoneError::NoResults);
        }

        Ok(rrs)
    }

    //The apex has no entry in the name store; its records are synthesized
    //from configuration.
    fn apex_records(&self, apex: &str) -> Vec<ResourceRecord> {
        let nameservers = if self.cfg.canonical_nameservers.is_empty() {
            vec![format!("this.{}.{}", META_LABEL, apex)]
        } else {
            self.cfg.canonical_nameservers.clone()
        };

        let mailbox = if self.cfg.hostmaster.is_empty() {
            format!("hostmaster.{}", apex)
        } else {
            hostmaster_mailbox(&self.cfg.hostmaster)
                .unwrap_or_else(|| format!("hostmaster.{}", apex))
        };

        let mut rrs = vec![ResourceRecord::new(
            apex.to_owned(),
            self.cfg.soa_ttl,
            RData::Soa(SoaRecord {
                primary_ns: nameservers[0].clone(),
                mailbox,
                serial: 1,
                refresh: 600,
                retry: 600,
                expire: 7200,
                minimum: 600,
            }),
        )];

        for ns in &nameservers {
            rrs.push(ResourceRecord::new(
                apex.to_owned(),
                self.cfg.ns_ttl,
                RData::Ns(NsRecord {
                    nameserver: ns.clone(),
                }),
            ));
        }

        for ip in &self.cfg.vanity_ips {
            let rdata = match ip {
                IpAddr::V4(ip) => RData::A(ARecord { ip: *ip }),
                IpAddr::V6(ip) => RData::Aaaa(AaaaRecord { ip: *ip }),
            };
            rrs.push(ResourceRecord::new(
                apex.to_owned(),
                self.cfg.default_ttl,
                rdata,
            ));
        }

        rrs
    }

    fn resolve_json(&self, key: &str) -> Result<String, ZoneError> {
        if let Some(json) = self.cfg.fake_names.get(key) {
            return Ok(json.clone());
        }

        if self.cfg.fakes_only {
            return Err(ZoneError::NotFound);
        }

        match &self.source {
            Some(source) => source.lookup_json(key),
            None => Err(ZoneError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::canonicalize_rrs_to_string;

    fn fixture() -> Backend {
        Backend::new(Config {
            canonical_nameservers: vec![
                "ns1.example.com.".to_owned(),
                "ns2.example.com.".to_owned(),
            ],
            vanity_ips: vec!["192.0.2.1".parse().unwrap(), "::1".parse().unwrap()],
            hostmaster: "hostmaster@example.com".to_owned(),
            fake_names: HashMap::from([
                (
                    "d/example".to_owned(),
                    r#"{"ip": "192.0.2.1"}"#.to_owned(),
                ),
                (
                    "d/example2".to_owned(),
                    r#"{"ip": ["192.0.2.1","192.0.2.2"]}"#.to_owned(),
                ),
            ]),
            fakes_only: true,
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn lookup_matrix() {
        let backend = fixture();

        let items: [(&str, Result<&str, ZoneError>); 6] = [
            //Normal requests.
            ("example.bit.", Ok("example.bit. IN A 192.0.2.1")),
            (
                "example2.bit.",
                Ok("example2.bit. IN A 192.0.2.1\nexample2.bit. IN A 192.0.2.2"),
            ),
            //Out-of-zone requests.
            ("example.com.", Err(ZoneError::NotInZone)),
            ("com.", Err(ZoneError::NotInZone)),
            //Root domain.
            (
                "bit.",
                Ok("bit. 86400 IN A 192.0.2.1\n\
                    bit. 86400 IN AAAA ::1\n\
                    bit. 86400 IN NS ns1.example.com.\n\
                    bit. 86400 IN NS ns2.example.com.\n\
                    bit. 86400 IN SOA ns1.example.com. hostmaster.example.com. 1 600 600 7200 600"),
            ),
            //The meta domain is suppressed while delegating to canonical
            //nameservers.
            ("this.x--nmc.bit.", Err(ZoneError::NoSuchDomain)),
        ];

        for (qname, expected) in items {
            match (backend.lookup(qname), expected) {
                (Ok(rrs), Ok(expected)) => {
                    assert_eq!(
                        canonicalize_rrs_to_string(&rrs),
                        expected,
                        "mismatch for {:?}",
                        qname
                    );
                }
                (Err(err), Err(expected)) => {
                    assert_eq!(err, expected, "wrong error for {:?}", qname)
                }
                (got, expected) => {
                    panic!("{:?}: got {:?}, expected {:?}", qname, got, expected)
                }
            }
        }
    }

    #[test]
    fn meta_domain() {
        let backend = Backend::new(Config {
            fakes_only: true,
            ..Config::default()
        })
        .unwrap();

        let rrs = backend.lookup("this.x--nmc.bit.").unwrap();
        assert_eq!(
            canonicalize_rrs_to_string(&rrs),
            "this.x--nmc.bit. 86400 IN A 127.127.127.127"
        );

        //Any name beneath the meta-domain answers.
        let rrs = backend.lookup("a.b.x--nmc.bit.").unwrap();
        assert_eq!(
            canonicalize_rrs_to_string(&rrs),
            "a.b.x--nmc.bit. 86400 IN A 127.127.127.127"
        );
    }

    #[test]
    fn apex_synthesizes_self_nameserver_when_not_delegating() {
        let backend = Backend::new(Config {
            fakes_only: true,
            ..Config::default()
        })
        .unwrap();

        let rrs = backend.lookup("bit.").unwrap();
        assert_eq!(
            canonicalize_rrs_to_string(&rrs),
            "bit. 86400 IN NS this.x--nmc.bit.\n\
             bit. 86400 IN SOA this.x--nmc.bit. hostmaster.bit. 1 600 600 7200 600"
        );
    }

    #[test]
    fn missing_domain() {
        let backend = fixture();
        assert_eq!(
            backend.lookup("nonexistent.bit."),
            Err(ZoneError::NoSuchDomain)
        );
    }

    #[test]
    fn empty_value_has_no_results() {
        let backend = Backend::new(Config {
            fake_names: HashMap::from([("d/empty".to_owned(), "{}".to_owned())]),
            fakes_only: true,
            ..Config::default()
        })
        .unwrap();

        assert_eq!(backend.lookup("empty.bit."), Err(ZoneError::NoResults));
    }

    #[test]
    fn subname_selects_child() {
        let backend = Backend::new(Config {
            fake_names: HashMap::from([(
                "d/example".to_owned(),
                r#"{"ip":"192.0.2.1","map":{"www":{"ip":"192.0.2.3"}}}"#.to_owned(),
            )]),
            fakes_only: true,
            ..Config::default()
        })
        .unwrap();

        let rrs = backend.lookup("www.example.bit.").unwrap();
        assert_eq!(
            canonicalize_rrs_to_string(&rrs),
            "www.example.bit. IN A 192.0.2.3"
        );

        assert_eq!(
            backend.lookup("zzz.example.bit."),
            Err(ZoneError::NoSuchDomain)
        );
    }

    #[test]
    fn query_case_is_normalized() {
        let backend = fixture();
        let rrs = backend.lookup("EXAMPLE.Bit.").unwrap();
        assert_eq!(
            canonicalize_rrs_to_string(&rrs),
            "example.bit. IN A 192.0.2.1"
        );
    }

    #[test]
    fn imports_resolve_through_the_backend() {
        let backend = Backend::new(Config {
            fake_names: HashMap::from([
                (
                    "d/example".to_owned(),
                    r#"{"import":"d/shared"}"#.to_owned(),
                ),
                ("d/shared".to_owned(), r#"{"ip":"192.0.2.7"}"#.to_owned()),
            ]),
            fakes_only: true,
            ..Config::default()
        })
        .unwrap();

        let rrs = backend.lookup("example.bit.").unwrap();
        assert_eq!(
            canonicalize_rrs_to_string(&rrs),
            "example.bit. IN A 192.0.2.7"
        );
    }

    struct MapSource(HashMap<String, String>);

    impl NameSource for MapSource {
        fn lookup_json(&self, key: &str) -> Result<String, ZoneError> {
            if key == "d/flaky" {
                return Err(ZoneError::Transient);
            }
            self.0.get(key).cloned().ok_or(ZoneError::NotFound)
        }
    }

    #[test]
    fn external_source_is_consulted() {
        let source = MapSource(HashMap::from([(
            "d/example".to_owned(),
            r#"{"ip":"192.0.2.11"}"#.to_owned(),
        )]));

        let backend =
            Backend::with_source(Config::default(), Some(Box::new(source))).unwrap();

        let rrs = backend.lookup("example.bit.").unwrap();
        assert_eq!(
            canonicalize_rrs_to_string(&rrs),
            "example.bit. IN A 192.0.2.11"
        );

        //Transient store failures propagate rather than mapping to
        //nonexistence.
        assert_eq!(backend.lookup("flaky.bit."), Err(ZoneError::Transient));
        assert_eq!(
            backend.lookup("missing.bit."),
            Err(ZoneError::NoSuchDomain)
        );
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        assert!(Backend::new(Config {
            canonical_nameservers: vec!["NOT-LOWERCASE.example.com.".to_owned()],
            ..Config::default()
        })
        .is_err());

        assert!(Backend::new(Config {
            hostmaster: "not-a-mailbox".to_owned(),
            ..Config::default()
        })
        .is_err());
    }
}
