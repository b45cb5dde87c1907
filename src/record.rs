use std::fmt;

use crate::records::{
    ARecord, AaaaRecord, CnameRecord, DnameRecord, DsRecord, MxRecord, NsRecord, SoaRecord,
    SrvRecord, TlsaRecord, TxtRecord,
};

/// Record type codes for the types this zone can serve.
///
///[RFC1035 Section 3.2.2 - TYPE values](https://www.rfc-editor.org/rfc/rfc1035#section-3.2.2)
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RRType {
    // 1 a host address (IPV4)
    A = 1,
    // 2 an authoritative name server
    Ns = 2,
    // 5 the canonical name for an alias
    Cname = 5,
    // 6 marks the start of a zone of authority
    Soa = 6,
    // 15 mail exchange
    Mx = 15,
    // 16 text strings
    Txt = 16,
    // 28 a host address (IPV6)
    Aaaa = 28,
    // 33 a service record
    Srv = 33,
    // 39 a subtree redirection
    Dname = 39,
    // 43 a delegation signer
    Ds = 43,
    // 52 a TLSA certificate association
    Tlsa = 52,
}

impl fmt::Display for RRType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RRType::A => "A",
            RRType::Ns => "NS",
            RRType::Cname => "CNAME",
            RRType::Soa => "SOA",
            RRType::Mx => "MX",
            RRType::Txt => "TXT",
            RRType::Aaaa => "AAAA",
            RRType::Srv => "SRV",
            RRType::Dname => "DNAME",
            RRType::Ds => "DS",
            RRType::Tlsa => "TLSA",
        };
        f.write_str(s)
    }
}

/// Record class. Everything this zone serves is in the Internet class.
///
///[RFC1035 Section 3.2.4 - CLASS values](https://www.rfc-editor.org/rfc/rfc1035#section-3.2.4)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Class {
    In = 1,
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Class::In => f.write_str("IN"),
        }
    }
}

/// Typed RDATA for a resource record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RData {
    A(ARecord),
    Aaaa(AaaaRecord),
    Ns(NsRecord),
    Cname(CnameRecord),
    Dname(DnameRecord),
    Soa(SoaRecord),
    Mx(MxRecord),
    Srv(SrvRecord),
    Txt(TxtRecord),
    Ds(DsRecord),
    Tlsa(TlsaRecord),
}

impl RData {
    pub fn rrtype(&self) -> RRType {
        match self {
            RData::A(_) => RRType::A,
            RData::Aaaa(_) => RRType::Aaaa,
            RData::Ns(_) => RRType::Ns,
            RData::Cname(_) => RRType::Cname,
            RData::Dname(_) => RRType::Dname,
            RData::Soa(_) => RRType::Soa,
            RData::Mx(_) => RRType::Mx,
            RData::Srv(_) => RRType::Srv,
            RData::Txt(_) => RRType::Txt,
            RData::Ds(_) => RRType::Ds,
            RData::Tlsa(_) => RRType::Tlsa,
        }
    }

    /// Zone-file presentation of the RDATA fields.
    pub fn rdata_string(&self) -> String {
        match self {
            RData::A(r) => r.rdata(),
            RData::Aaaa(r) => r.rdata(),
            RData::Ns(r) => r.rdata(),
            RData::Cname(r) => r.rdata(),
            RData::Dname(r) => r.rdata(),
            RData::Soa(r) => r.rdata(),
            RData::Mx(r) => r.rdata(),
            RData::Srv(r) => r.rdata(),
            RData::Txt(r) => r.rdata(),
            RData::Ds(r) => r.rdata(),
            RData::Tlsa(r) => r.rdata(),
        }
    }
}

/// A single resource record: owner name, TTL, class and typed RDATA.
///
/// [`fmt::Display`] renders the tab-separated zone-file line used by tests
/// and diagnostics.
///
///[RFC1035 Section 4.1.3 - Resource record format](https://www.rfc-editor.org/rfc/rfc1035#section-4.1.3)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRecord {
    //Name      Absolute owner name, with trailing dot
    pub name: String,
    //TTL       Seconds the record may be cached
    pub ttl: u32,
    //Class     Always IN for this zone
    pub class: Class,
    //RDATA     Typed record payload
    pub rdata: RData,
}

impl ResourceRecord {
    pub fn new(name: String, ttl: u32, rdata: RData) -> Self {
        ResourceRecord {
            name,
            ttl,
            class: Class::In,
            rdata,
        }
    }

    pub fn rrtype(&self) -> RRType {
        self.rdata.rrtype()
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name,
            self.ttl,
            self.class,
            self.rrtype(),
            self.rdata.rdata_string()
        )
    }
}

/// Canonicalize a record set to a comparable string: one line per record,
/// tabs collapsed to spaces, the default TTL elided, lines sorted.
#[cfg(test)]
pub(crate) fn canonicalize_rrs_to_string(rrs: &[ResourceRecord]) -> String {
    let mut lines: Vec<String> = rrs
        .iter()
        .map(|rr| rr.to_string().replace("\t600\t", "\t").replace('\t', " "))
        .collect();
    lines.sort();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn presentation_forms() {
        let a = ResourceRecord::new(
            "example.bit.".to_owned(),
            600,
            RData::A(ARecord {
                ip: Ipv4Addr::new(192, 0, 2, 1),
            }),
        );
        assert_eq!(a.to_string(), "example.bit.\t600\tIN\tA\t192.0.2.1");

        let soa = ResourceRecord::new(
            "bit.".to_owned(),
            86400,
            RData::Soa(SoaRecord {
                primary_ns: "ns1.example.com.".to_owned(),
                mailbox: "hostmaster.example.com.".to_owned(),
                serial: 1,
                refresh: 600,
                retry: 600,
                expire: 7200,
                minimum: 600,
            }),
        );
        assert_eq!(
            soa.to_string(),
            "bit.\t86400\tIN\tSOA\tns1.example.com. hostmaster.example.com. 1 600 600 7200 600"
        );

        let txt = ResourceRecord::new(
            "example.bit.".to_owned(),
            600,
            RData::Txt(TxtRecord {
                segments: vec!["hello".to_owned(), "wo\"rld".to_owned()],
            }),
        );
        assert_eq!(
            txt.rdata.rdata_string(),
            "\"hello\" \"wo\\\"rld\""
        );
    }

    #[test]
    fn canonicalization_sorts_and_elides_default_ttl() {
        let rrs = vec![
            ResourceRecord::new(
                "b.bit.".to_owned(),
                600,
                RData::A(ARecord {
                    ip: Ipv4Addr::new(192, 0, 2, 2),
                }),
            ),
            ResourceRecord::new(
                "a.bit.".to_owned(),
                600,
                RData::A(ARecord {
                    ip: Ipv4Addr::new(192, 0, 2, 1),
                }),
            ),
        ];

        assert_eq!(
            canonicalize_rrs_to_string(&rrs),
            "a.bit. IN A 192.0.2.1\nb.bit. IN A 192.0.2.2"
        );
    }
}
