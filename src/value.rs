use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value as Json;
use thiserror::Error;

use crate::name;
use crate::record::{RData, ResourceRecord};
use crate::records::{
    ARecord, AaaaRecord, CnameRecord, DnameRecord, DsRecord, MxRecord, NsRecord, SoaRecord,
    SrvRecord, TlsaRecord, TxtRecord,
};
use crate::ZoneError;

/// TTL applied to records expanded from domain values.
pub const VALUE_TTL: u32 = 600;

/// Maximum length of an import chain before the branch is abandoned.
pub const MAX_IMPORT_DEPTH: usize = 16;

/// Soft cap on the number of child nodes in one parsed value tree.
pub const MAX_TREE_NODES: usize = 512;

/// Cap on the number of records a single expansion may produce.
pub const MAX_RECORDS: usize = 1024;

/// Faults raised while parsing or expanding a domain value.
///
/// These are delivered through the caller's error sink together with a flag
/// that is true for warnings. Warnings leave the offending field empty and
/// never fail the parse; errors terminate only the branch they occur in.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("value is not valid JSON: {0}")]
    BadJson(String),
    #[error("value is not a JSON object")]
    NotAnObject,
    #[error("unknown field {0:?}")]
    UnknownField(String),
    #[error("malformed {0} field")]
    MalformedField(&'static str),
    #[error("invalid name in {0} field: {1:?}")]
    InvalidName(&'static str, String),
    #[error("import cycle via {0:?}")]
    ImportCycle(String),
    #[error("import depth limit exceeded at {0:?}")]
    ImportDepthExceeded(String),
    #[error("cannot resolve import {0:?}: {1}")]
    ImportFailed(String, ZoneError),
    #[error("imported value {0:?} has no subdomain {1:?}")]
    ImportSubdomainMissing(String, String),
    #[error("value tree has too many nodes")]
    TooManyNodes,
    #[error("record set truncated at {0} records")]
    TooManyRecords(usize),
}

/// Maps a name store key to its JSON blob. Must be idempotent; may fail with
/// [`ZoneError::NotFound`] or [`ZoneError::Transient`].
pub type Resolver<'a> = dyn Fn(&str) -> Result<String, ZoneError> + 'a;

/// Receives parse and expansion faults. The flag is true for warnings.
pub type ErrorSink<'a> = dyn FnMut(ValueError, bool) + 'a;

/// The parsed, in-memory representation of a single name's JSON entry plus
/// its children. Immutable after parsing; children form a finite tree
/// through `map`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Value {
    //IP        IPv4 addresses, deduplicated and sorted
    pub ip: Vec<Ipv4Addr>,
    //IP6       IPv6 addresses, deduplicated and sorted
    pub ip6: Vec<Ipv6Addr>,
    //NS        Nameserver targets in input order, possibly relative
    pub ns: Vec<String>,
    //Alias     CNAME target; exclusive with other records at this owner
    pub alias: Option<String>,
    //Translate DNAME target; exclusive with other records at this owner
    pub translate: Option<String>,
    //DS        Delegation signer records
    pub ds: Vec<DsRecord>,
    //TLSA      Certificate associations keyed by (port, proto)
    pub tlsa: Vec<TlsaRecord>,
    //MX        Mail exchanges; targets possibly relative
    pub mx: Vec<MxRecord>,
    //SRV       Service records keyed by (service, proto); targets possibly relative
    pub srv: Vec<SrvRecord>,
    //TXT       One entry per record, each a list of segments
    pub txt: Vec<Vec<String>>,
    //Hostmaster    Mailbox for the SOA RNAME; empty when unset
    pub hostmaster: String,
    //Map       Children keyed by sub-label
    pub map: BTreeMap<String, Value>,
}

struct ParseCtx<'a> {
    resolver: Option<&'a Resolver<'a>>,
    //Import stack: the root key plus every key on the current import chain.
    stack: Vec<String>,
    nodes: usize,
}

/// Parse a JSON domain value.
///
/// `key` is the name store key the value lives under (e.g. `d/example`); it
/// seeds cycle detection for imports. `resolver` is consulted for `import`
/// entries and may be `None` when no imports are expected. Faults are
/// delivered through `err`; parsing prefers returning a partial value over
/// failing, so `None` is returned only when the blob is not a JSON object.
pub fn parse_value(
    key: &str,
    json: &str,
    resolver: Option<&Resolver<'_>>,
    err: &mut ErrorSink<'_>,
) -> Option<Value> {
    let root: Json = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            err(ValueError::BadJson(e.to_string()), false);
            return None;
        }
    };

    let obj = match root.as_object() {
        Some(o) => o,
        None => {
            err(ValueError::NotAnObject, false);
            return None;
        }
    };

    let mut ctx = ParseCtx {
        resolver,
        stack: vec![key.to_owned()],
        nodes: 0,
    };

    let mut value = Value::default();
    value.parse_object(obj, &mut ctx, err);
    Some(value)
}

//Coerce a scalar into a one-element list.
fn as_list(val: &Json) -> Vec<&Json> {
    match val {
        Json::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

//Fields holding lists of tuples also accept a single bare tuple.
fn tuple_list(val: &Json) -> Vec<&Json> {
    match val {
        Json::Array(items) if items.first().map_or(false, |x| !x.is_array()) => vec![val],
        Json::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn as_u16(val: &Json) -> Option<u16> {
    val.as_u64().and_then(|v| u16::try_from(v).ok())
}

fn as_u8(val: &Json) -> Option<u8> {
    val.as_u64().and_then(|v| u8::try_from(v).ok())
}

//Split a string into TXT segments of at most 255 octets.
fn segment_txt(s: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for ch in s.chars() {
        if current.len() + ch.len_utf8() > 255 {
            segments.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }

    if !current.is_empty() || segments.is_empty() {
        segments.push(current);
    }

    segments
}

/// Make `name` absolute by appending `apex` unless it already ends in a dot.
/// The empty string and `@` denote the apex itself.
fn absolutize(name: &str, apex: &str) -> String {
    if name.is_empty() || name == "@" {
        return apex.to_owned();
    }

    if let Some(stripped) = name.strip_suffix(".@") {
        return format!("{}.{}", stripped, apex);
    }

    if name.ends_with('.') {
        return name.to_owned();
    }

    format!("{}.{}", name, apex)
}

/// Convert a mailbox `local@domain` to the SOA RNAME `local.domain.`, with
/// dots in the local part escaped.
pub fn hostmaster_mailbox(email: &str) -> Option<String> {
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() {
        return None;
    }

    Some(format!(
        "{}.{}.",
        local.replace('.', "\\."),
        domain.trim_end_matches('.')
    ))
}

impl Value {
    fn parse_object(
        &mut self,
        obj: &serde_json::Map<String, Json>,
        ctx: &mut ParseCtx<'_>,
        err: &mut ErrorSink<'_>,
    ) {
        let mut imports: Vec<(String, String)> = Vec::new();

        for (field, val) in obj {
            match field.as_str() {
                "ip" => self.parse_ip(val, err),
                "ip6" => self.parse_ip6(val, err),
                "ns" | "dns" => self.parse_ns(val, err),
                "alias" => self.parse_alias(val, err),
                "translate" => self.parse_translate(val, err),
                "ds" => self.parse_ds(val, err),
                "tls" => self.parse_tlsa(val, err),
                "mx" => self.parse_mx(val, err),
                "srv" | "service" => self.parse_srv(val, err),
                "txt" => self.parse_txt(val, err),
                "email" => self.parse_email(val, err),
                //Freeform registrant metadata, not carried into DNS.
                "info" => {}
                "import" => collect_imports(val, &mut imports, err),
                "map" => self.parse_map(val, ctx, err),
                _ => err(ValueError::UnknownField(field.clone()), true),
            }
        }

        //Merges keep host entries ahead of imported ones, so imports are
        //processed only once every direct field of this object is in place.
        for (key, dest) in imports {
            self.process_import(&key, &dest, ctx, err);
        }
    }

    fn parse_ip(&mut self, val: &Json, err: &mut ErrorSink<'_>) {
        for item in as_list(val) {
            match item.as_str().and_then(|s| s.parse::<Ipv4Addr>().ok()) {
                Some(ip) => self.ip.push(ip),
                None => err(ValueError::MalformedField("ip"), true),
            }
        }

        self.ip.sort_unstable();
        self.ip.dedup();
    }

    fn parse_ip6(&mut self, val: &Json, err: &mut ErrorSink<'_>) {
        for item in as_list(val) {
            match item.as_str().and_then(|s| s.parse::<Ipv6Addr>().ok()) {
                Some(ip) => self.ip6.push(ip),
                None => err(ValueError::MalformedField("ip6"), true),
            }
        }

        self.ip6.sort_unstable();
        self.ip6.dedup();
    }

    fn parse_ns(&mut self, val: &Json, err: &mut ErrorSink<'_>) {
        for item in as_list(val) {
            match item.as_str() {
                Some(s) if name::validate_rel_host_name(s) => {
                    if !self.ns.iter().any(|existing| existing == s) {
                        self.ns.push(s.to_owned());
                    }
                }
                Some(s) => err(ValueError::InvalidName("ns", s.to_owned()), true),
                None => err(ValueError::MalformedField("ns"), true),
            }
        }
    }

    fn parse_alias(&mut self, val: &Json, err: &mut ErrorSink<'_>) {
        match val {
            Json::String(s) if name::validate_rel_owner_name(s) => self.alias = Some(s.clone()),
            Json::String(s) => err(ValueError::InvalidName("alias", s.clone()), true),
            _ => err(ValueError::MalformedField("alias"), true),
        }
    }

    fn parse_translate(&mut self, val: &Json, err: &mut ErrorSink<'_>) {
        match val {
            Json::String(s) if name::validate_rel_owner_name(s) => {
                self.translate = Some(s.clone())
            }
            Json::String(s) => err(ValueError::InvalidName("translate", s.clone()), true),
            _ => err(ValueError::MalformedField("translate"), true),
        }
    }

    fn parse_email(&mut self, val: &Json, err: &mut ErrorSink<'_>) {
        match val {
            Json::String(s) if name::validate_email(s) => self.hostmaster = s.clone(),
            _ => err(ValueError::MalformedField("email"), true),
        }
    }

    fn parse_txt(&mut self, val: &Json, err: &mut ErrorSink<'_>) {
        for item in as_list(val) {
            match item {
                Json::String(s) => self.txt.push(segment_txt(s)),
                Json::Array(parts) => {
                    let mut segments = Vec::new();
                    let mut malformed = false;

                    for part in parts {
                        match part.as_str() {
                            Some(s) => segments.extend(segment_txt(s)),
                            None => malformed = true,
                        }
                    }

                    if malformed {
                        err(ValueError::MalformedField("txt"), true);
                    }
                    if !segments.is_empty() {
                        self.txt.push(segments);
                    }
                }
                _ => err(ValueError::MalformedField("txt"), true),
            }
        }
    }

    fn parse_ds(&mut self, val: &Json, err: &mut ErrorSink<'_>) {
        for item in tuple_list(val) {
            let fields = match item.as_array() {
                Some(fields) if fields.len() == 4 => fields,
                _ => {
                    err(ValueError::MalformedField("ds"), true);
                    continue;
                }
            };

            let key_tag = as_u16(&fields[0]);
            let algorithm = as_u8(&fields[1]);
            let digest_type = as_u8(&fields[2]);
            let digest = fields[3].as_str().and_then(|s| BASE64.decode(s).ok());

            match (key_tag, algorithm, digest_type, digest) {
                (Some(key_tag), Some(algorithm), Some(digest_type), Some(digest)) => {
                    let record = DsRecord {
                        key_tag,
                        algorithm,
                        digest_type,
                        digest,
                    };
                    if !self.ds.contains(&record) {
                        self.ds.push(record);
                    }
                }
                _ => err(ValueError::MalformedField("ds"), true),
            }
        }
    }

    fn parse_tlsa(&mut self, val: &Json, err: &mut ErrorSink<'_>) {
        let by_proto = match val.as_object() {
            Some(o) => o,
            None => {
                err(ValueError::MalformedField("tls"), true);
                return;
            }
        };

        for (proto, by_port) in by_proto {
            if !name::validate_service_name(proto) {
                err(ValueError::InvalidName("tls", proto.clone()), true);
                continue;
            }

            let by_port = match by_port.as_object() {
                Some(o) => o,
                None => {
                    err(ValueError::MalformedField("tls"), true);
                    continue;
                }
            };

            for (port_str, entries) in by_port {
                let port: u16 = match port_str.parse() {
                    Ok(p) => p,
                    Err(_) => {
                        err(ValueError::MalformedField("tls"), true);
                        continue;
                    }
                };

                for entry in tuple_list(entries) {
                    self.parse_tlsa_entry(port, proto, entry, err);
                }
            }
        }
    }

    fn parse_tlsa_entry(
        &mut self,
        port: u16,
        proto: &str,
        entry: &Json,
        err: &mut ErrorSink<'_>,
    ) {
        let fields = match entry.as_array() {
            Some(fields) if fields.len() == 4 => fields,
            _ => {
                err(ValueError::MalformedField("tls"), true);
                return;
            }
        };

        let usage = as_u8(&fields[0]);
        let selector = as_u8(&fields[1]);
        let matching_type = as_u8(&fields[2]);
        let certificate = fields[3].as_str().and_then(|s| BASE64.decode(s).ok());

        match (usage, selector, matching_type, certificate) {
            (Some(usage), Some(selector), Some(matching_type), Some(certificate)) => {
                let record = TlsaRecord {
                    port,
                    proto: proto.to_owned(),
                    usage,
                    selector,
                    matching_type,
                    certificate,
                };
                if !self.tlsa.contains(&record) {
                    self.tlsa.push(record);
                }
            }
            _ => err(ValueError::MalformedField("tls"), true),
        }
    }

    fn parse_mx(&mut self, val: &Json, err: &mut ErrorSink<'_>) {
        for item in tuple_list(val) {
            let fields = match item.as_array() {
                Some(fields) if fields.len() == 2 => fields,
                _ => {
                    err(ValueError::MalformedField("mx"), true);
                    continue;
                }
            };

            let preference = as_u16(&fields[0]);
            let exchange = fields[1].as_str();

            match (preference, exchange) {
                (Some(preference), Some(exchange))
                    if name::validate_rel_host_name(exchange) =>
                {
                    let record = MxRecord {
                        preference,
                        exchange: exchange.to_owned(),
                    };
                    if !self.mx.contains(&record) {
                        self.mx.push(record);
                    }
                }
                (Some(_), Some(exchange)) => {
                    err(ValueError::InvalidName("mx", exchange.to_owned()), true)
                }
                _ => err(ValueError::MalformedField("mx"), true),
            }
        }
    }

    fn parse_srv(&mut self, val: &Json, err: &mut ErrorSink<'_>) {
        for item in tuple_list(val) {
            let fields = match item.as_array() {
                Some(fields) if fields.len() == 6 => fields,
                _ => {
                    err(ValueError::MalformedField("srv"), true);
                    continue;
                }
            };

            let service = fields[0].as_str().filter(|s| name::validate_service_name(s));
            let proto = fields[1].as_str().filter(|s| name::validate_service_name(s));
            let priority = as_u16(&fields[2]);
            let weight = as_u16(&fields[3]);
            let port = as_u16(&fields[4]);
            let target = fields[5].as_str().filter(|s| name::validate_rel_host_name(s));

            match (service, proto, priority, weight, port, target) {
                (Some(service), Some(proto), Some(priority), Some(weight), Some(port), Some(target)) => {
                    let record = SrvRecord {
                        service: service.to_owned(),
                        proto: proto.to_owned(),
                        priority,
                        weight,
                        port,
                        target: target.to_owned(),
                    };
                    if !self.srv.contains(&record) {
                        self.srv.push(record);
                    }
                }
                _ => err(ValueError::MalformedField("srv"), true),
            }
        }
    }

    fn parse_map(&mut self, val: &Json, ctx: &mut ParseCtx<'_>, err: &mut ErrorSink<'_>) {
        let obj = match val.as_object() {
            Some(o) => o,
            None => {
                err(ValueError::MalformedField("map"), true);
                return;
            }
        };

        for (label, child_val) in obj {
            ctx.nodes += 1;
            if ctx.nodes > MAX_TREE_NODES {
                err(ValueError::TooManyNodes, false);
                return;
            }

            let mut child = Value::default();

            match child_val {
                //A bare string is shorthand for an address record.
                Json::String(s) => {
                    if let Ok(ip) = s.parse::<Ipv4Addr>() {
                        child.ip.push(ip);
                    } else if let Ok(ip6) = s.parse::<Ipv6Addr>() {
                        child.ip6.push(ip6);
                    } else if !s.is_empty() {
                        err(ValueError::MalformedField("map"), true);
                    }
                }
                Json::Object(o) => child.parse_object(o, ctx, err),
                _ => {
                    err(ValueError::MalformedField("map"), true);
                    continue;
                }
            }

            if label.is_empty() {
                //The empty key denotes this name itself.
                self.merge(child);
            } else if name::validate_owner_label(label) {
                match self.map.get_mut(label) {
                    Some(existing) => existing.merge(child),
                    None => {
                        self.map.insert(label.clone(), child);
                    }
                }
            } else {
                err(ValueError::InvalidName("map", label.clone()), true);
            }
        }
    }

    fn process_import(
        &mut self,
        key_spec: &str,
        dest: &str,
        ctx: &mut ParseCtx<'_>,
        err: &mut ErrorSink<'_>,
    ) {
        //A key may carry /-separated subpaths after the label (d/shared/www)
        //selecting a child of the imported value.
        let rest = match key_spec.strip_prefix("d/") {
            Some(rest) => rest,
            None => {
                err(ValueError::InvalidName("import", key_spec.to_owned()), true);
                return;
            }
        };

        let mut components = rest.split('/');
        let label = components.next().unwrap_or("");
        if !name::validate_domain_label(label) {
            err(ValueError::InvalidName("import", key_spec.to_owned()), true);
            return;
        }

        let src_key = format!("d/{}", label);
        let src_path: Vec<&str> = components.collect();

        if ctx.stack.iter().any(|k| k == &src_key) {
            err(ValueError::ImportCycle(src_key), false);
            return;
        }

        if ctx.stack.len() > MAX_IMPORT_DEPTH {
            err(ValueError::ImportDepthExceeded(src_key), false);
            return;
        }

        let resolver = match ctx.resolver {
            Some(r) => r,
            None => {
                err(
                    ValueError::ImportFailed(src_key, ZoneError::NotFound),
                    true,
                );
                return;
            }
        };

        let json = match resolver(&src_key) {
            Ok(json) => json,
            Err(e) => {
                err(ValueError::ImportFailed(src_key, e), true);
                return;
            }
        };

        let root: Json = match serde_json::from_str(&json) {
            Ok(v) => v,
            Err(e) => {
                err(ValueError::BadJson(e.to_string()), true);
                return;
            }
        };

        let obj = match root.as_object() {
            Some(o) => o,
            None => {
                err(ValueError::NotAnObject, true);
                return;
            }
        };

        let mut imported = Value::default();
        ctx.stack.push(src_key.clone());
        imported.parse_object(obj, ctx, err);
        ctx.stack.pop();

        //Walk subpath components down the imported tree.
        let mut selected = imported;
        for sub in src_path {
            match selected.map.remove(sub) {
                Some(child) => selected = child,
                None => {
                    err(
                        ValueError::ImportSubdomainMissing(src_key, sub.to_owned()),
                        true,
                    );
                    return;
                }
            }
        }

        //An explicit destination subname grafts the import beneath it.
        let mut host = &mut *self;
        if !dest.is_empty() {
            for label in dest.rsplit('.') {
                if !name::validate_owner_label(label) {
                    err(ValueError::InvalidName("import", dest.to_owned()), true);
                    return;
                }
                host = host.map.entry(label.to_owned()).or_default();
            }
        }

        host.merge(selected);
    }

    /// Merge an imported value into this one. Host entries keep their
    /// position ahead of imported ones; scalars prefer the host side.
    fn merge(&mut self, other: Value) {
        for ip in other.ip {
            if !self.ip.contains(&ip) {
                self.ip.push(ip);
            }
        }
        self.ip.sort_unstable();

        for ip6 in other.ip6 {
            if !self.ip6.contains(&ip6) {
                self.ip6.push(ip6);
            }
        }
        self.ip6.sort_unstable();

        for ns in other.ns {
            if !self.ns.contains(&ns) {
                self.ns.push(ns);
            }
        }

        if self.alias.is_none() {
            self.alias = other.alias;
        }
        if self.translate.is_none() {
            self.translate = other.translate;
        }
        if self.hostmaster.is_empty() {
            self.hostmaster = other.hostmaster;
        }

        for record in other.ds {
            if !self.ds.contains(&record) {
                self.ds.push(record);
            }
        }
        for record in other.tlsa {
            if !self.tlsa.contains(&record) {
                self.tlsa.push(record);
            }
        }
        for record in other.mx {
            if !self.mx.contains(&record) {
                self.mx.push(record);
            }
        }
        for record in other.srv {
            if !self.srv.contains(&record) {
                self.srv.push(record);
            }
        }
        for record in other.txt {
            if !self.txt.contains(&record) {
                self.txt.push(record);
            }
        }

        for (label, child) in other.map {
            match self.map.get_mut(&label) {
                Some(existing) => existing.merge(child),
                None => {
                    self.map.insert(label, child);
                }
            }
        }
    }

    /// Expand this value and its children into resource records.
    ///
    /// `suffix` is the owner name this value is rendered at; `apex` is the
    /// name relative targets are absolutized against. Output is stably
    /// ordered by owner, then type, then input order.
    pub fn records(&self, suffix: &str, apex: &str) -> Vec<ResourceRecord> {
        self.records_with_sink(suffix, apex, &mut |_, _| {})
    }

    /// Like [`Value::records`], reporting truncation through `err`.
    pub fn records_with_sink(
        &self,
        suffix: &str,
        apex: &str,
        err: &mut ErrorSink<'_>,
    ) -> Vec<ResourceRecord> {
        let mut out = Vec::new();
        let mut truncated = false;
        self.rrs_recursive(&mut out, suffix, apex, &mut truncated, err);

        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.rrtype().cmp(&b.rrtype())));
        out
    }

    fn rrs_recursive(
        &self,
        out: &mut Vec<ResourceRecord>,
        suffix: &str,
        apex: &str,
        truncated: &mut bool,
        err: &mut ErrorSink<'_>,
    ) {
        self.rrs(out, suffix, apex, truncated, err);

        for (label, child) in &self.map {
            let child_suffix = format!("{}.{}", label, suffix);
            child.rrs_recursive(out, &child_suffix, apex, truncated, err);
        }
    }

    fn rrs(
        &self,
        out: &mut Vec<ResourceRecord>,
        suffix: &str,
        apex: &str,
        truncated: &mut bool,
        err: &mut ErrorSink<'_>,
    ) {
        //A DNAME or CNAME owner carries no other record data. Children are
        //unaffected and still expand beneath it.
        if let Some(translate) = &self.translate {
            push_rr(
                out,
                ResourceRecord::new(
                    suffix.to_owned(),
                    VALUE_TTL,
                    RData::Dname(DnameRecord {
                        target: absolutize(translate, apex),
                    }),
                ),
                truncated,
                err,
            );
            return;
        }

        if let Some(alias) = &self.alias {
            push_rr(
                out,
                ResourceRecord::new(
                    suffix.to_owned(),
                    VALUE_TTL,
                    RData::Cname(CnameRecord {
                        target: absolutize(alias, apex),
                    }),
                ),
                truncated,
                err,
            );
            return;
        }

        for ns in &self.ns {
            push_rr(
                out,
                ResourceRecord::new(
                    suffix.to_owned(),
                    VALUE_TTL,
                    RData::Ns(NsRecord {
                        nameserver: absolutize(ns, apex),
                    }),
                ),
                truncated,
                err,
            );
        }

        for record in &self.ds {
            push_rr(
                out,
                ResourceRecord::new(suffix.to_owned(), VALUE_TTL, RData::Ds(record.clone())),
                truncated,
                err,
            );
        }

        for ip in &self.ip {
            push_rr(
                out,
                ResourceRecord::new(suffix.to_owned(), VALUE_TTL, RData::A(ARecord { ip: *ip })),
                truncated,
                err,
            );
        }

        for ip in &self.ip6 {
            push_rr(
                out,
                ResourceRecord::new(
                    suffix.to_owned(),
                    VALUE_TTL,
                    RData::Aaaa(AaaaRecord { ip: *ip }),
                ),
                truncated,
                err,
            );
        }

        for record in &self.mx {
            push_rr(
                out,
                ResourceRecord::new(
                    suffix.to_owned(),
                    VALUE_TTL,
                    RData::Mx(MxRecord {
                        preference: record.preference,
                        exchange: absolutize(&record.exchange, apex),
                    }),
                ),
                truncated,
                err,
            );
        }

        for record in &self.srv {
            let mut record = record.clone();
            record.target = absolutize(&record.target, apex);
            push_rr(
                out,
                ResourceRecord::new(record.owner(suffix), VALUE_TTL, RData::Srv(record)),
                truncated,
                err,
            );
        }

        for record in &self.tlsa {
            push_rr(
                out,
                ResourceRecord::new(
                    record.owner(suffix),
                    VALUE_TTL,
                    RData::Tlsa(record.clone()),
                ),
                truncated,
                err,
            );
        }

        for segments in &self.txt {
            push_rr(
                out,
                ResourceRecord::new(
                    suffix.to_owned(),
                    VALUE_TTL,
                    RData::Txt(TxtRecord {
                        segments: segments.clone(),
                    }),
                ),
                truncated,
                err,
            );
        }

        if !self.hostmaster.is_empty() && suffix == apex {
            if let Some(mailbox) = hostmaster_mailbox(&self.hostmaster) {
                let primary_ns = self
                    .ns
                    .first()
                    .map(|ns| absolutize(ns, apex))
                    .unwrap_or_else(|| apex.to_owned());

                push_rr(
                    out,
                    ResourceRecord::new(
                        suffix.to_owned(),
                        VALUE_TTL,
                        RData::Soa(SoaRecord {
                            primary_ns,
                            mailbox,
                            serial: 1,
                            refresh: 600,
                            retry: 600,
                            expire: 7200,
                            minimum: 600,
                        }),
                    ),
                    truncated,
                    err,
                );
            }
        }
    }
}

fn push_rr(
    out: &mut Vec<ResourceRecord>,
    rr: ResourceRecord,
    truncated: &mut bool,
    err: &mut ErrorSink<'_>,
) {
    if out.len() >= MAX_RECORDS {
        if !*truncated {
            *truncated = true;
            err(ValueError::TooManyRecords(MAX_RECORDS), false);
        }
        return;
    }

    out.push(rr);
}

fn collect_imports(val: &Json, imports: &mut Vec<(String, String)>, err: &mut ErrorSink<'_>) {
    match val {
        Json::String(s) => imports.push((s.clone(), String::new())),
        Json::Array(items) => {
            for item in items {
                match item {
                    Json::String(s) => imports.push((s.clone(), String::new())),
                    Json::Array(pair) if pair.len() == 2 => {
                        match (pair[0].as_str(), pair[1].as_str()) {
                            (Some(key), Some(dest)) => {
                                imports.push((key.to_owned(), dest.to_owned()))
                            }
                            _ => err(ValueError::MalformedField("import"), true),
                        }
                    }
                    _ => err(ValueError::MalformedField("import"), true),
                }
            }
        }
        _ => err(ValueError::MalformedField("import"), true),
    }
}
