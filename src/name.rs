use once_cell::sync::Lazy;
use regex::Regex;

use crate::{ZoneError, DEFAULT_ANCHOR};

//Label grammars
//
//An owner name is any technically valid DNS name. RFC 2181 permits binary
//data in DNS labels, but the conventions enforced by web browsers are used
//instead. Domain labels are the stricter grammar used for keys in the name
//store, host labels the grammar for nameserver and mail targets.
const OWNER_LABEL: &str = "([a-z0-9_]|[a-z0-9_][a-z0-9_-]{0,61}[a-z0-9_])";
const DOMAIN_LABEL: &str = "(xn--)?([a-z0-9]+-)*[a-z0-9]+";
const HOST_LABEL: &str = "([a-z0-9]|[a-z0-9][a-z0-9-]*[a-z0-9])";

static RE_OWNER_LABEL: Lazy<Regex> = Lazy::new(|| anchored(OWNER_LABEL));
static RE_OWNER_NAME: Lazy<Regex> = Lazy::new(|| name_re(OWNER_LABEL));
static RE_REL_OWNER_NAME: Lazy<Regex> = Lazy::new(|| rel_name_re(OWNER_LABEL));

static RE_DOMAIN_LABEL: Lazy<Regex> = Lazy::new(|| anchored(DOMAIN_LABEL));
static RE_DOMAIN_NAME: Lazy<Regex> = Lazy::new(|| name_re(DOMAIN_LABEL));
static RE_REL_DOMAIN_NAME: Lazy<Regex> = Lazy::new(|| rel_name_re(DOMAIN_LABEL));

static RE_HOST_LABEL: Lazy<Regex> = Lazy::new(|| anchored(HOST_LABEL));
static RE_HOST_NAME: Lazy<Regex> = Lazy::new(|| name_re(HOST_LABEL));
static RE_REL_HOST_NAME: Lazy<Regex> = Lazy::new(|| rel_name_re(HOST_LABEL));

//RFC 5322 dot-atom mailbox, no display name permitted.
static RE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    let atom = "[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+";
    let label = "[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?";
    Regex::new(&format!(
        "^{atom}(\\.{atom})*@{label}(\\.{label})*$",
        atom = atom,
        label = label
    ))
    .unwrap()
});

fn anchored(label: &str) -> Regex {
    Regex::new(&format!("^{}$", label)).unwrap()
}

//One or more labels joined by dots, optional trailing dot.
fn name_re(label: &str) -> Regex {
    Regex::new(&format!("^({l}\\.)*{l}\\.?$", l = label)).unwrap()
}

//A relative name additionally permits the empty string and the `@` token,
//standing alone or as a final component.
fn rel_name_re(label: &str) -> Regex {
    Regex::new(&format!("^(|@|({l}\\.)*{l}(\\.@?)?)$", l = label)).unwrap()
}

pub fn validate_label_length(label: &str) -> bool {
    label.len() <= 63
}

/// A name may be up to 255 octets, or 256 when the trailing dot is present.
pub fn validate_name_length(name: &str) -> bool {
    name.len() <= 255 || (name.ends_with('.') && name.len() <= 256)
}

pub fn validate_owner_label(label: &str) -> bool {
    validate_label_length(label) && RE_OWNER_LABEL.is_match(label)
}

pub fn validate_owner_name(name: &str) -> bool {
    validate_name_length(name) && RE_OWNER_NAME.is_match(name)
}

pub fn validate_rel_owner_name(name: &str) -> bool {
    validate_name_length(name) && RE_REL_OWNER_NAME.is_match(name)
}

pub fn validate_domain_label(label: &str) -> bool {
    validate_label_length(label) && RE_DOMAIN_LABEL.is_match(label)
}

pub fn validate_domain_name(name: &str) -> bool {
    validate_name_length(name) && RE_DOMAIN_NAME.is_match(name)
}

pub fn validate_rel_domain_name(name: &str) -> bool {
    validate_name_length(name) && RE_REL_DOMAIN_NAME.is_match(name)
}

pub fn validate_host_label(label: &str) -> bool {
    validate_label_length(label) && RE_HOST_LABEL.is_match(label)
}

pub fn validate_host_name(name: &str) -> bool {
    validate_name_length(name) && RE_HOST_NAME.is_match(name)
}

pub fn validate_rel_host_name(name: &str) -> bool {
    validate_name_length(name) && RE_REL_HOST_NAME.is_match(name)
}

/// A service name is an owner label of at most 62 octets, leaving room for
/// the leading underscore it is published beneath.
pub fn validate_service_name(label: &str) -> bool {
    label.len() <= 62 && validate_owner_label(label)
}

/// Accepts only RFC 5322 mailbox forms with no display name.
pub fn validate_email(email: &str) -> bool {
    RE_EMAIL.is_match(email)
}

/// Split a name `a.b.c.d.e` into the rightmost label `e` and the remainder
/// `a.b.c.d`. A trailing dot is stripped first.
pub fn split_head(name: &str) -> (&str, &str) {
    let name = name.strip_suffix('.').unwrap_or(name);

    match name.rfind('.') {
        Some(i) => (&name[i + 1..], &name[..i]),
        None => (name, ""),
    }
}

/// Split a name `a.b.c.d.e` into the leftmost label `a` and the remainder
/// `b.c.d.e`. The trailing dot, if any, stays with the remainder.
pub fn split_tail(name: &str) -> (&str, &str) {
    match name.find('.') {
        Some(i) => (&name[..i], &name[i + 1..]),
        None => (name, ""),
    }
}

/// Decompose a query name around a floating anchor label.
///
/// For names of the form `Y1.Y2...Yn.ANCHOR.X1.X2...Xm.` this returns:
///
/// - `subname`: the labels beneath the basename (`Y1` through `Y(n-1)`)
/// - `basename`: the label directly beneath the anchor (`Yn`)
/// - `rootname`: `ANCHOR` through `Xm` inclusive
///
/// The anchor is searched from the right, so the rightmost occurrence wins.
/// If no label equals the anchor, [`ZoneError::NotInZone`] is returned. If
/// the anchor is the first label, `basename` is empty.
///
/// With `anchor = "bit"`:
///
/// ```text
/// "a.b.c.d."           -> NotInZone
/// "a.b.c.d.bit."       -> subname="a.b.c", basename="d", rootname="bit"
/// "d.bit."             -> subname="",      basename="d", rootname="bit"
/// "bit."               -> subname="",      basename="",  rootname="bit"
/// "d.bit.x.y.z."       -> subname="",      basename="d", rootname="bit.x.y.z"
/// ```
pub fn split_by_floating_anchor(
    qname: &str,
    anchor: &str,
) -> Result<(String, String, String), ZoneError> {
    let qname = qname.trim_end_matches('.');
    let parts: Vec<&str> = qname.split('.').collect();

    if parts.len() < 2 {
        if parts[0] != anchor {
            return Err(ZoneError::NotInZone);
        }

        return Ok((String::new(), String::new(), qname.to_owned()));
    }

    for i in (0..parts.len()).rev() {
        if parts[i] == anchor {
            if i == 0 {
                //The anchor is the first label, e.g. bit.x.y.z.
                return Ok((String::new(), String::new(), qname.to_owned()));
            }

            let rootname = parts[i..].join(".");
            let basename = parts[i - 1].to_owned();
            let subname = parts[..i - 1].join(".");
            return Ok((subname, basename, rootname));
        }
    }

    Err(ZoneError::NotInZone)
}

/// Convert a domain name basename (e.g. `example`) to its name store key
/// (`d/example`).
pub fn basename_to_key(basename: &str) -> Result<String, ZoneError> {
    if !validate_domain_label(basename) {
        return Err(ZoneError::InvalidDomainName);
    }

    Ok(format!("d/{}", basename))
}

/// Convert a name store key (e.g. `d/example`) back to the domain name
/// basename (`example`).
pub fn key_to_basename(key: &str) -> Result<String, ZoneError> {
    let basename = key.strip_prefix("d/").ok_or(ZoneError::InvalidDomainKey)?;

    if !validate_domain_label(basename) {
        return Err(ZoneError::InvalidDomainKey);
    }

    Ok(basename.to_owned())
}

/// Takes a name in the form `d/example` or `example.bit` and converts it to
/// the bareword `example`. Fails if the input is in neither form.
pub fn parse_fuzzy_domain_name(name: &str) -> Result<String, ZoneError> {
    if name.starts_with("d/") {
        return key_to_basename(name);
    }

    let name = name.strip_suffix('.').unwrap_or(name);

    let suffix = format!(".{}", DEFAULT_ANCHOR);
    if let Some(bare) = name.strip_suffix(&suffix) {
        if !validate_domain_label(bare) {
            return Err(ZoneError::InvalidDomainName);
        }

        return Ok(bare.to_owned());
    }

    Err(ZoneError::InvalidDomainName)
}

/// Fuzzy parse returning both the bareword and the name store key.
pub fn parse_fuzzy_domain_name_key(name: &str) -> Result<(String, String), ZoneError> {
    let bare = parse_fuzzy_domain_name(name)?;
    let key = basename_to_key(&bare)?;

    Ok((bare, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_head_and_tail() {
        //input, head, head rest, tail, tail rest
        let items = [
            ("", "", "", "", ""),
            ("a", "a", "", "a", ""),
            ("alpha", "alpha", "", "alpha", ""),
            ("alpha.beta", "beta", "alpha", "alpha", "beta"),
            ("alpha.beta.gamma", "gamma", "alpha.beta", "alpha", "beta.gamma"),
            (
                "alpha.beta.gamma.delta",
                "delta",
                "alpha.beta.gamma",
                "alpha",
                "beta.gamma.delta",
            ),
            (
                "alpha.beta.gamma.delta.",
                "delta",
                "alpha.beta.gamma",
                "alpha",
                "beta.gamma.delta.",
            ),
        ];

        for (input, head, rest, tail, trest) in items {
            assert_eq!(split_head(input), (head, rest), "head of {:?}", input);
            assert_eq!(split_tail(input), (tail, trest), "tail of {:?}", input);
        }
    }

    #[test]
    fn floating_anchor() {
        let items: [(&str, &str, Result<(&str, &str, &str), ZoneError>); 10] = [
            ("", "bit", Err(ZoneError::NotInZone)),
            (".", "bit", Err(ZoneError::NotInZone)),
            ("d.", "bit", Err(ZoneError::NotInZone)),
            ("a.b.c.d.", "bit", Err(ZoneError::NotInZone)),
            ("a.b.c.d.bit.", "bit", Ok(("a.b.c", "d", "bit"))),
            ("d.bit.", "bit", Ok(("", "d", "bit"))),
            ("bit.", "bit", Ok(("", "", "bit"))),
            ("bit.x.y.z.", "bit", Ok(("", "", "bit.x.y.z"))),
            ("d.bit.x.y.z.", "bit", Ok(("", "d", "bit.x.y.z"))),
            ("a.b.c.d.bit.x.y.z.", "bit", Ok(("a.b.c", "d", "bit.x.y.z"))),
        ];

        for (qname, anchor, expected) in items {
            let got = split_by_floating_anchor(qname, anchor);
            let expected = expected
                .map(|(s, b, r)| (s.to_owned(), b.to_owned(), r.to_owned()));
            assert_eq!(got, expected, "split of {:?}", qname);
        }
    }

    #[test]
    fn floating_anchor_recomposes() {
        for qname in ["a.b.c.d.bit.", "d.bit.", "bit.", "c.d.bit.x.y.z."] {
            let (subname, basename, rootname) =
                split_by_floating_anchor(qname, "bit").unwrap();

            let joined = [subname, basename, rootname]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(".");
            assert_eq!(joined, qname.trim_end_matches('.'));
        }
    }

    #[test]
    fn label_length_boundaries() {
        let l63 = "a".repeat(63);
        let l64 = "a".repeat(64);

        assert!(validate_owner_label(&l63));
        assert!(!validate_owner_label(&l64));
        assert!(validate_domain_label(&l63));
        assert!(!validate_domain_label(&l64));
        assert!(validate_host_label(&l63));
        assert!(!validate_host_label(&l64));
    }

    #[test]
    fn name_length_boundaries() {
        let l63 = "a".repeat(63);
        let name255 = [l63.as_str(); 4].join(".");
        assert_eq!(name255.len(), 255);

        let name256 = format!("{}.", name255);
        let name256_nodot = format!("{}a", name255);
        let name257 = format!("{}a.", name255);

        assert!(validate_name_length(&name255));
        assert!(validate_name_length(&name256));
        assert!(!validate_name_length(&name256_nodot));
        assert!(!validate_name_length(&name257));

        assert!(validate_owner_name(&name255));
        assert!(validate_owner_name(&name256));
    }

    #[test]
    fn service_name_length() {
        assert!(validate_service_name(&"a".repeat(62)));
        assert!(!validate_service_name(&"a".repeat(63)));
    }

    #[test]
    fn uppercase_never_validates() {
        assert!(!validate_owner_label("EXAMPLE"));
        assert!(!validate_domain_label("Example"));
        assert!(!validate_host_label("examplE"));
        assert!(!validate_owner_name("Example.bit."));
        assert!(!validate_domain_name("EXAMPLE.BIT"));
    }

    #[test]
    fn label_grammars() {
        //owner labels permit underscores, domain labels do not
        assert!(validate_owner_label("_tcp"));
        assert!(!validate_domain_label("_tcp"));

        assert!(validate_domain_label("example"));
        assert!(validate_domain_label("xn--zkr"));
        assert!(validate_domain_label("foo-bar"));
        assert!(!validate_domain_label("-foo"));
        assert!(!validate_domain_label("foo-"));
        assert!(!validate_domain_label(""));

        assert!(validate_host_label("a"));
        assert!(!validate_host_label("a_b"));

        //relative forms permit the empty string and the @ token
        assert!(validate_rel_owner_name(""));
        assert!(validate_rel_owner_name("@"));
        assert!(validate_rel_owner_name("www"));
        assert!(validate_rel_host_name("ns1.example.com."));
        assert!(!validate_rel_owner_name("..www"));
    }

    #[test]
    fn key_mapping_round_trip() {
        for basename in ["example", "e", "xn--zkr", "foo-bar"] {
            let key = basename_to_key(basename).unwrap();
            assert_eq!(key, format!("d/{}", basename));
            assert_eq!(key_to_basename(&key).unwrap(), basename);
        }

        assert_eq!(basename_to_key("Example"), Err(ZoneError::InvalidDomainName));
        assert_eq!(basename_to_key("no.dots"), Err(ZoneError::InvalidDomainName));
        assert_eq!(key_to_basename("dd/example"), Err(ZoneError::InvalidDomainKey));
        assert_eq!(key_to_basename("example"), Err(ZoneError::InvalidDomainKey));
        assert_eq!(key_to_basename("d/Example"), Err(ZoneError::InvalidDomainKey));
    }

    #[test]
    fn fuzzy_parsing() {
        assert_eq!(parse_fuzzy_domain_name("d/example").unwrap(), "example");
        assert_eq!(parse_fuzzy_domain_name("example.bit").unwrap(), "example");
        assert_eq!(parse_fuzzy_domain_name("example.bit.").unwrap(), "example");
        assert!(parse_fuzzy_domain_name("example.com").is_err());
        assert!(parse_fuzzy_domain_name("EXAMPLE.bit").is_err());
        assert!(parse_fuzzy_domain_name("a.example.bit").is_err());

        let (bare, key) = parse_fuzzy_domain_name_key("example.bit.").unwrap();
        assert_eq!(bare, "example");
        assert_eq!(key, "d/example");
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("hostmaster@example.bit"));
        assert!(validate_email("john.doe@example.com"));
        assert!(!validate_email("@example.bit"));
        assert!(!validate_email("hostmaster"));
        assert!(!validate_email("hostmaster@"));
        assert!(!validate_email("Hostmaster <hostmaster@example.bit>"));
    }
}
