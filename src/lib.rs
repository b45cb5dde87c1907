//! Authoritative DNS service for a zone backed by a key-value name store.
//!
//! Entries in the store are JSON "domain values" under keys of the form
//! `d/<label>`. Queries beneath the anchor label (`bit` by default) are
//! decomposed, routed to the store, and expanded into resource record sets.

//Logging
extern crate pretty_env_logger;
#[macro_use]
extern crate log;

use thiserror::Error;

pub mod backend;
pub mod message;
pub mod name;
pub mod record;
pub mod records;
pub mod server;
pub mod value;

pub use backend::{Backend, Config, NameSource};
pub use record::ResourceRecord;
pub use server::ZoneServer;
pub use value::{parse_value, Value};

/// Anchor label marking the boundary of the zone. Names without it are out
/// of zone.
pub const DEFAULT_ANCHOR: &str = "bit";

/// Label of the reserved introspection sub-zone (`x--nmc.<anchor>`).
pub const META_LABEL: &str = "x--nmc";

/// Shared error for name handling, key mapping and zone lookups.
///
/// The hosting layer maps these onto DNS response codes: `NotInZone` becomes
/// REFUSED, `NoSuchDomain` NXDOMAIN, `Transient` SERVFAIL and `NoResults` an
/// empty NOERROR answer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ZoneError {
    #[error("name is not within the zone")]
    NotInZone,
    #[error("no such domain")]
    NoSuchDomain,
    #[error("domain has no records")]
    NoResults,
    #[error("invalid domain name")]
    InvalidDomainName,
    #[error("invalid domain name key")]
    InvalidDomainKey,
    #[error("key was not found in the name store")]
    NotFound,
    #[error("transient name store failure")]
    Transient,
}
