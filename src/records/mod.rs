//One module per RDATA type. Each struct holds the typed fields of its
//record and renders the zone-file presentation of its RDATA.

pub mod a;
pub mod aaaa;
pub mod cname;
pub mod dname;
pub mod ds;
pub mod mx;
pub mod ns;
pub mod soa;
pub mod srv;
pub mod tlsa;
pub mod txt;

pub use a::ARecord;
pub use aaaa::AaaaRecord;
pub use cname::CnameRecord;
pub use dname::DnameRecord;
pub use ds::DsRecord;
pub use mx::MxRecord;
pub use ns::NsRecord;
pub use soa::SoaRecord;
pub use srv::SrvRecord;
pub use tlsa::TlsaRecord;
pub use txt::TxtRecord;

//Upper-hex without separators, the presentation form for digest fields.
fn hex_upper(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02X}", b)).collect()
}
