use super::hex_upper;

/// TLSA Resource Record
///
/// Published beneath `_<port>._<proto>.<owner>`.
///
///[RFC6698 Section 2 - The TLSA Resource Record](https://www.rfc-editor.org/rfc/rfc6698#section-2)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsaRecord {
    //Port      Port the association applies to
    pub port: u16,
    //Proto     Transport label, most commonly tcp or udp
    pub proto: String,
    //Usage     Certificate usage (e.g. 2 trust anchor, 3 domain-issued)
    pub usage: u8,
    //Selector  Which part of the certificate is matched (0 full, 1 SPKI)
    pub selector: u8,
    //Matching  How the association data is presented (0 exact, 1 SHA-256, 2 SHA-512)
    pub matching_type: u8,
    //Certificate   Association data, presented as upper-case hex
    pub certificate: Vec<u8>,
}

impl TlsaRecord {
    /// Owner name for this record beneath `suffix`.
    pub fn owner(&self, suffix: &str) -> String {
        format!("_{}._{}.{}", self.port, self.proto, suffix)
    }

    pub fn rdata(&self) -> String {
        format!(
            "{} {} {} {}",
            self.usage,
            self.selector,
            self.matching_type,
            hex_upper(&self.certificate)
        )
    }
}
