use super::hex_upper;

/// DS Resource Record
///
/// Delegation signer: ties a child zone's DNSKEY into the parent.
///
///[RFC4034 Section 5 - The DS Resource Record](https://www.rfc-editor.org/rfc/rfc4034#section-5)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DsRecord {
    //KeyTag        Key tag of the referenced DNSKEY
    pub key_tag: u16,
    //Algorithm     Algorithm number of the referenced DNSKEY
    pub algorithm: u8,
    //DigestType    Algorithm used to construct the digest
    pub digest_type: u8,
    //Digest        Digest of the DNSKEY record, presented as upper-case hex
    pub digest: Vec<u8>,
}

impl DsRecord {
    pub fn rdata(&self) -> String {
        format!(
            "{} {} {} {}",
            self.key_tag,
            self.algorithm,
            self.digest_type,
            hex_upper(&self.digest)
        )
    }
}
