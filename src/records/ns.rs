/// NS Resource Record
///
///[RFC1035 Section 3.3.11 - NS RDATA format](https://www.rfc-editor.org/rfc/rfc1035#section-3.3.11)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NsRecord {
    //Nameserver    Absolute host name of an authoritative server for the owner
    pub nameserver: String,
}

impl NsRecord {
    pub fn rdata(&self) -> String {
        self.nameserver.clone()
    }
}
