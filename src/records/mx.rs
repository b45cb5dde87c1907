/// MX Resource Record
///
///[RFC1035 Section 3.3.9 - MX RDATA format](https://www.rfc-editor.org/rfc/rfc1035#section-3.3.9)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MxRecord {
    //Preference    Lower values are tried first by sending agents
    pub preference: u16,
    //Exchange      Host name of the mail exchange for the owner
    pub exchange: String,
}

impl MxRecord {
    pub fn rdata(&self) -> String {
        format!("{} {}", self.preference, self.exchange)
    }
}
