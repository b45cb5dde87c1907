/// SOA Resource Record
///
///[RFC1035 Section 3.3.13 - SOA RDATA format](https://www.rfc-editor.org/rfc/rfc1035#section-3.3.13)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoaRecord {
    //Primary   Name of the primary nameserver for the zone
    pub primary_ns: String,
    //Mailbox   RNAME form of the hostmaster mailbox, local part dots escaped
    pub mailbox: String,
    //Serial    Version number of the zone
    pub serial: u32,
    //Refresh   Seconds before the zone should be refreshed
    pub refresh: u32,
    //Retry     Seconds before a failed refresh should be retried
    pub retry: u32,
    //Expire    Seconds after which the zone is no longer authoritative
    pub expire: u32,
    //Minimum   Minimum TTL for records in the zone, also the negative TTL
    pub minimum: u32,
}

impl SoaRecord {
    pub fn rdata(&self) -> String {
        format!(
            "{} {} {} {} {} {} {}",
            self.primary_ns,
            self.mailbox,
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum
        )
    }
}
