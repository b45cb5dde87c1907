/// CNAME Resource Record
///
/// A CNAME is exclusive: no other record type may share its owner name.
///
///[RFC1035 Section 3.3.1 - CNAME RDATA format](https://www.rfc-editor.org/rfc/rfc1035#section-3.3.1)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CnameRecord {
    //Target    Absolute name this owner is an alias for
    pub target: String,
}

impl CnameRecord {
    pub fn rdata(&self) -> String {
        self.target.clone()
    }
}
