/// SRV Resource Record
///
/// Published beneath `_<service>._<proto>.<owner>`.
///
///[RFC2782 - A DNS RR for specifying the location of services](https://www.rfc-editor.org/rfc/rfc2782)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SrvRecord {
    //Service  Symbolic name for the desired service, without the underscore
    pub service: String,
    //Proto    Transport label, most commonly tcp or udp
    pub proto: String,
    //Priority Clients contact hosts with the lowest priority first
    pub priority: u16,
    //Weight   Relative weight among entries of equal priority
    pub weight: u16,
    //Port     Port on which the service handles traffic
    pub port: u16,
    //Target   Host name of the target; must not be an alias
    pub target: String,
}

impl SrvRecord {
    /// Owner name for this record beneath `suffix`.
    pub fn owner(&self, suffix: &str) -> String {
        format!("_{}._{}.{}", self.service, self.proto, suffix)
    }

    pub fn rdata(&self) -> String {
        format!(
            "{} {} {} {}",
            self.priority, self.weight, self.port, self.target
        )
    }
}
