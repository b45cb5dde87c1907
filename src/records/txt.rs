/// TXT Resource Record
///
///[RFC1035 Section 3.3.14 - TXT RDATA format](https://www.rfc-editor.org/rfc/rfc1035#section-3.3.14)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxtRecord {
    //Segments  One or more <character-string>s of at most 255 octets each
    pub segments: Vec<String>,
}

impl TxtRecord {
    pub fn rdata(&self) -> String {
        self.segments
            .iter()
            .map(|segment| {
                format!("\"{}\"", segment.replace('\\', "\\\\").replace('"', "\\\""))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
