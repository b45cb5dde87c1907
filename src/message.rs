use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::record::ResourceRecord;

/// Faults raised while decoding an incoming packet.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    #[error("packet is truncated")]
    Truncated,
    #[error("packet is malformed")]
    Malformed,
}

/// Message header
///
///[RFC1035 Section 4.1.1 - Header section format](https://www.rfc-editor.org/rfc/rfc1035#section-4.1.1)
#[derive(Clone, Debug, Default)]
pub struct Header {
    //ID        Identifier assigned by the querier, copied into the reply
    pub id: u16,
    //QR        False for a query, true for a response
    pub qr: bool,
    //OPCODE    Kind of query, copied into the response
    pub opcode: u8,
    //AA        Authoritative Answer, set on every answer this zone serves
    pub aa: bool,
    //TC        Truncation flag
    pub tc: bool,
    //RD        Recursion Desired, copied from the query
    pub rd: bool,
    //RA        Recursion Available; this is an authoritative-only service
    pub ra: bool,
    //RCODE     Response code
    pub rcode: u8,
    //Counts    Entries in the four sections that follow the header
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    pub fn parse(buf: &mut impl Buf) -> Result<Header, MessageError> {
        if buf.remaining() < 12 {
            return Err(MessageError::Truncated);
        }

        let id = buf.get_u16();
        let flags = buf.get_u16();

        Ok(Header {
            id,
            qr: flags & 0x8000 != 0,
            opcode: ((flags >> 11) & 0x0F) as u8,
            aa: flags & 0x0400 != 0,
            tc: flags & 0x0200 != 0,
            rd: flags & 0x0100 != 0,
            ra: flags & 0x0080 != 0,
            rcode: (flags & 0x000F) as u8,
            qdcount: buf.get_u16(),
            ancount: buf.get_u16(),
            nscount: buf.get_u16(),
            arcount: buf.get_u16(),
        })
    }

    pub fn write(&self, buf: &mut BytesMut) {
        buf.put_u16(self.id);

        let mut flags = 0u16;
        if self.qr {
            flags |= 0x8000;
        }
        flags |= u16::from(self.opcode & 0x0F) << 11;
        if self.aa {
            flags |= 0x0400;
        }
        if self.tc {
            flags |= 0x0200;
        }
        if self.rd {
            flags |= 0x0100;
        }
        if self.ra {
            flags |= 0x0080;
        }
        flags |= u16::from(self.rcode & 0x0F);
        buf.put_u16(flags);

        buf.put_u16(self.qdcount);
        buf.put_u16(self.ancount);
        buf.put_u16(self.nscount);
        buf.put_u16(self.arcount);
    }
}

/// Question section entry
///
///[RFC1035 Section 4.1.2 - Question section format](https://www.rfc-editor.org/rfc/rfc1035#section-4.1.2)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    //Name      Queried owner name, absolute with trailing dot
    pub name: String,
    //QType     Record type asked for; 255 requests all types
    pub qtype: u16,
    //QClass    Network class asked for, normally IN (1)
    pub qclass: u16,
}

impl Question {
    pub fn parse(buf: &mut impl Buf) -> Result<Question, MessageError> {
        let name = read_name(buf)?;

        if buf.remaining() < 4 {
            return Err(MessageError::Truncated);
        }

        Ok(Question {
            name,
            qtype: buf.get_u16(),
            qclass: buf.get_u16(),
        })
    }

    pub fn write(&self, buf: &mut BytesMut) {
        write_name(buf, &self.name);
        buf.put_u16(self.qtype);
        buf.put_u16(self.qclass);
    }
}

/// A DNS message: header, question and the three record sections.
///
///[RFC1035 Section 4.1 - Format](https://www.rfc-editor.org/rfc/rfc1035#section-4.1)
#[derive(Clone, Debug, Default)]
pub struct DnsMessage {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

impl DnsMessage {
    /// Decode the header and question section of an incoming query. Record
    /// sections of the query are ignored.
    pub fn parse_query(packet: &[u8]) -> Result<DnsMessage, MessageError> {
        let mut buf = packet;

        let header = Header::parse(&mut buf)?;

        let mut questions = Vec::with_capacity(usize::from(header.qdcount));
        for _ in 0..header.qdcount {
            questions.push(Question::parse(&mut buf)?);
        }

        Ok(DnsMessage {
            header,
            questions,
            ..DnsMessage::default()
        })
    }

    /// Encode the message. Section counts are taken from the section
    /// vectors; names are written without compression.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(512);

        let mut header = self.header.clone();
        header.qdcount = self.questions.len() as u16;
        header.ancount = self.answers.len() as u16;
        header.nscount = self.authorities.len() as u16;
        header.arcount = self.additionals.len() as u16;
        header.write(&mut buf);

        for question in &self.questions {
            question.write(&mut buf);
        }
        for rr in &self.answers {
            write_rr(&mut buf, rr);
        }
        for rr in &self.authorities {
            write_rr(&mut buf, rr);
        }
        for rr in &self.additionals {
            write_rr(&mut buf, rr);
        }

        buf.freeze()
    }
}

//Split a presentation name into labels, honoring backslash-escaped dots
//(as produced for SOA mailboxes).
fn name_labels(name: &str) -> Vec<String> {
    let mut labels = Vec::new();
    let mut current = String::new();
    let mut chars = name.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '.' => {
                if !current.is_empty() {
                    labels.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        labels.push(current);
    }

    labels
}

/// Write a name as length-prefixed labels with a terminating zero octet.
pub fn write_name(buf: &mut BytesMut, name: &str) {
    for label in name_labels(name) {
        buf.put_u8(label.len() as u8);
        buf.put_slice(label.as_bytes());
    }

    buf.put_u8(0);
}

fn read_name(buf: &mut impl Buf) -> Result<String, MessageError> {
    let mut name = String::new();

    loop {
        if !buf.has_remaining() {
            return Err(MessageError::Truncated);
        }

        let len = buf.get_u8() as usize;
        if len == 0 {
            break;
        }

        //Compression pointers never appear in a question name.
        if len & 0xC0 != 0 {
            return Err(MessageError::Malformed);
        }

        if buf.remaining() < len {
            return Err(MessageError::Truncated);
        }

        let mut label = vec![0u8; len];
        buf.copy_to_slice(&mut label);
        let label = String::from_utf8(label).map_err(|_| MessageError::Malformed)?;

        name.push_str(&label);
        name.push('.');
    }

    if name.is_empty() {
        name.push('.');
    }

    Ok(name)
}

/// Write a complete resource record, backfilling RDLENGTH once the RDATA
/// is known.
pub fn write_rr(buf: &mut BytesMut, rr: &ResourceRecord) {
    write_name(buf, &rr.name);
    buf.put_u16(rr.rrtype() as u16);
    buf.put_u16(rr.class as u16);
    buf.put_u32(rr.ttl);

    let length_at = buf.len();
    buf.put_u16(0);
    write_rdata(buf, rr);

    let rdlength = (buf.len() - length_at - 2) as u16;
    buf[length_at..length_at + 2].copy_from_slice(&rdlength.to_be_bytes());
}

fn write_rdata(buf: &mut BytesMut, rr: &ResourceRecord) {
    use crate::record::RData;

    match &rr.rdata {
        RData::A(r) => buf.put_slice(&r.ip.octets()),
        RData::Aaaa(r) => buf.put_slice(&r.ip.octets()),
        RData::Ns(r) => write_name(buf, &r.nameserver),
        RData::Cname(r) => write_name(buf, &r.target),
        RData::Dname(r) => write_name(buf, &r.target),
        RData::Soa(r) => {
            write_name(buf, &r.primary_ns);
            write_name(buf, &r.mailbox);
            buf.put_u32(r.serial);
            buf.put_u32(r.refresh);
            buf.put_u32(r.retry);
            buf.put_u32(r.expire);
            buf.put_u32(r.minimum);
        }
        RData::Mx(r) => {
            buf.put_u16(r.preference);
            write_name(buf, &r.exchange);
        }
        RData::Srv(r) => {
            buf.put_u16(r.priority);
            buf.put_u16(r.weight);
            buf.put_u16(r.port);
            write_name(buf, &r.target);
        }
        RData::Txt(r) => {
            for segment in &r.segments {
                buf.put_u8(segment.len() as u8);
                buf.put_slice(segment.as_bytes());
            }
        }
        RData::Ds(r) => {
            buf.put_u16(r.key_tag);
            buf.put_u8(r.algorithm);
            buf.put_u8(r.digest_type);
            buf.put_slice(&r.digest);
        }
        RData::Tlsa(r) => {
            buf.put_u8(r.usage);
            buf.put_u8(r.selector);
            buf.put_u8(r.matching_type);
            buf.put_slice(&r.certificate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RData;
    use crate::records::ARecord;

    #[test]
    fn header_round_trip() {
        let header = Header {
            id: 0x1234,
            qr: true,
            opcode: 0,
            aa: true,
            rd: true,
            rcode: 3,
            qdcount: 1,
            ancount: 2,
            ..Header::default()
        };

        let mut buf = BytesMut::new();
        header.write(&mut buf);
        assert_eq!(buf.len(), 12);

        let parsed = Header::parse(&mut &buf[..]).unwrap();
        assert_eq!(parsed.id, 0x1234);
        assert!(parsed.qr);
        assert!(parsed.aa);
        assert!(parsed.rd);
        assert!(!parsed.ra);
        assert_eq!(parsed.rcode, 3);
        assert_eq!(parsed.qdcount, 1);
        assert_eq!(parsed.ancount, 2);
    }

    #[test]
    fn name_wire_form() {
        let mut buf = BytesMut::new();
        write_name(&mut buf, "example.bit.");
        assert_eq!(
            &buf[..],
            b"\x07example\x03bit\x00"
        );

        let parsed = read_name(&mut &buf[..]).unwrap();
        assert_eq!(parsed, "example.bit.");
    }

    #[test]
    fn escaped_dots_stay_inside_a_label() {
        let mut buf = BytesMut::new();
        write_name(&mut buf, "john\\.doe.example.com.");
        assert_eq!(&buf[..], b"\x08john.doe\x07example\x03com\x00");
    }

    #[test]
    fn question_round_trip() {
        let question = Question {
            name: "example.bit.".to_owned(),
            qtype: 1,
            qclass: 1,
        };

        let mut buf = BytesMut::new();
        question.write(&mut buf);

        let parsed = Question::parse(&mut &buf[..]).unwrap();
        assert_eq!(parsed, question);
    }

    #[test]
    fn query_parsing_rejects_compression() {
        //A question name beginning with a pointer octet.
        let mut packet = vec![0u8; 12];
        packet[5] = 1; //qdcount
        packet.extend_from_slice(&[0xC0, 0x0C, 0, 1, 0, 1]);

        assert!(matches!(
            DnsMessage::parse_query(&packet),
            Err(MessageError::Malformed)
        ));
    }

    #[test]
    fn rr_wire_form() {
        let rr = ResourceRecord::new(
            "example.bit.".to_owned(),
            600,
            RData::A(ARecord {
                ip: "192.0.2.1".parse().unwrap(),
            }),
        );

        let mut buf = BytesMut::new();
        write_rr(&mut buf, &rr);

        let expected: &[u8] = &[
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'b', b'i', b't', 0, //name
            0, 1, //type A
            0, 1, //class IN
            0, 0, 2, 88, //ttl 600
            0, 4, //rdlength
            192, 0, 2, 1, //address
        ];
        assert_eq!(&buf[..], expected);
    }
}
