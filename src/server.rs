use std::io;
use std::net::SocketAddrV4;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tokio::net::UdpSocket;
use tokio::select;
use tokio_util::{codec::BytesCodec, udp::UdpFramed};

use crate::backend::{Backend, Config};
use crate::message::{DnsMessage, Header};
use crate::record::{RRType, ResourceRecord};
use crate::ZoneError;

//WILDCARD Constant
const IP_ANY: [u8; 4] = [0, 0, 0, 0];

/// The standard DNS service port.
pub const DEFAULT_PORT: u16 = 53;

const QTYPE_ANY: u16 = 255;

//Response codes
const RCODE_NOERROR: u8 = 0;
const RCODE_SERVFAIL: u8 = 2;
const RCODE_NXDOMAIN: u8 = 3;
const RCODE_REFUSED: u8 = 5;

/// Create Service Socket
///
/// Creates a UDP IPv4 socket and binds it to the wildcard 0.0.0.0 address
/// on the given port, with address reuse so a restarting instance can rebind
/// immediately.
pub fn create_socket(port: u16) -> io::Result<UdpSocket> {
    //Create a udp ip4 socket
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;

    //Allow this port to be reused by other sockets
    socket.set_reuse_address(true)?;
    socket.set_reuse_port(true)?;
    socket.set_nonblocking(true)?;

    //Create IPV4 any adress
    let address = SocketAddrV4::new(IP_ANY.into(), port);

    //Bind to wildcard 0.0.0.0
    socket.bind(&SockAddr::from(address))?;

    debug!("Bound Socket");

    //Convert to std::net udp socket
    let udp_std_socket: std::net::UdpSocket = socket.into();

    //Convert to tokio udp socket
    let udp_socket = UdpSocket::from_std(udp_std_socket)?;

    info!("Created a UDP Socket at {}", address);

    Ok(udp_socket)
}

/// Hosting glue around [`Backend`]: answers UDP queries on a socket until
/// interrupted.
///
/// Wire handling stays deliberately thin; record semantics live in the
/// backend and value model. DNSSEC signing and response caching belong to
/// an outer hosting layer.
pub struct ZoneServer {
    backend: Backend,
    port: u16,
}

impl ZoneServer {
    pub fn new(cfg: Config, port: u16) -> Result<ZoneServer, ZoneError> {
        Ok(ZoneServer {
            backend: Backend::new(cfg)?,
            port,
        })
    }

    pub fn with_backend(backend: Backend, port: u16) -> ZoneServer {
        ZoneServer { backend, port }
    }

    /// Run the service event loop.
    ///
    /// Binds the socket, then answers one datagram at a time until ctrl-c.
    /// Malformed packets are dropped without a reply.
    pub async fn run(&self) -> io::Result<()> {
        pretty_env_logger::init_timed();

        info!("Initializing zone service on port {}", self.port);

        //Socket
        let udp_socket = create_socket(self.port)?;

        let mut frame = UdpFramed::new(udp_socket, BytesCodec::new());

        loop {
            select! {
                Some(received) = frame.next() => {
                    match received {
                        Ok((packet, addr)) => {
                            if let Some(response) = self.handle_packet(&packet) {
                                frame.send((response, addr)).await?;
                            }
                        }
                        Err(e) => warn!("receive error: {}", e),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    fn handle_packet(&self, packet: &[u8]) -> Option<Bytes> {
        let query = match DnsMessage::parse_query(packet) {
            Ok(query) => query,
            Err(e) => {
                debug!("dropping packet: {}", e);
                return None;
            }
        };

        let question = query.questions.first()?.clone();
        debug!("query {:?} qtype {}", question.name, question.qtype);

        let mut response = DnsMessage {
            header: Header {
                id: query.header.id,
                qr: true,
                opcode: query.header.opcode,
                aa: true,
                rd: query.header.rd,
                rcode: RCODE_NOERROR,
                ..Header::default()
            },
            questions: vec![question.clone()],
            ..DnsMessage::default()
        };

        match self.backend.lookup(&question.name) {
            Ok(rrs) => response.answers = filter_by_qtype(rrs, question.qtype),
            Err(e) => {
                debug!("lookup {:?} failed: {}", question.name, e);
                response.header.rcode = rcode_for(e);
            }
        }

        Some(response.to_bytes())
    }
}

//The backend returns every record at an owner; the query type narrows the
//answer here. A CNAME always accompanies the answer so resolvers can chase
//the alias.
fn filter_by_qtype(rrs: Vec<ResourceRecord>, qtype: u16) -> Vec<ResourceRecord> {
    if qtype == QTYPE_ANY {
        return rrs;
    }

    rrs.into_iter()
        .filter(|rr| {
            let rrtype = rr.rrtype() as u16;
            rrtype == qtype || rrtype == RRType::Cname as u16
        })
        .collect()
}

fn rcode_for(err: ZoneError) -> u8 {
    match err {
        ZoneError::NotInZone => RCODE_REFUSED,
        ZoneError::NoSuchDomain
        | ZoneError::InvalidDomainName
        | ZoneError::InvalidDomainKey
        | ZoneError::NotFound => RCODE_NXDOMAIN,
        ZoneError::NoResults => RCODE_NOERROR,
        ZoneError::Transient => RCODE_SERVFAIL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Question;
    use crate::record::RData;
    use crate::records::{ARecord, CnameRecord};
    use std::collections::HashMap;

    fn fixture() -> ZoneServer {
        let backend = Backend::new(Config {
            fake_names: HashMap::from([(
                "d/example".to_owned(),
                r#"{"ip":"192.0.2.1"}"#.to_owned(),
            )]),
            fakes_only: true,
            ..Config::default()
        })
        .unwrap();

        ZoneServer::with_backend(backend, DEFAULT_PORT)
    }

    fn query(name: &str, qtype: u16) -> Vec<u8> {
        let message = DnsMessage {
            header: Header {
                id: 0x1234,
                rd: true,
                ..Header::default()
            },
            questions: vec![Question {
                name: name.to_owned(),
                qtype,
                qclass: 1,
            }],
            ..DnsMessage::default()
        };

        message.to_bytes().to_vec()
    }

    #[test]
    fn answers_a_query() {
        let server = fixture();

        let response = server.handle_packet(&query("example.bit.", 1)).unwrap();
        let header = Header::parse(&mut &response[..]).unwrap();

        assert_eq!(header.id, 0x1234);
        assert!(header.qr);
        assert!(header.aa);
        assert_eq!(header.rcode, RCODE_NOERROR);
        assert_eq!(header.qdcount, 1);
        assert_eq!(header.ancount, 1);
    }

    #[test]
    fn maps_errors_to_rcodes() {
        let server = fixture();

        let response = server.handle_packet(&query("missing.bit.", 1)).unwrap();
        let header = Header::parse(&mut &response[..]).unwrap();
        assert_eq!(header.rcode, RCODE_NXDOMAIN);
        assert_eq!(header.ancount, 0);

        let response = server.handle_packet(&query("example.com.", 1)).unwrap();
        let header = Header::parse(&mut &response[..]).unwrap();
        assert_eq!(header.rcode, RCODE_REFUSED);
    }

    #[test]
    fn drops_malformed_packets() {
        let server = fixture();
        assert!(server.handle_packet(&[0x12, 0x34]).is_none());
    }

    #[test]
    fn qtype_narrows_answers() {
        let a = ResourceRecord::new(
            "example.bit.".to_owned(),
            600,
            RData::A(ARecord {
                ip: "192.0.2.1".parse().unwrap(),
            }),
        );
        let cname = ResourceRecord::new(
            "alias.example.bit.".to_owned(),
            600,
            RData::Cname(CnameRecord {
                target: "example.bit.".to_owned(),
            }),
        );

        let rrs = vec![a.clone(), cname.clone()];

        assert_eq!(filter_by_qtype(rrs.clone(), QTYPE_ANY).len(), 2);
        //A query keeps the CNAME alongside the address.
        assert_eq!(filter_by_qtype(rrs.clone(), 1), vec![a, cname.clone()]);
        assert_eq!(filter_by_qtype(rrs, 28), vec![cname]);
    }
}
