// src/services/osc_sender.rs
// Outbound side: once per tick, send the current value of every bound field
// that changed since it was last sent.

use nannou_osc as osc;

use crate::controllers::BoundField;
use crate::error::SendError;
use crate::host::{Host, ObjectRef};
use crate::models::Value;

pub const GREETING_ADDRESS: &str = "/oscbridge";

struct OutboundTarget {
    address: String,
    target: ObjectRef,
    field: String,
    component: Option<usize>,
    last_sent: Option<Value>,
}

pub struct OscSender {
    sender: osc::Sender,
    target_addr: String,
    target_port: u16,
    targets: Vec<OutboundTarget>,
}

impl OscSender {
    /// One outbound entry per distinct target + field + component; the first
    /// binding in table order owns the address.
    pub fn new(target_addr: &str, target_port: u16, bound: &[BoundField]) -> Result<Self, SendError> {
        let sender = osc::sender()?;

        let mut targets: Vec<OutboundTarget> = Vec::new();
        for field in bound {
            let duplicate = targets.iter().any(|t| {
                t.target == field.target && t.field == field.field && t.component == field.component
            });
            if duplicate {
                log::debug!("{} shares its field with another binding, not sent", field.address);
                continue;
            }
            targets.push(OutboundTarget {
                address: field.address.clone(),
                target: field.target,
                field: field.field.clone(),
                component: field.component,
                last_sent: None,
            });
        }

        Ok(Self {
            sender,
            target_addr: target_addr.to_string(),
            target_port,
            targets,
        })
    }

    fn send(&self, addr: &str, args: Vec<osc::Type>) -> Result<(), SendError> {
        self.sender
            .send(
                (addr.to_string(), args),
                (self.target_addr.as_str(), self.target_port),
            )
            .map(|_| ())
            .map_err(|e| SendError::Transmit {
                target: format!("{}:{}", self.target_addr, self.target_port),
                reason: format!("{:?}", e),
            })
    }

    /// Test message sent when the engine starts. Surfaces an unreachable
    /// destination before the session runs.
    pub fn send_greeting(&self) -> Result<(), SendError> {
        let args = vec![osc::Type::String("Hello from oscbridge".to_string())];
        self.send(GREETING_ADDRESS, args)
    }

    /// Send every changed value. Returns the number of messages sent.
    pub fn poll<H: Host>(&mut self, host: &H) -> Result<usize, SendError> {
        let mut sent = 0;
        for i in 0..self.targets.len() {
            let target = &self.targets[i];
            let Some(value) = host.read_field(target.target, &target.field, target.component) else {
                continue;
            };
            if target.last_sent.as_ref() == Some(&value) {
                continue;
            }

            self.send(&target.address, value.to_osc_args())?;
            self.targets[i].last_sent = Some(value);
            sent += 1;
        }
        Ok(sent)
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SceneHost;
    use std::net::UdpSocket;
    use std::time::Duration;

    fn bound(address: &str, target: ObjectRef, field: &str, component: Option<usize>) -> BoundField {
        BoundField {
            address: address.to_string(),
            target,
            field: field.to_string(),
            component,
        }
    }

    fn recv_message(socket: &UdpSocket) -> osc::Message {
        let mut buf = [0u8; 1536];
        let (len, _) = socket.recv_from(&mut buf).unwrap();
        crate::services::decode_datagram(&buf[..len]).unwrap().remove(0)
    }

    #[test]
    fn test_sends_only_changes() {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        peer.set_read_timeout(Some(Duration::from_millis(500))).unwrap();
        let port = peer.local_addr().unwrap().port();

        let mut host = SceneHost::new();
        let cube = host.add_object("objects['Cube']", [("location", Value::Vector(vec![1.0, 2.0, 3.0]))]);
        let mut sender = OscSender::new("127.0.0.1", port, &[bound("/cube/loc", cube, "location", None)]).unwrap();

        assert_eq!(sender.poll(&host).unwrap(), 1);
        let message = recv_message(&peer);
        assert_eq!(message.addr, "/cube/loc");
        assert_eq!(
            message.args,
            vec![osc::Type::Float(1.0), osc::Type::Float(2.0), osc::Type::Float(3.0)]
        );

        assert_eq!(sender.poll(&host).unwrap(), 0);

        host.set_field(cube, "location", Value::Vector(vec![1.0, 2.0, 4.0]));
        assert_eq!(sender.poll(&host).unwrap(), 1);
        assert_eq!(recv_message(&peer).args[2], osc::Type::Float(4.0));
    }

    #[test]
    fn test_one_message_per_distinct_field() {
        let mut host = SceneHost::new();
        let cube = host.add_object("objects['Cube']", [("location", Value::Vector(vec![0.0; 3]))]);
        let sender = OscSender::new(
            "127.0.0.1",
            9,
            &[
                bound("/a", cube, "location", None),
                bound("/b", cube, "location", None),
                bound("/c", cube, "location", Some(0)),
            ],
        )
        .unwrap();
        assert_eq!(sender.target_count(), 2);
    }

    #[test]
    fn test_greeting() {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        peer.set_read_timeout(Some(Duration::from_millis(500))).unwrap();
        let port = peer.local_addr().unwrap().port();

        let sender = OscSender::new("127.0.0.1", port, &[]).unwrap();
        sender.send_greeting().unwrap();
        assert_eq!(recv_message(&peer).addr, GREETING_ADDRESS);
    }
}
