use std::net::UdpSocket;

use rosc::{OscBundle, OscMessage, OscPacket, OscTime, OscType};

use crate::bundle::Bundle;
use crate::error::OscError;
use crate::message::{Argument, Message};

/// Bundle timetag meaning "immediately" per the OSC spec.
const TIMETAG_IMMEDIATE: OscTime = OscTime {
    seconds: 0,
    fractional: 1,
};

/// Encode `message` and transmit it as a single datagram to `target`
/// (a "host:port" address). Synchronous; one datagram per call.
pub fn send_message(message: &Message, target: &str) -> Result<(), OscError> {
    send_packet(&OscPacket::Message(to_osc_message(message)), target)
}

/// Encode `bundle` (with all nested contents) and transmit it as a single
/// datagram to `target`.
pub fn send_bundle(bundle: &Bundle, target: &str) -> Result<(), OscError> {
    send_packet(&OscPacket::Bundle(to_osc_bundle(bundle)), target)
}

fn send_packet(packet: &OscPacket, target: &str) -> Result<(), OscError> {
    let buf = rosc::encoder::encode(packet)?;
    let socket = UdpSocket::bind("0.0.0.0:0").map_err(OscError::Send)?;
    socket.send_to(&buf, target).map_err(OscError::Send)?;
    Ok(())
}

fn to_osc_message(message: &Message) -> OscMessage {
    let args = message
        .args()
        .iter()
        .map(|arg| match arg {
            Argument::Int32(v) => OscType::Int(*v),
            Argument::Float32(v) => OscType::Float(*v),
            Argument::String(s) => OscType::String(s.clone()),
        })
        .collect();
    OscMessage {
        addr: message.address.clone(),
        args,
    }
}

fn to_osc_bundle(bundle: &Bundle) -> OscBundle {
    let mut content: Vec<OscPacket> = bundle
        .messages
        .iter()
        .map(|m| OscPacket::Message(to_osc_message(m)))
        .collect();
    content.extend(
        bundle
            .bundles
            .iter()
            .map(|b| OscPacket::Bundle(to_osc_bundle(b))),
    );
    OscBundle {
        timetag: TIMETAG_IMMEDIATE,
        content,
    }
}
