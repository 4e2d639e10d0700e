//! ARP frame construction and reply parsing.

use std::net::Ipv4Addr;

use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::packet::Packet;
use pnet::util::MacAddr;

use crate::error::{DiscoverError, Result};

pub const ETH_HDR_LEN: usize = 14;
pub const ARP_LEN: usize = 28;
/// Ethernet minimum frame size without the frame check sequence.
pub const MIN_ETH_FRAME_NO_FCS: usize = 60;

/// An (ip, mac) pair taken from an ARP reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArpReply {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
}

/// Broadcast "who has `target_ip`" request from `src_mac`/`src_ip`.
pub fn build_request(src_mac: MacAddr, src_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Result<Vec<u8>> {
    let mut buffer = [0u8; MIN_ETH_FRAME_NO_FCS];

    {
        let mut eth = MutableEthernetPacket::new(&mut buffer[..])
            .ok_or_else(|| DiscoverError::Transport("ethernet buffer too small".to_string()))?;
        eth.set_destination(MacAddr::broadcast());
        eth.set_source(src_mac);
        eth.set_ethertype(EtherTypes::Arp);
    }

    let mut arp = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .ok_or_else(|| DiscoverError::Transport("ARP buffer too small".to_string()))?;
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(ArpOperations::Request);
    arp.set_sender_hw_addr(src_mac);
    arp.set_sender_proto_addr(src_ip);
    arp.set_target_hw_addr(MacAddr::zero());
    arp.set_target_proto_addr(target_ip);

    Ok(buffer.to_vec())
}

/// Extract the sender of an ARP reply frame. Anything else yields `None`.
pub fn parse_reply(frame: &[u8]) -> Option<ArpReply> {
    let eth = EthernetPacket::new(frame)?;
    if eth.get_ethertype() != EtherTypes::Arp {
        return None;
    }

    let arp = ArpPacket::new(eth.payload())?;
    if arp.get_operation() != ArpOperations::Reply {
        return None;
    }

    Some(ArpReply {
        ip: arp.get_sender_proto_addr(),
        mac: arp.get_sender_hw_addr(),
    })
}
