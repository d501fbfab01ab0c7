//! The datagram-sending seam between the client and the network.

use std::io;
use std::net::{SocketAddr, UdpSocket};

/// Where outgoing packets go. [crate::Client] is generic over this so tests
/// can capture traffic instead of opening sockets.
pub trait Transport {
    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize>;
}

impl Transport for UdpSocket {
    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, buf, addr)
    }
}
