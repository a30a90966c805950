//! Datagram transport: one datagram per command, no handshake.

use std::net::{ToSocketAddrs, UdpSocket};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

/// Default receiver port
pub const DEFAULT_PORT: u16 = 12345;

/// Default receiver host for the sender
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Largest UDP payload over IPv4
pub const MAX_DATAGRAM_SIZE: usize = 65507;

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("channel closed")]
    Closed,
    #[error("datagram too large: {0} bytes")]
    TooLarge(usize),
}

impl ChannelError {
    /// Errors a receive loop can shrug off and retry
    pub fn is_transient(&self) -> bool {
        match self {
            ChannelError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::TimedOut
                    // ICMP port-unreachable from an earlier send, reported on recv on some platforms
                    | std::io::ErrorKind::ConnectionReset
            ),
            _ => false,
        }
    }
}

/// Send/receive primitive, one datagram per logical message.
pub trait DatagramChannel {
    /// Block until a datagram arrives; returns its length in `buf`.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError>;
    fn send(&mut self, datagram: &[u8]) -> Result<(), ChannelError>;
}

/// UDP socket, optionally connected to a fixed peer for sending
pub struct UdpChannel {
    socket: UdpSocket,
    peer: Option<std::net::SocketAddr>,
}

impl UdpChannel {
    /// Bind a receiving socket
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, ChannelError> {
        let socket = UdpSocket::bind(addr)?;
        Ok(UdpChannel { socket, peer: None })
    }

    /// Bind an ephemeral local port and target `remote` for sends
    pub fn connect<A: ToSocketAddrs>(remote: A) -> Result<Self, ChannelError> {
        let peer = remote.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "no address to send to")
        })?;
        let local = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local)?;
        Ok(UdpChannel {
            socket,
            peer: Some(peer),
        })
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ChannelError> {
        Ok(self.socket.local_addr()?)
    }

    pub fn peer(&self) -> Option<std::net::SocketAddr> {
        self.peer
    }

    /// Set read timeout (None blocks forever)
    pub fn set_read_timeout(&self, dur: Option<Duration>) -> Result<(), ChannelError> {
        Ok(self.socket.set_read_timeout(dur)?)
    }
}

impl DatagramChannel for UdpChannel {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError> {
        let (len, from) = self.socket.recv_from(buf)?;
        log::trace!("[NET] <- {} bytes from {}", len, from);
        Ok(len)
    }

    fn send(&mut self, datagram: &[u8]) -> Result<(), ChannelError> {
        if datagram.len() > MAX_DATAGRAM_SIZE {
            return Err(ChannelError::TooLarge(datagram.len()));
        }
        let peer = self.peer.ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "no peer address")
        })?;
        let sent = self.socket.send_to(datagram, peer)?;
        log::trace!("[NET] -> {} bytes to {}", sent, peer);
        Ok(())
    }
}

/// In-process channel, for tests and replays. Datagrams are never lost.
pub struct MemoryChannel {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

impl MemoryChannel {
    /// Two connected ends
    pub fn pair() -> (MemoryChannel, MemoryChannel) {
        let (tx_a, rx_b) = mpsc::channel();
        let (tx_b, rx_a) = mpsc::channel();
        (
            MemoryChannel { tx: tx_a, rx: rx_a },
            MemoryChannel { tx: tx_b, rx: rx_b },
        )
    }
}

impl DatagramChannel for MemoryChannel {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError> {
        let datagram = self.rx.recv().map_err(|_| ChannelError::Closed)?;
        // Truncate like a real datagram socket would
        let len = datagram.len().min(buf.len());
        buf[..len].copy_from_slice(&datagram[..len]);
        Ok(len)
    }

    fn send(&mut self, datagram: &[u8]) -> Result<(), ChannelError> {
        if datagram.len() > MAX_DATAGRAM_SIZE {
            return Err(ChannelError::TooLarge(datagram.len()));
        }
        self.tx
            .send(datagram.to_vec())
            .map_err(|_| ChannelError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_udp_loopback() {
        let mut server = UdpChannel::bind("127.0.0.1:0").unwrap();
        server
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let addr = server.local_addr().unwrap();

        let mut client = UdpChannel::connect(addr).unwrap();
        assert_eq!(client.peer(), Some(addr));
        client.send(b"clear display: red").unwrap();

        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        let len = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"clear display: red");
    }

    #[test]
    fn test_unconnected_send_fails() {
        let mut server = UdpChannel::bind("127.0.0.1:0").unwrap();
        assert!(matches!(server.send(b"x"), Err(ChannelError::Io(_))));
    }

    #[test]
    fn test_oversized_datagram_rejected() {
        let (mut a, _b) = MemoryChannel::pair();
        let big = vec![b'x'; MAX_DATAGRAM_SIZE + 1];
        assert!(matches!(a.send(&big), Err(ChannelError::TooLarge(_))));
    }

    #[test]
    fn test_memory_pair_and_close() {
        let (mut a, mut b) = MemoryChannel::pair();
        a.send(b"one").unwrap();
        b.send(b"two").unwrap();

        let mut buf = [0u8; 16];
        let n = b.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"one");
        let n = a.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"two");

        drop(a);
        assert!(matches!(b.recv(&mut buf), Err(ChannelError::Closed)));
    }

    #[test]
    fn test_transient_errors() {
        let reset = ChannelError::Io(std::io::Error::from(std::io::ErrorKind::ConnectionReset));
        assert!(reset.is_transient());
        assert!(!ChannelError::Closed.is_transient());
    }
}
