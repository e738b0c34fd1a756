//! Fire-and-forget UDP relay between the HTTP side and the journal.
//!
//! The sender never waits for the receiver: a datagram sent while nothing is
//! listening, or lost on the way, is gone without any error on the sending
//! side. Payloads longer than the receiver's buffer are truncated by the OS.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::watch;

use crate::journal::JournalStore;
use crate::submission::handler;

pub struct RelaySender {
    socket: UdpSocket,
    destination: SocketAddr,
}

impl RelaySender {
    /// Bind an ephemeral local socket for sending to `destination`.
    pub async fn bind(destination: SocketAddr) -> io::Result<Self> {
        let local: SocketAddr = if destination.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        Ok(Self {
            socket,
            destination,
        })
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Transmit `payload` once. Success only means the local stack accepted it.
    pub async fn send(&self, payload: &[u8]) -> io::Result<usize> {
        self.socket.send_to(payload, self.destination).await
    }
}

pub struct RelayReceiver {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl RelayReceiver {
    pub async fn bind(addr: SocketAddr, capacity: usize) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket,
            buf: vec![0; capacity],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Wait for the next datagram.
    pub async fn recv(&mut self) -> io::Result<(Vec<u8>, SocketAddr)> {
        let (len, from) = self.socket.recv_from(&mut self.buf).await?;

        if len == self.buf.len() {
            tracing::warn!(
                "Datagram from {from} filled the {} byte relay buffer and may be truncated",
                self.buf.len()
            );
        }

        Ok((self.buf[..len].to_vec(), from))
    }

    /// Receive datagrams and store each one until `shutdown` flips.
    /// Submissions are handled one at a time in arrival order.
    pub async fn run(mut self, journal: Arc<JournalStore>, mut shutdown: watch::Receiver<bool>) {
        match self.local_addr() {
            Ok(addr) => tracing::info!("Relay listening on {addr}"),
            Err(e) => tracing::warn!("Relay listening on unknown address: {e}"),
        }

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                received = self.recv() => match received {
                    Ok((payload, from)) => {
                        tracing::info!("Received {} bytes from {from}", payload.len());
                        tracing::debug!("Payload: {}", String::from_utf8_lossy(&payload));
                        handler::handle(journal.clone(), payload).await;
                    }
                    Err(e) => {
                        tracing::error!("Relay receive error: {e}");
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Relay stopped");
    }
}
