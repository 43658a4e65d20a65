//! async-std runtime implementation.

use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use super::{AsyncUdpSocket, TimedOut};

pub struct UdpSocket(async_std::net::UdpSocket);

impl AsyncUdpSocket for UdpSocket {
    async fn connect_to(peer: SocketAddrV4) -> io::Result<Self> {
        let socket = async_std::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.connect(peer).await?;
        Ok(UdpSocket(socket))
    }

    async fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.0.send(buf).await
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.recv(buf).await
    }
}

pub(super) type Clock = std::time::Instant;

pub(super) async fn sleep_impl(duration: Duration) {
    async_std::task::sleep(duration).await
}

pub(super) async fn timeout_impl<F, T>(duration: Duration, future: F) -> Result<T, TimedOut>
where
    F: Future<Output = T>,
{
    async_std::future::timeout(duration, future)
        .await
        .map_err(|_| TimedOut)
}
