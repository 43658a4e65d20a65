//! smol runtime implementation.

use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use async_io::Async;
use futures::future::Either;

use super::{AsyncUdpSocket, TimedOut};

/// Non-blocking std socket driven by the async-io reactor.
pub struct UdpSocket(Async<std::net::UdpSocket>);

impl AsyncUdpSocket for UdpSocket {
    async fn connect_to(peer: SocketAddrV4) -> io::Result<Self> {
        let socket = std::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(peer)?;
        Async::new(socket).map(UdpSocket)
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
    smol::Timer::after(duration).await;
}

pub(super) async fn timeout_impl<F, T>(duration: Duration, future: F) -> Result<T, TimedOut>
where
    F: Future<Output = T>,
{
    let deadline = smol::Timer::after(duration);
    futures::pin_mut!(future);

    match futures::future::select(future, deadline).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(_) => Err(TimedOut),
    }
}
