use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use super::types::{TlsInfo, Timing};
use crate::error::ConnectError;

/// Milestones of a single exchange, fired in wire order by the transport.
pub trait NetworkEventListener: Send + Sync {
    fn get_conn(&self, host_port: &str);
    fn dns_start(&self, host: &str);
    fn dns_done(&self, addrs: &[SocketAddr]);
    fn connect_start(&self, addr: SocketAddr);
    fn connect_done(&self, addr: SocketAddr, error: Option<&io::Error>);
    fn tls_handshake_start(&self);
    fn tls_handshake_done(&self, info: &TlsInfo);
    fn got_conn(&self);
    fn wrote_request(&self);
    fn first_response_byte(&self);
}

#[derive(Debug, Default)]
struct Recorded {
    timing: Timing,
    connect_error: Option<ConnectError>,
}

/// Records milestone timestamps for one request.
///
/// Hooks may fire from the connection task, so state sits behind a mutex and
/// is only read back through [`TimingRecorder::finish`].
#[derive(Debug, Default)]
pub struct TimingRecorder {
    state: Mutex<Recorded>,
}

impl TimingRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, Recorded> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stamp(&self, update: impl FnOnce(&mut Timing, Instant)) {
        let now = Instant::now();
        update(&mut self.state().timing, now);
    }

    /// Closes the measurement at `total_time` and returns what was recorded.
    #[must_use]
    pub fn finish(&self, total_time: Instant) -> (Timing, Option<ConnectError>) {
        let mut state = self.state();
        state.timing.total_time = Some(total_time);
        (state.timing, state.connect_error.clone())
    }
}

impl NetworkEventListener for TimingRecorder {
    fn get_conn(&self, _host_port: &str) {
        self.stamp(|timing, now| timing.start = Some(now));
    }

    fn dns_start(&self, _host: &str) {
        self.stamp(|timing, now| timing.dns_start = Some(now));
    }

    fn dns_done(&self, _addrs: &[SocketAddr]) {
        self.stamp(|timing, now| timing.dns_end = Some(now));
    }

    fn connect_start(&self, _addr: SocketAddr) {
        // IP literals skip resolution entirely.
        self.stamp(|timing, now| {
            if timing.dns_end.is_none() {
                timing.dns_end = Some(now);
            }
        });
    }

    fn connect_done(&self, addr: SocketAddr, error: Option<&io::Error>) {
        let now = Instant::now();
        let mut state = self.state();
        state.timing.tcp_connect = Some(now);
        state.connect_error = error.map(|err| ConnectError {
            addr,
            reason: err.to_string(),
        });
    }

    fn tls_handshake_start(&self) {
        self.stamp(|timing, now| timing.tls_handshake_start = Some(now));
    }

    fn tls_handshake_done(&self, _info: &TlsInfo) {
        self.stamp(|timing, now| timing.tls_handshake_end = Some(now));
    }

    fn got_conn(&self) {
        self.stamp(|timing, now| timing.server_connect = Some(now));
    }

    fn wrote_request(&self) {
        self.stamp(|timing, now| timing.request_sent = Some(now));
    }

    fn first_response_byte(&self) {
        self.stamp(|timing, now| {
            if timing.ttfb.is_none() {
                timing.ttfb = Some(now);
            }
        });
    }
}

/// Reports request writes and the first response byte to a listener.
///
/// Writes stop being reported once the response has started, so the last
/// reported write is the end of the request.
pub(crate) struct ObservedStream<S> {
    inner: S,
    listener: Arc<dyn NetworkEventListener>,
    response_started: bool,
}

impl<S> ObservedStream<S> {
    pub(crate) const fn new(inner: S, listener: Arc<dyn NetworkEventListener>) -> Self {
        Self {
            inner,
            listener,
            response_started: false,
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for ObservedStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if matches!(poll, Poll::Ready(Ok(())))
            && !this.response_started
            && buf.filled().len() > before
        {
            this.response_started = true;
            this.listener.first_response_byte();
        }
        poll
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for ObservedStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(written)) = poll
            && written > 0
            && !this.response_started
        {
            this.listener.wrote_request();
        }
        poll
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_write_vectored(cx, bufs);
        if let Poll::Ready(Ok(written)) = poll
            && written > 0
            && !this.response_started
        {
            this.listener.wrote_request();
        }
        poll
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
