// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, OnceLock};

use anyhow::anyhow;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use log::{debug, error, info};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};

use crate::errors::{Error, Result};
use crate::handler::QueryHandler;
use crate::prompb::TimeSeries;

/// Path advertised by [`RemoteReadServer::url`]. The server has no router:
/// every path is answered as a remote read request.
pub const READ_PATH: &str = "/read";

/// First fatal failure seen by any exchange.
type FailureSlot = Arc<OnceLock<Error>>;

/// An HTTP server impersonating a remote read storage backend.
///
/// The series handed to [`RemoteReadServer::start`] are served unchanged for
/// the lifetime of the server. Any request that breaks the protocol contract
/// is aborted without a response and remembered; [`RemoteReadServer::close`]
/// returns it so the enclosing test fails. Dropping a server that recorded a
/// failure without closing it panics.
pub struct RemoteReadServer {
    local_addr: SocketAddr,
    series: Arc<[TimeSeries]>,
    failure: FailureSlot,
    shutdown: Option<oneshot::Sender<()>>,
    accept_loop: Option<JoinHandle<()>>,
}

impl RemoteReadServer {
    /// Starts serving `series` on an ephemeral localhost port.
    pub async fn start(series: impl Into<Arc<[TimeSeries]>>) -> Result<Self> {
        Self::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)), series).await
    }

    /// Starts serving `series` on `addr`.
    pub async fn bind(addr: SocketAddr, series: impl Into<Arc<[TimeSeries]>>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|source| Error::Bind {
            addr: addr.to_string(),
            source,
        })?;
        let local_addr = listener.local_addr()?;

        let series: Arc<[TimeSeries]> = series.into();
        let handler = Arc::new(QueryHandler::new(Arc::clone(&series)));
        let failure = FailureSlot::default();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let accept_loop = tokio::spawn(accept_loop(
            listener,
            handler,
            Arc::clone(&failure),
            shutdown_rx,
        ));

        info!(
            "Remote read server listening on {local_addr} with {} series",
            series.len()
        );

        Ok(Self {
            local_addr,
            series,
            failure,
            shutdown: Some(shutdown_tx),
            accept_loop: Some(accept_loop),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Full URL of the read endpoint.
    pub fn url(&self) -> String {
        format!("http://{}{READ_PATH}", self.local_addr)
    }

    /// Number of stored series.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Number of stored samples across all series.
    pub fn sample_count(&self) -> usize {
        self.series.iter().map(|s| s.samples.len()).sum()
    }

    /// The first fatal failure recorded so far, if any.
    pub fn fatal_error(&self) -> Option<&Error> {
        self.failure.get()
    }

    /// Stops accepting connections, drops open ones and reports the first
    /// exchange that failed.
    pub async fn close(mut self) -> Result<()> {
        if let Some(shutdown) = self.shutdown.take() {
            // The receiver is gone only if the accept loop already exited.
            let _ = shutdown.send(());
        }
        if let Some(accept_loop) = self.accept_loop.take()
            && let Err(e) = accept_loop.await
        {
            error!("Remote read accept loop failed: {e}");
        }
        info!("Remote read server on {} closed", self.local_addr);

        let failure = std::mem::take(&mut self.failure);
        match Arc::try_unwrap(failure) {
            Ok(slot) => slot.into_inner().map_or(Ok(()), Err),
            Err(shared) => shared
                .get()
                .map_or(Ok(()), |e| Err(Error::Aborted(e.to_string()))),
        }
    }
}

impl Drop for RemoteReadServer {
    // Panicking is how an unreported protocol violation fails the test.
    #[allow(clippy::panic)]
    fn drop(&mut self) {
        // `close` takes the sender, so it is only still here when the server
        // is dropped without being closed.
        let Some(shutdown) = self.shutdown.take() else {
            return;
        };
        let _ = shutdown.send(());

        if let Some(failure) = self.failure.get()
            && !std::thread::panicking()
        {
            error!("Remote read server dropped with an unreported failure: {failure}");
            panic!("remote read exchange failed: {failure}");
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    handler: Arc<QueryHandler>,
    failure: FailureSlot,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                let (stream, peer) = match accept_result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        error!("Failed to accept remote read connection: {e}");
                        continue;
                    }
                };
                debug!("Accepted remote read connection from {peer}");

                let io = TokioIo::new(stream);
                let handler = Arc::clone(&handler);
                let failure = Arc::clone(&failure);

                connections.spawn(async move {
                    let service = service_fn(move |req| {
                        let handler = Arc::clone(&handler);
                        let failure = Arc::clone(&failure);
                        async move { serve(&handler, &failure, req).await }
                    });
                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        debug!("Remote read connection from {peer} ended: {err}");
                    }
                });
            }
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            _ = &mut shutdown => {
                debug!("Remote read server shutting down");
                break;
            }
        }
    }

    connections.shutdown().await;
}

async fn serve(
    handler: &QueryHandler,
    failure: &OnceLock<Error>,
    req: Request<Incoming>,
) -> anyhow::Result<Response<Full<Bytes>>> {
    debug!("{} {}", req.method(), req.uri().path());

    match handler.handle(req).await {
        Ok(response) => Ok(response),
        Err(e) => {
            error!("Remote read exchange failed: {e}");
            let message = e.to_string();
            // Only the first failure is kept.
            let _ = failure.set(e);
            // Failing the service makes hyper drop the connection without
            // writing a response.
            Err(anyhow!("remote read exchange aborted: {message}"))
        }
    }
}
