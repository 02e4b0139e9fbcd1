//! Main log server.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::ConnectionHandler;
use crate::sink::{open_sink, run_blocking, LogSink};
use chrono::{DateTime, Local};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Formats the record written by the timestamp writer.
pub fn format_timestamp(now: DateTime<Local>) -> String {
    now.format("timestamp:%Y-%m-%d %H:%M:%S\n").to_string()
}

/// The log server.
///
/// Accepts TCP connections, appends what clients send to the configured
/// sink and echoes the stored stream back.
///
/// # Example
///
/// ```no_run
/// use ringlog_server::{LogServer, ServerConfig};
///
/// # async fn run() -> ringlog_server::ServerResult<()> {
/// let server = LogServer::new(ServerConfig::default())?;
/// server.run().await
/// # }
/// ```
pub struct LogServer {
    config: ServerConfig,
    sink: Arc<dyn LogSink>,
}

impl LogServer {
    /// Creates a server and the sink its configuration describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be created.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let sink = open_sink(&config.sink)?;
        Ok(Self { config, sink })
    }

    /// Creates a server around an existing sink.
    pub fn with_sink(config: ServerConfig, sink: Arc<dyn LogSink>) -> Self {
        Self { config, sink }
    }

    /// Returns the shared sink.
    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds the configured address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(&self) -> ServerResult<TcpListener> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(addr = %listener.local_addr()?, "listening");
        Ok(listener)
    }

    /// Binds and serves until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or the sink cannot be closed.
    pub async fn run(self) -> ServerResult<()> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serves connections from `listener` until `shutdown` completes.
    ///
    /// On shutdown, in-flight connections are aborted and the sink is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be closed.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        let handler = ConnectionHandler::new(
            Arc::clone(&self.sink),
            self.config.recv_buffer_size,
            self.config.max_line_bytes,
        );
        let permits = Arc::new(Semaphore::new(self.config.max_connections.max(1)));
        let mut connections = JoinSet::new();

        let timestamps = self.config.timestamp_interval.map(|period| {
            let sink = Arc::clone(&self.sink);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let stamp = format_timestamp(Local::now());
                    if let Err(err) = run_blocking(&sink, move |s| s.append(stamp.as_bytes())).await {
                        warn!(error = %err, "timestamp write failed");
                    }
                }
            })
        });

        tokio::pin!(shutdown);
        loop {
            let permit = tokio::select! {
                () = &mut shutdown => break,
                permit = Arc::clone(&permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => continue,
            };

            tokio::select! {
                () = &mut shutdown => break,
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(err) => {
                            error!(error = %err, "accept failed");
                            continue;
                        }
                    };
                    info!(%peer, "Accepted connection");

                    let handler = handler.clone();
                    connections.spawn(async move {
                        if let Err(err) = handler.handle(stream).await {
                            warn!(%peer, error = %err, "connection failed");
                        }
                        info!(%peer, "Closed connection");
                        drop(permit);
                    });
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        info!("Caught signal, exiting");
        if let Some(task) = timestamps {
            task.abort();
        }
        connections.shutdown().await;
        run_blocking(&self.sink, |sink| sink.close()).await
    }
}

/// Completes on SIGINT, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
