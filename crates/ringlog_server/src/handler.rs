//! Per-connection protocol handling.
//!
//! Clients send newline-terminated lines. Ordinary lines are appended to the
//! sink; after every read from the socket that completed at least one
//! ordinary line, the full sink contents are written back. A line of the
//! form `AESDCHAR_IOCSEEKTO:X,Y` is a control command: it is not stored, and
//! the stream from byte `Y` of record `X` onwards is written back instead.

use crate::error::{ServerError, ServerResult};
use crate::sink::{run_blocking, LogSink};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Prefix of the record seek control command.
pub const SEEKTO_PREFIX: &[u8] = b"AESDCHAR_IOCSEEKTO:";

/// A control command sent in-band by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Seek to byte `offset` of live record `ordinal`.
    SeekTo {
        /// Record ordinal, 0 = oldest.
        ordinal: u64,
        /// Byte within the record.
        offset: u64,
    },
}

/// Recognizes a control command.
///
/// Returns `None` for ordinary data, `Some(Err(..))` for a line that has the
/// command prefix but malformed arguments.
pub fn parse_command(line: &[u8]) -> Option<ServerResult<Command>> {
    let args = line.strip_prefix(SEEKTO_PREFIX)?;
    let args = std::str::from_utf8(args)
        .map(|s| s.trim_end_matches(['\n', '\r']))
        .map_err(|_| ServerError::InvalidCommand("non-UTF-8 arguments".into()));

    Some(args.and_then(|args| {
        let (ordinal, offset) = args
            .split_once(',')
            .ok_or_else(|| ServerError::InvalidCommand(format!("expected X,Y, got {args:?}")))?;
        let parse = |field: &str| {
            field
                .trim()
                .parse::<u64>()
                .map_err(|e| ServerError::InvalidCommand(format!("{field:?}: {e}")))
        };
        Ok(Command::SeekTo {
            ordinal: parse(ordinal)?,
            offset: parse(offset)?,
        })
    }))
}

/// Handles one client connection at a time against a shared sink.
#[derive(Clone)]
pub struct ConnectionHandler {
    sink: Arc<dyn LogSink>,
    recv_buffer_size: usize,
    max_line_bytes: usize,
}

impl ConnectionHandler {
    /// Creates a handler.
    pub fn new(sink: Arc<dyn LogSink>, recv_buffer_size: usize, max_line_bytes: usize) -> Self {
        Self {
            sink,
            recv_buffer_size: recv_buffer_size.max(1),
            max_line_bytes,
        }
    }

    /// Serves a connection until the client closes it.
    ///
    /// A line longer than `max_line_bytes` is discarded up to and including
    /// its newline; no part of it reaches the sink.
    ///
    /// An unterminated tail left when the client disconnects is handed to
    /// the sink as a partial write. A device sink keeps one pending buffer
    /// for all writers, so that tail is completed by whichever line is
    /// appended next, possibly from another connection.
    ///
    /// # Errors
    ///
    /// Returns an error on socket failure or if the sink rejects data.
    pub async fn handle<S>(&self, mut stream: S) -> ServerResult<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut buf = vec![0u8; self.recv_buffer_size];
        let mut line = Vec::new();
        let mut discarding = false;

        loop {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                break;
            }

            let mut stored_line = false;
            for chunk in buf[..n].split_inclusive(|&b| b == b'\n') {
                let terminated = chunk.ends_with(b"\n");
                if !discarding {
                    if line.len() + chunk.len() > self.max_line_bytes {
                        warn!(limit = self.max_line_bytes, "oversized line discarded");
                        line.clear();
                        discarding = true;
                    } else {
                        line.extend_from_slice(chunk);
                    }
                }
                if !terminated {
                    continue;
                }
                if discarding {
                    discarding = false;
                    continue;
                }

                match parse_command(&line) {
                    Some(Ok(Command::SeekTo { ordinal, offset })) => {
                        debug!(ordinal, offset, "seek command");
                        let reply = run_blocking(&self.sink, move |sink| sink.read_from_record(ordinal, offset)).await;
                        match reply {
                            Ok(data) => stream.write_all(&data).await?,
                            Err(err) if err.is_client_error() => {
                                warn!(ordinal, offset, error = %err, "seek command rejected");
                            }
                            Err(err) => return Err(err),
                        }
                    }
                    Some(Err(err)) => {
                        warn!(error = %err, "malformed command ignored");
                    }
                    None => {
                        let data = std::mem::take(&mut line);
                        run_blocking(&self.sink, move |sink| sink.append(&data)).await?;
                        stored_line = true;
                    }
                }
                line.clear();
            }

            if stored_line {
                let contents = run_blocking(&self.sink, |sink| sink.contents()).await?;
                stream.write_all(&contents).await?;
            }
        }

        if !discarding && !line.is_empty() {
            run_blocking(&self.sink, move |sink| sink.append(&line)).await?;
        }
        stream.flush().await?;
        Ok(())
    }
}
