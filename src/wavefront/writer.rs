use std::fmt;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use super::pool::ConnectionPool;
use super::{format, translate};
use crate::prompb;

// ─── Tuning ──────────────────────────────────────────────────────

/// Wall-clock budget for streaming one whole batch over the socket.
const WRITE_DEADLINE: Duration = Duration::from_secs(5);

// ─── Errors ──────────────────────────────────────────────────────

/// Failure modes of one write call. There are no retries: a batch either
/// fully succeeds or is reported failed with no partial-delivery count.
#[derive(Debug)]
pub enum WriteError {
    /// A new downstream connection could not be established.
    Connect(io::Error),
    /// An I/O error or deadline expiry while streaming an established
    /// connection. The offending connection has been discarded.
    Send(io::Error),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(e) => write!(f, "TCP connect fail: {e}"),
            Self::Send(e) => write!(f, "TCP writing error: {e}"),
        }
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect(e) | Self::Send(e) => Some(e),
        }
    }
}

// ─── Writer ──────────────────────────────────────────────────────

/// Ships decoded remote-write batches to the Wavefront proxy as line
/// protocol, one pooled connection per batch.
pub struct Writer {
    prefix: String,
    pool: ConnectionPool,
    write_deadline: Duration,
}

impl Writer {
    pub fn new(prefix: String, pool: ConnectionPool) -> Self {
        Self {
            prefix,
            pool,
            write_deadline: WRITE_DEADLINE,
        }
    }

    /// Stream every sample of `request` over one pooled connection.
    ///
    /// Series go out in request order, samples in series order, with no
    /// buffering or reordering. The connection goes back to the pool only
    /// on full success. On any failure it is dropped instead — a stream
    /// that errored mid-write is in an unknown state and reusing it could
    /// corrupt the next batch — which also frees its capacity slot.
    pub async fn write(&self, request: &prompb::WriteRequest) -> Result<(), WriteError> {
        let mut conn = self.pool.get().await?;

        let result = timeout(
            self.write_deadline,
            stream_batch(&mut conn.stream, &self.prefix, request),
        )
        .await;

        match result {
            Ok(Ok(())) => {
                self.pool.put_back(conn);
                Ok(())
            }
            Ok(Err(e)) => Err(WriteError::Send(e)),
            Err(_elapsed) => Err(WriteError::Send(io::Error::new(
                io::ErrorKind::TimedOut,
                "write deadline exceeded",
            ))),
        }
    }
}

/// Format and write every line of the batch, then flush.
async fn stream_batch<W>(
    writer: &mut W,
    prefix: &str,
    request: &prompb::WriteRequest,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for series in &request.timeseries {
        for point in translate::build_points(prefix, series) {
            let line = format::format_point(&point);
            writer.write_all(line.as_bytes()).await?;
        }
    }
    writer.flush().await
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn request(series: &[(&str, &[(f64, i64)])]) -> prompb::WriteRequest {
        prompb::WriteRequest {
            timeseries: series
                .iter()
                .map(|(name, samples)| prompb::TimeSeries {
                    labels: vec![prompb::Label {
                        name: "__name__".into(),
                        value: name.to_string(),
                    }],
                    samples: samples
                        .iter()
                        .map(|(value, timestamp)| prompb::Sample {
                            value: *value,
                            timestamp: *timestamp,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn streams_lines_in_batch_order() {
        let req = request(&[
            ("cpu", &[(0.5, 1000), (0.75, 2000)]),
            ("mem", &[(1.0, 3000)]),
        ]);

        let mut mock = tokio_test::io::Builder::new()
            .write(b"prom_cpu 0.500000 1000 source=\"\"\n")
            .write(b"prom_cpu 0.750000 2000 source=\"\"\n")
            .write(b"prom_mem 1.000000 3000 source=\"\"\n")
            .build();

        stream_batch(&mut mock, "prom", &req).await.unwrap();
    }

    #[tokio::test]
    async fn io_error_aborts_the_batch() {
        let req = request(&[("cpu", &[(0.5, 1000), (0.75, 2000)])]);

        let mut mock = tokio_test::io::Builder::new()
            .write(b"prom_cpu 0.500000 1000 source=\"\"\n")
            .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"))
            .build();

        let err = stream_batch(&mut mock, "prom", &req).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn successful_batch_returns_connection_to_pool() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let expected = b"prom_cpu 0.500000 1000 source=\"\"\n".len();
            while buf.len() < expected {
                let mut chunk = [0u8; 256];
                let n = sock.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before full batch arrived");
                buf.extend_from_slice(&chunk[..n]);
            }
            (buf, sock)
        });

        let writer = Writer::new("prom".into(), ConnectionPool::new(addr, 1));
        writer
            .write(&request(&[("cpu", &[(0.5, 1000)])]))
            .await
            .unwrap();

        let (received, _sock) = server.await.unwrap();
        assert_eq!(received, b"prom_cpu 0.500000 1000 source=\"\"\n");

        // With a capacity of one, an instant checkout proves the batch's
        // connection went back to the pool.
        let conn = timeout(Duration::from_millis(100), writer.pool.get())
            .await
            .expect("pool should hold the returned connection")
            .unwrap();
        drop(conn);
    }

    #[tokio::test]
    async fn failed_batch_discards_connection_and_frees_slot() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let accepted = Arc::new(AtomicUsize::new(0));

        // Accepts but never reads, so a large batch must stall.
        let counter = accepted.clone();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((sock, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(sock);
            }
        });

        let mut writer = Writer::new("prom".into(), ConnectionPool::new(addr, 1));
        writer.write_deadline = Duration::from_millis(100);

        // Far more data than loopback socket buffers will absorb.
        let samples: Vec<(f64, i64)> = (0..40_000).map(|i| (1.0, i)).collect();
        let series: Vec<(&str, &[(f64, i64)])> =
            (0..40).map(|_| ("cpu", samples.as_slice())).collect();
        let req = request(&series);

        let err = writer.write(&req).await.unwrap_err();
        match err {
            WriteError::Send(e) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
            other => panic!("expected Send failure, got {other:?}"),
        }

        // The broken connection was dropped, not pooled: the next checkout
        // must dial a fresh socket, and the freed slot must allow it.
        let conn = timeout(Duration::from_secs(5), writer.pool.get())
            .await
            .expect("slot should be free after a failed batch")
            .unwrap();
        drop(conn);
        // Let the counting task observe the accept before reading it.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(accepted.load(Ordering::SeqCst), 2);
    }
}
