use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::protocol::RtspRequest;
use crate::proxy::ProxyHandler;
use crate::registry::StreamRegistry;
use crate::stream::DownstreamLink;
use crate::transport::interleaved;
use crate::transport::udp::UdpSender;

/// Read timeout on downstream sockets. Bounds how long a blocked read can
/// keep a connection thread from noticing the `running` flag.
const READ_POLL: Duration = Duration::from_secs(1);

/// Upper bound on a downstream request body (ANNOUNCE descriptions).
const MAX_BODY_LEN: usize = 512 * 1024;

/// Non-blocking TCP accept loop.
///
/// Checks the `running` flag between accepts with a 50ms poll interval
/// so that [`crate::server::Server::stop`] can terminate it promptly.
pub fn accept_loop(
    listener: TcpListener,
    registry: StreamRegistry,
    udp: Arc<UdpSender>,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, _)) => {
                if stream.set_nonblocking(false).is_err() {
                    continue;
                }
                let registry = registry.clone();
                let udp = udp.clone();
                let r = running.clone();
                thread::spawn(move || {
                    Connection::handle(stream, registry, udp, r);
                });
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                if running.load(Ordering::SeqCst) {
                    tracing::warn!(error = %e, "TCP accept error");
                }
            }
        }
    }
    tracing::debug!("accept loop exited");
}

/// Why a connection's read loop ended.
enum ReadEnd {
    Closed,
    Error,
    Shutdown,
}

impl ReadEnd {
    fn reason(self) -> &'static str {
        match self {
            ReadEnd::Closed => "connection closed by client",
            ReadEnd::Error => "read error",
            ReadEnd::Shutdown => "server shutting down",
        }
    }
}

/// A single downstream RTSP connection with its own lifecycle.
///
/// The writer half is shared with the connection's proxied stream, which
/// multiplexes interleaved packet frames between responses; the
/// `parking_lot::Mutex` keeps each write atomic on the wire.
struct Connection {
    reader: BufReader<TcpStream>,
    writer: Arc<Mutex<TcpStream>>,
    handler: ProxyHandler,
    peer_addr: SocketAddr,
}

impl Connection {
    /// Entry point: set up a connection and run its request loop.
    pub fn handle(
        stream: TcpStream,
        registry: StreamRegistry,
        udp: Arc<UdpSender>,
        running: Arc<AtomicBool>,
    ) {
        let peer_addr = match stream.peer_addr() {
            Ok(addr) => addr,
            Err(_) => return,
        };

        tracing::info!(%peer_addr, "client connected");

        if stream.set_read_timeout(Some(READ_POLL)).is_err() {
            return;
        }
        let reader_stream = match stream.try_clone() {
            Ok(s) => s,
            Err(_) => return,
        };
        let writer = Arc::new(Mutex::new(stream));

        let downstream = DownstreamLink {
            writer: writer.clone(),
            udp,
            peer_ip: peer_addr.ip(),
        };
        let handler = ProxyHandler::new(registry, downstream, peer_addr);

        let mut conn = Connection {
            reader: BufReader::new(reader_stream),
            writer,
            handler,
            peer_addr,
        };

        let reason = conn.run(&running);
        conn.handler.teardown();

        tracing::info!(%peer_addr, reason, "client disconnected");
    }

    /// RTSP request/response loop. Returns the reason for exiting.
    fn run(&mut self, running: &Arc<AtomicBool>) -> &'static str {
        loop {
            if !running.load(Ordering::SeqCst) {
                return ReadEnd::Shutdown.reason();
            }

            let head = match self.read_head(running) {
                Ok(head) => head,
                Err(end) => return end.reason(),
            };
            if head.trim().is_empty() {
                continue;
            }

            let mut request = match RtspRequest::parse(&head) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(peer = %self.peer_addr, error = %e, "parse error");
                    continue;
                }
            };

            let content_length = request.content_length();
            if content_length > 0 {
                if content_length > MAX_BODY_LEN {
                    tracing::warn!(
                        peer = %self.peer_addr,
                        content_length,
                        "request body exceeds limit"
                    );
                    return "oversized request body";
                }
                let mut body = vec![0u8; content_length];
                if let Err(end) = self.read_exact_retry(&mut body, running) {
                    return end.reason();
                }
                request.body = body;
            }

            tracing::debug!(
                peer = %self.peer_addr,
                method = %request.method,
                uri = %request.uri,
                "request"
            );

            let response = match self.handler.handle(&request) {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(peer = %self.peer_addr, error = %e, "closing connection");
                    return "session open failed";
                }
            };

            tracing::debug!(
                peer = %self.peer_addr,
                status = response.status_code,
                "response"
            );

            let wire = response.serialize();
            if self.writer.lock().write_all(&wire).is_err() {
                return "write error";
            }
        }
    }

    /// Read the head of the next RTSP request: request line, headers, and
    /// the blank line, preserving line endings.
    ///
    /// Interleaved frames arriving from the player (RTCP receiver reports,
    /// RFC 2326 §10.12) are consumed and discarded here; the proxy does
    /// not forward them. Read timeouts poll the `running` flag, and a
    /// partial line survives the retry in its accumulation buffer.
    fn read_head(&mut self, running: &Arc<AtomicBool>) -> Result<String, ReadEnd> {
        loop {
            let first = loop {
                match self.reader.fill_buf() {
                    Ok([]) => return Err(ReadEnd::Closed),
                    Ok(buf) => break buf[0],
                    Err(ref e) if is_timeout(e) => {
                        if !running.load(Ordering::SeqCst) {
                            return Err(ReadEnd::Shutdown);
                        }
                    }
                    Err(_) => return Err(ReadEnd::Error),
                }
            };

            if first != interleaved::FRAME_MAGIC {
                break;
            }
            self.reader.consume(1);
            let mut frame_head = [0u8; 3];
            self.read_exact_retry(&mut frame_head, running)?;
            let len = u16::from_be_bytes([frame_head[1], frame_head[2]]) as usize;
            let mut payload = vec![0u8; len];
            self.read_exact_retry(&mut payload, running)?;
            tracing::trace!(
                peer = %self.peer_addr,
                channel = frame_head[0],
                len,
                "discarding inbound interleaved frame"
            );
        }

        let mut head = String::new();
        let mut line = String::new();
        loop {
            match self.reader.read_line(&mut line) {
                Ok(0) => return Err(ReadEnd::Closed),
                Ok(_) => {
                    if line.ends_with('\n') {
                        let blank = line == "\r\n" || line == "\n";
                        head.push_str(&line);
                        line.clear();
                        if blank {
                            return Ok(head);
                        }
                    } else {
                        // EOF mid-line; the next read reports Closed
                        head.push_str(&line);
                        line.clear();
                    }
                }
                Err(ref e) if is_timeout(e) => {
                    if !running.load(Ordering::SeqCst) {
                        return Err(ReadEnd::Shutdown);
                    }
                }
                Err(_) => return Err(ReadEnd::Error),
            }
        }
    }

    /// `read_exact` with timeout retries that honor the `running` flag.
    fn read_exact_retry(
        &mut self,
        buf: &mut [u8],
        running: &Arc<AtomicBool>,
    ) -> Result<(), ReadEnd> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => return Err(ReadEnd::Closed),
                Ok(n) => filled += n,
                Err(ref e) if is_timeout(e) => {
                    if !running.load(Ordering::SeqCst) {
                        return Err(ReadEnd::Shutdown);
                    }
                }
                Err(_) => return Err(ReadEnd::Error),
            }
        }
        Ok(())
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
