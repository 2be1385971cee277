//! Minimal HTTP/1.1 transport.
//!
//! One accept thread hands each connection to its own worker thread. A worker
//! reads requests off the connection in order, answers each through
//! [`Service::handle`], and keeps the connection open until the client closes
//! it or sends `Connection: close`.
//!
//! Only what a JSON-RPC endpoint needs is supported: a request line, headers,
//! and a `Content-Length` body. Chunked bodies are not.
//!
//! A connection that sends nothing for [`IDLE_TIMEOUT`], whether between
//! requests or partway through one, is closed. A request that cannot be read
//! (malformed, or over the size limits) is answered with a JSON-RPC error
//! envelope and the connection is closed.

use crate::service::{self, Service};
use crate::source::DocumentSource;
use logwise::privacy::LogIt;
use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

/// Largest header block accepted, request line included.
pub const MAX_HEADER_BYTES: usize = 16 * 1024;
/// Largest body accepted.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;
/// How long a connection may stay silent before it is closed.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed request: {0}")]
    Malformed(&'static str),
    #[error("{0} exceeds the size limit")]
    TooLarge(&'static str),
}

/// The status codes this server answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NoContent,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    PayloadTooLarge,
    InternalServerError,
}

impl Status {
    pub const fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::NoContent => 204,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
            Status::PayloadTooLarge => 413,
            Status::InternalServerError => 500,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::NoContent => "No Content",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::PayloadTooLarge => "Payload Too Large",
            Status::InternalServerError => "Internal Server Error",
        }
    }
}

/// An inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// A request for `/` with no headers.
    pub fn new(method: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        HttpRequest {
            method: method.into(),
            path: "/".to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// The first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the client asked to close the connection after this request.
    pub fn wants_close(&self) -> bool {
        self.header("Connection")
            .is_some_and(|value| value.eq_ignore_ascii_case("close"))
    }

    /// Reads one request from `reader`.
    ///
    /// Returns `Ok(None)` when the peer closed the connection between requests.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Option<Self>, Error> {
        let mut budget = MAX_HEADER_BYTES;

        // tolerate stray blank lines between keep-alive requests
        let request_line = loop {
            match read_line(reader, &mut budget)? {
                None => return Ok(None),
                Some(line) if line.is_empty() => continue,
                Some(line) => break line,
            }
        };
        let mut parts = request_line.split(' ');
        let (Some(method), Some(path), Some(version)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::Malformed("request line"));
        };
        if method.is_empty() || path.is_empty() || !version.starts_with("HTTP/") {
            return Err(Error::Malformed("request line"));
        }

        let mut headers = Vec::new();
        loop {
            let Some(line) = read_line(reader, &mut budget)? else {
                return Err(Error::Malformed("connection closed inside header block"));
            };
            if line.is_empty() {
                break;
            }
            let Some((name, value)) = line.split_once(':') else {
                return Err(Error::Malformed("header line"));
            };
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }

        let mut request = HttpRequest {
            method: method.to_string(),
            path: path.to_string(),
            headers,
            body: Vec::new(),
        };
        let length = match request.header("Content-Length") {
            Some(value) => value
                .parse::<usize>()
                .map_err(|_| Error::Malformed("Content-Length"))?,
            None => 0,
        };
        if length > MAX_BODY_BYTES {
            return Err(Error::TooLarge("body"));
        }
        request.body = vec![0; length];
        reader.read_exact(&mut request.body)?;
        Ok(Some(request))
    }
}

/// Reads one CRLF- or LF-terminated line, charging it against `budget`.
fn read_line<R: BufRead>(reader: &mut R, budget: &mut usize) -> Result<Option<String>, Error> {
    if *budget == 0 {
        return Err(Error::TooLarge("header block"));
    }
    let mut line = Vec::new();
    let read = reader.by_ref().take(*budget as u64).read_until(b'\n', &mut line)?;
    if read == 0 {
        return Ok(None);
    }
    *budget -= read;
    if line.last() != Some(&b'\n') {
        return Err(if *budget == 0 {
            Error::TooLarge("header block")
        } else {
            Error::Malformed("unterminated line")
        });
    }
    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8(line)
        .map(Some)
        .map_err(|_| Error::Malformed("header is not UTF-8"))
}

/// An outbound response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: Status,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HttpResponse {
    /// A JSON response.
    pub fn json(status: Status, body: Vec<u8>) -> Self {
        let mut response = HttpResponse {
            status,
            headers: Vec::new(),
            body,
        };
        response.set_header("Content-Type", "application/json");
        response
    }

    /// A response with no body.
    pub fn empty(status: Status) -> Self {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Sets `name` to `value`, replacing any header of the same name.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Writes the response to `writer`.
    ///
    /// `Content-Length` is added for every status except 204, and
    /// `Connection: close` when the connection will not be reused.
    pub fn write_to<W: Write>(&self, writer: &mut W, keep_alive: bool) -> std::io::Result<()> {
        self.write_head_to(writer, keep_alive)?;
        writer.write_all(&self.body)?;
        writer.flush()
    }

    /// Writes the status line and headers only, as the answer to `HEAD`.
    ///
    /// `Content-Length` still describes the body that was left out.
    pub fn write_head_to<W: Write>(&self, writer: &mut W, keep_alive: bool) -> std::io::Result<()> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.code(),
            self.status.reason()
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        if self.status != Status::NoContent {
            head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        }
        if !keep_alive {
            head.push_str("Connection: close\r\n");
        }
        head.push_str("\r\n");
        writer.write_all(head.as_bytes())?;
        writer.flush()
    }
}

/// A running listener.
///
/// Connections are served on background threads; the server keeps running
/// for the life of the process.
#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
}

impl Server {
    /// Binds `addr` and starts accepting connections for `service`.
    pub fn new<A: ToSocketAddrs, S: DocumentSource + 'static>(
        addr: A,
        service: Service<S>,
    ) -> Result<Self, Error> {
        Self::with_idle_timeout(addr, service, IDLE_TIMEOUT)
    }

    /// Like [`Server::new`], closing connections silent for `idle_timeout`.
    ///
    /// `idle_timeout` must be non-zero.
    pub fn with_idle_timeout<A: ToSocketAddrs, S: DocumentSource + 'static>(
        addr: A,
        service: Service<S>,
        idle_timeout: Duration,
    ) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr)?;
        let local_addr = listener.local_addr()?;
        logwise::info_sync!("MCP/HTTP listening on {addr}", addr = LogIt(&local_addr));
        let service = Arc::new(service);
        std::thread::Builder::new()
            .name("daemon-mcp-server".to_string())
            .spawn(move || {
                for stream in listener.incoming() {
                    match stream {
                        Ok(stream) => Self::on_accept(stream, service.clone(), idle_timeout),
                        Err(e) => {
                            logwise::error_sync!("Failed to accept connection: {e}", e = LogIt(&e));
                        }
                    }
                }
            })?;
        Ok(Server { local_addr })
    }

    /// The address actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn on_accept<S: DocumentSource + 'static>(
        stream: TcpStream,
        service: Arc<Service<S>>,
        idle_timeout: Duration,
    ) {
        let session = match Session::new(stream, service, idle_timeout) {
            Ok(session) => session,
            Err(e) => {
                logwise::error_sync!("Failed to set up connection: {e}", e = LogIt(&e));
                return;
            }
        };
        let peer = session.peer;
        logwise::info_sync!("Accepted connection from {peer}", peer = LogIt(&peer));
        let spawned = std::thread::Builder::new()
            .name(format!("daemon-mcp-server-{peer}"))
            .spawn(move || session.run());
        if let Err(e) = spawned {
            logwise::error_sync!("Failed to spawn connection thread: {e}", e = LogIt(&e));
        }
    }
}

struct Session<S> {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    peer: SocketAddr,
    service: Arc<Service<S>>,
}

impl<S: DocumentSource> Session<S> {
    fn new(stream: TcpStream, service: Arc<Service<S>>, idle_timeout: Duration) -> std::io::Result<Self> {
        let peer = stream.peer_addr()?;
        stream.set_read_timeout(Some(idle_timeout))?;
        let writer = stream.try_clone()?;
        Ok(Session {
            reader: BufReader::new(stream),
            writer,
            peer,
            service,
        })
    }

    fn run(mut self) {
        loop {
            let request = match HttpRequest::read_from(&mut self.reader) {
                Ok(Some(request)) => request,
                Ok(None) => break,
                Err(Error::Io(e)) => {
                    self.log_read_failure(&e);
                    break;
                }
                Err(e) => {
                    logwise::warn_sync!(
                        "Rejecting unreadable request from {peer}: {e}",
                        peer = LogIt(&self.peer),
                        e = LogIt(&e)
                    );
                    let response = service::unreadable(&e);
                    if let Err(e) = response.write_to(&mut self.writer, false) {
                        logwise::warn_sync!(
                            "Could not answer {peer}: {e}",
                            peer = LogIt(&self.peer),
                            e = LogIt(&e)
                        );
                    }
                    break;
                }
            };
            let keep_alive = !request.wants_close();
            let response = self.service.handle(&request);
            let written = if request.method == "HEAD" {
                response.write_head_to(&mut self.writer, keep_alive)
            } else {
                response.write_to(&mut self.writer, keep_alive)
            };
            if let Err(e) = written {
                logwise::error_sync!(
                    "Error writing to {peer}: {e}",
                    peer = LogIt(&self.peer),
                    e = LogIt(&e)
                );
                break;
            }
            if !keep_alive {
                break;
            }
        }
    }

    fn log_read_failure(&self, e: &std::io::Error) {
        match e.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => {
                logwise::info_sync!("Closing idle connection from {peer}", peer = LogIt(&self.peer));
            }
            ErrorKind::UnexpectedEof | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => {
                logwise::warn_sync!(
                    "{peer} hung up mid-request: {e}",
                    peer = LogIt(&self.peer),
                    e = LogIt(e)
                );
            }
            _ => {
                logwise::error_sync!(
                    "Error reading from {peer}: {e}",
                    peer = LogIt(&self.peer),
                    e = LogIt(e)
                );
            }
        }
    }
}
