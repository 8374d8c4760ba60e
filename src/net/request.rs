use http::Method;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// A parsed request. Only what the routes need is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path without the query string
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("connection closed before a request line was received")]
    Empty,

    #[error("malformed request line: {0}")]
    BadRequestLine(String),

    #[error("malformed header line: {0}")]
    BadHeader(String),

    #[error("invalid Content-Length: {0}")]
    BadContentLength(String),

    #[error("request exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("request body is not valid UTF-8")]
    InvalidUtf8,

    #[error("connection closed mid-request")]
    Truncated,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
enum ReadState {
    RequestLine,
    Headers,
    Body { length: usize },
    Done,
}

/// Reads exactly one request off a connection.
///
/// Runs `RequestLine -> Headers -> Body -> Done`; the body is read only when
/// `Content-Length` is positive. `max_bytes` bounds the whole request.
pub async fn read_request<R>(reader: &mut R, max_bytes: usize) -> Result<Request, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut state = ReadState::RequestLine;
    let mut consumed = 0usize;
    let mut method = Method::GET;
    let mut path = String::new();
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut body = String::new();

    loop {
        state = match state {
            ReadState::RequestLine => {
                let line = match read_line(reader, &mut consumed, max_bytes).await? {
                    Some(line) => line,
                    None => return Err(RequestError::Empty),
                };
                let (m, p) = parse_request_line(&line)?;
                method = m;
                path = p;
                ReadState::Headers
            }
            ReadState::Headers => {
                let line = read_line(reader, &mut consumed, max_bytes)
                    .await?
                    .ok_or(RequestError::Truncated)?;
                if line.is_empty() {
                    match content_length(&headers)? {
                        0 => ReadState::Done,
                        length if length > max_bytes.saturating_sub(consumed) => {
                            return Err(RequestError::TooLarge { limit: max_bytes })
                        }
                        length => ReadState::Body { length },
                    }
                } else {
                    let (name, value) = line
                        .split_once(':')
                        .ok_or_else(|| RequestError::BadHeader(line.clone()))?;
                    headers.push((name.trim().to_string(), value.trim().to_string()));
                    ReadState::Headers
                }
            }
            ReadState::Body { length } => {
                let mut buf = vec![0u8; length];
                reader.read_exact(&mut buf).await.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::UnexpectedEof {
                        RequestError::Truncated
                    } else {
                        RequestError::Io(e)
                    }
                })?;
                body = String::from_utf8(buf).map_err(|_| RequestError::InvalidUtf8)?;
                ReadState::Done
            }
            ReadState::Done => {
                return Ok(Request {
                    method,
                    path,
                    headers,
                    body,
                })
            }
        };
    }
}

/// Read one CRLF- or LF-terminated line. `None` on a clean EOF before any byte.
async fn read_line<R>(
    reader: &mut R,
    consumed: &mut usize,
    max_bytes: usize,
) -> Result<Option<String>, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut raw = Vec::new();
    let remaining = max_bytes.saturating_sub(*consumed) as u64;
    let read = (&mut *reader)
        .take(remaining.saturating_add(1))
        .read_until(b'\n', &mut raw)
        .await?;

    if read == 0 {
        return Ok(None);
    }
    *consumed += read;
    if *consumed > max_bytes {
        return Err(RequestError::TooLarge { limit: max_bytes });
    }
    if raw.last() != Some(&b'\n') {
        return Err(RequestError::Truncated);
    }

    raw.pop();
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    String::from_utf8(raw)
        .map(Some)
        .map_err(|_| RequestError::InvalidUtf8)
}

fn parse_request_line(line: &str) -> Result<(Method, String), RequestError> {
    let mut parts = line.split_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(RequestError::BadRequestLine(line.to_string()));
    };
    if parts.next().is_some() || !version.starts_with("HTTP/") || !target.starts_with('/') {
        return Err(RequestError::BadRequestLine(line.to_string()));
    }

    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_| RequestError::BadRequestLine(line.to_string()))?;
    let path = match target.split_once('?') {
        Some((path, _query)) => path,
        None => target,
    };

    Ok((method, path.to_string()))
}

fn content_length(headers: &[(String, String)]) -> Result<usize, RequestError> {
    match headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
    {
        Some((_, value)) => value
            .parse::<usize>()
            .map_err(|_| RequestError::BadContentLength(value.clone())),
        None => Ok(0),
    }
}
