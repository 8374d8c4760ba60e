use http::{Method, StatusCode};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument, warn};

use crate::core::error::error_reply;
use crate::core::routes::Router;
use crate::net::request::{read_request, RequestError};
use crate::net::response::Reply;

/// Accept connections until `shutdown` resolves. Each connection is served
/// on its own task: one request, one response, then close.
pub async fn serve<F>(listener: TcpListener, router: Arc<Router>, max_request_bytes: usize, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Acceptor stopped");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let router = Arc::clone(&router);
                    tokio::spawn(handle_connection(stream, peer, router, max_request_bytes));
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}

#[instrument(skip_all, fields(peer = %peer))]
async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    router: Arc<Router>,
    max_request_bytes: usize,
) {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half);

    let mut malformed = false;
    let reply = match read_request(&mut reader, max_request_bytes).await {
        Ok(request) => {
            debug!(method = %request.method, path = %request.path, "Request received");
            if request.method == Method::OPTIONS {
                Reply::no_content()
            } else {
                router.dispatch(&request.method, &request.path, &request.body)
            }
        }
        Err(RequestError::Empty) => {
            debug!("Peer closed before sending a request");
            return;
        }
        Err(RequestError::Io(e)) => {
            warn!(error = %e, "Failed to read request");
            return;
        }
        Err(e) => {
            warn!(error = %e, "Rejecting malformed request");
            malformed = true;
            error_reply(StatusCode::BAD_REQUEST, "Requete invalide")
        }
    };

    debug!(status = reply.status.as_u16(), "Sending response");

    if let Err(e) = reply.write_to(&mut write_half).await {
        warn!(error = %e, "Failed to write response");
        return;
    }
    if let Err(e) = write_half.shutdown().await {
        debug!(error = %e, "Failed to shut down connection");
    }
    // Unread input at close would reset the connection before the peer reads the 400
    if malformed {
        drain(&mut reader).await;
    }
}

const DRAIN_LIMIT: u64 = 64 * 1024;

async fn drain<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut sink = tokio::io::sink();
    if let Err(e) = tokio::io::copy(&mut reader.take(DRAIN_LIMIT), &mut sink).await {
        debug!(error = %e, "Failed to drain rejected request");
    }
}
