//! Background lookup worker thread

use crate::candidate::{Candidate, Category};
use crate::client::LookupService;
use crate::error::LookupError;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Lookup issued by a field, tagged with the field's sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub seq: u64,
    pub category: Category,
    /// Trimmed query text
    pub query: String,
}

/// Outcome of one lookup, routed back to the field that issued it
#[derive(Debug)]
pub struct LookupReply {
    pub seq: u64,
    pub query: String,
    pub result: Result<Vec<Candidate>, LookupError>,
    pub duration: Duration,
}

/// Spawn the lookup worker thread.
///
/// The worker exits when every request sender has been dropped. Replies sent
/// after the receiver is gone are discarded.
pub fn spawn_worker(
    service: Arc<dyn LookupService>,
    request_rx: Receiver<LookupRequest>,
    reply_tx: Sender<LookupReply>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(first) = request_rx.recv() {
            let request = newest_queued(first, &request_rx);

            let start = Instant::now();
            let result = service.lookup(request.category, &request.query);
            let duration = start.elapsed();

            let reply = LookupReply {
                seq: request.seq,
                query: request.query,
                result,
                duration,
            };
            if reply_tx.send(reply).is_err() {
                log::debug!("Lookup reply receiver dropped, stopping worker");
                break;
            }
        }
    })
}

/// Skip requests that are already superseded by a newer one in the queue
fn newest_queued(first: LookupRequest, rx: &Receiver<LookupRequest>) -> LookupRequest {
    let mut newest = first;
    loop {
        match rx.try_recv() {
            Ok(next) => {
                log::debug!(
                    "Skipping superseded lookup #{} '{}'",
                    newest.seq,
                    newest.query
                );
                newest = next;
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => return newest,
        }
    }
}

/// Request/reply channel pair connecting one field to its worker thread
pub struct LookupChannel {
    request_tx: Sender<LookupRequest>,
    reply_rx: Receiver<LookupReply>,
}

impl LookupChannel {
    pub fn spawn(service: Arc<dyn LookupService>) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<LookupRequest>();
        let (reply_tx, reply_rx) = mpsc::channel::<LookupReply>();

        spawn_worker(service, request_rx, reply_tx);

        Self {
            request_tx,
            reply_rx,
        }
    }

    pub fn send(&self, request: LookupRequest) {
        if self.request_tx.send(request).is_err() {
            log::warn!("Lookup worker is gone, request dropped");
        }
    }

    /// Poll for a reply (non-blocking)
    pub fn try_recv(&self) -> Option<LookupReply> {
        self.reply_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for a reply
    pub fn recv_timeout(&self, timeout: Duration) -> Option<LookupReply> {
        self.reply_rx.recv_timeout(timeout).ok()
    }
}
