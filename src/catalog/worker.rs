//! Background catalog fetches.
//!
//! HTTP requests block, so they run on their own thread; the UI loop sends
//! `CatalogRequest`s and drains `CatalogReply`s without ever waiting. Every
//! request gets a fresh `RequestId` so the receiver can ignore replies that
//! arrive after the view that asked for them has moved on.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use super::client::{CatalogError, CatalogProvider};
use super::model::Track;

pub type RequestId = u64;

#[derive(Debug)]
enum CatalogRequest {
    Search { id: RequestId, query: String },
    Trending { id: RequestId },
    Details { id: RequestId, video_id: String },
    Quit,
}

#[derive(Debug)]
pub enum CatalogReply {
    Search {
        id: RequestId,
        result: Result<Vec<Track>, CatalogError>,
    },
    Trending {
        id: RequestId,
        result: Result<Vec<Track>, CatalogError>,
    },
    Details {
        id: RequestId,
        result: Result<Track, CatalogError>,
    },
}

/// Result-list sizes requested from the catalog.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub search: u32,
    pub trending: u32,
}

pub struct CatalogWorker {
    tx: Sender<CatalogRequest>,
    rx: Receiver<CatalogReply>,
    next_id: RequestId,
    join: Option<JoinHandle<()>>,
}

impl CatalogWorker {
    pub fn spawn<P>(provider: P, limits: FetchLimits) -> Self
    where
        P: CatalogProvider + Send + 'static,
    {
        let (tx, request_rx) = mpsc::channel::<CatalogRequest>();
        let (reply_tx, rx) = mpsc::channel::<CatalogReply>();

        let join = thread::spawn(move || {
            match provider.health() {
                Ok(()) => log::info!("catalog is reachable"),
                Err(e) => log::warn!("catalog health check failed: {e}"),
            }

            while let Ok(request) = request_rx.recv() {
                let reply = match request {
                    CatalogRequest::Search { id, query } => CatalogReply::Search {
                        id,
                        result: provider.search(&query, limits.search),
                    },
                    CatalogRequest::Trending { id } => CatalogReply::Trending {
                        id,
                        result: provider.trending(limits.trending),
                    },
                    CatalogRequest::Details { id, video_id } => CatalogReply::Details {
                        id,
                        result: provider.video_details(&video_id),
                    },
                    CatalogRequest::Quit => break,
                };

                if reply_tx.send(reply).is_err() {
                    // Nobody is listening anymore.
                    break;
                }
            }
            log::debug!("catalog worker stopped");
        });

        Self {
            tx,
            rx,
            next_id: 0,
            join: Some(join),
        }
    }

    fn issue(&mut self, build: impl FnOnce(RequestId) -> CatalogRequest) -> RequestId {
        self.next_id += 1;
        let id = self.next_id;
        if self.tx.send(build(id)).is_err() {
            log::warn!("catalog worker is gone; request {id} dropped");
        }
        id
    }

    pub fn search(&mut self, query: &str) -> RequestId {
        let query = query.to_string();
        self.issue(|id| CatalogRequest::Search { id, query })
    }

    pub fn trending(&mut self) -> RequestId {
        self.issue(|id| CatalogRequest::Trending { id })
    }

    pub fn details(&mut self, video_id: &str) -> RequestId {
        let video_id = video_id.to_string();
        self.issue(|id| CatalogRequest::Details { id, video_id })
    }

    /// Next finished reply, if any. Never blocks.
    pub fn try_recv(&self) -> Option<CatalogReply> {
        self.rx.try_recv().ok()
    }

    /// Stop the worker. Waits for an in-flight request only when `wait` is
    /// set; otherwise the thread finishes it on its own and exits.
    pub fn shutdown(&mut self, wait: bool) {
        let _ = self.tx.send(CatalogRequest::Quit);
        if let Some(handle) = self.join.take() {
            if wait {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for CatalogWorker {
    fn drop(&mut self) {
        self.shutdown(false);
    }
}
