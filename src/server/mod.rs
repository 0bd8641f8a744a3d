//! Line-oriented JSON search service
//!
//! Every input line is one request object and every output line answers one
//! request. Requests run concurrently against a single shared
//! [`QueryEngine`], so responses can arrive out of order; a request's `id`
//! is echoed back for matching.
//!
//! ```text
//! {"id": 1, "op": "search", "collection": "papers", "query": "graph theory", "limit": 3}
//! {"id": 2, "op": "rebuild", "collection": "papers"}
//! {"id": 3, "op": "status", "collection": "papers"}
//! ```


use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::search::{IndexStatus, QueryEngine, SearchError, SearchHit};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Search {
        collection: String,
        query: String,
        #[serde(default)]
        limit: Option<usize>,
    },
    /// Rebuild the collection's index from the store's current contents
    Rebuild { collection: String },
    Status { collection: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBody {
    Results {
        collection: String,
        hits: Vec<SearchHit>,
    },
    Rebuilt {
        collection: String,
        documents: usize,
    },
    Index {
        collection: String,
        state: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        documents: Option<usize>,
    },
    Error {
        kind: &'static str,
        message: String,
    },
}

impl From<SearchError> for ResponseBody {
    #[inline]
    fn from(err: SearchError) -> Self {
        Self::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchServer {
    engine: Arc<QueryEngine>,
}

impl SearchServer {
    #[inline]
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        Self { engine }
    }

    #[inline]
    pub fn engine(&self) -> &Arc<QueryEngine> {
        &self.engine
    }

    /// Answer a single request
    #[inline]
    pub async fn handle(&self, request: Request) -> Response {
        let body = self
            .dispatch(request.operation)
            .await
            .unwrap_or_else(ResponseBody::from);

        Response {
            id: request.id,
            body,
        }
    }

    /// Serve requests read from `reader` until end of input, writing one
    /// JSON line per response to `writer`. Returns the number of requests
    /// received.
    #[inline]
    pub async fn run<R, W>(&self, reader: R, writer: W) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        info!("Search server reading requests");

        let (sender, receiver) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(write_responses(receiver, writer));
        let mut in_flight = JoinSet::new();
        let mut received = 0;

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await.context("Failed to read request")? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            received += 1;

            match serde_json::from_str::<Request>(line) {
                Ok(request) => {
                    debug!("Received request {:?}", request.operation);
                    let server = self.clone();
                    let sender = sender.clone();
                    in_flight.spawn(async move {
                        let response = server.handle(request).await;
                        if sender.send(response).is_err() {
                            debug!("Response writer closed, dropping response");
                        }
                    });
                }
                Err(e) => {
                    error!("Invalid request: {}", e);
                    let response = Response {
                        id: None,
                        body: ResponseBody::Error {
                            kind: "invalid_request",
                            message: e.to_string(),
                        },
                    };
                    if sender.send(response).is_err() {
                        debug!("Response writer closed, dropping response");
                    }
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!("Request task failed: {}", e);
            }
        }
        drop(sender);

        writer_task
            .await
            .context("Response writer task failed")??;

        info!("Search server stopped after {} requests", received);
        Ok(received)
    }

    async fn dispatch(&self, operation: Operation) -> Result<ResponseBody, SearchError> {
        match operation {
            Operation::Search {
                collection,
                query,
                limit,
            } => {
                let limit = limit.unwrap_or_else(|| self.engine.neighbors());
                let hits = self.engine.search_scored(&collection, &query, limit).await?;
                Ok(ResponseBody::Results { collection, hits })
            }
            Operation::Rebuild { collection } => {
                let index = self.engine.refresh(&collection).await?;
                Ok(ResponseBody::Rebuilt {
                    documents: index.len(),
                    collection,
                })
            }
            Operation::Status { collection } => {
                let (state, documents) = match self.engine.registry().status(&collection).await {
                    IndexStatus::Absent => ("absent", None),
                    IndexStatus::Building => ("building", None),
                    IndexStatus::Ready { documents } => ("ready", Some(documents)),
                };
                Ok(ResponseBody::Index {
                    collection,
                    state,
                    documents,
                })
            }
        }
    }
}

async fn write_responses<W>(mut receiver: mpsc::UnboundedReceiver<Response>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = receiver.recv().await {
        let mut line = serde_json::to_string(&response).context("Failed to encode response")?;
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .await
            .context("Failed to write response")?;
        writer.flush().await.context("Failed to flush response")?;
    }

    Ok(())
}
