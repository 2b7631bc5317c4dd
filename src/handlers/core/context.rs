//! Command handler context and the `Handler` trait.

use crate::error::{HandlerError, HandlerResult};
use crate::state::{Client, Matrix};
use async_trait::async_trait;
use relay_proto::{MessageRef, Reply};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A command handler.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult;

    /// Positional arguments required before `handle` runs; fewer yields 461.
    fn min_params(&self) -> usize {
        0
    }

    /// Whether the command is accepted before registration completes.
    fn allowed_before_registration(&self) -> bool {
        false
    }
}

/// Handler context passed to each command handler.
///
/// Replies for the issuing client are collected here and written by the
/// connection as one batch once the handler returns, ahead of anything
/// routed from other connections.
pub struct Context<'a> {
    /// The client's unique ID.
    pub uid: &'a str,
    /// Shared server state.
    pub matrix: &'a Arc<Matrix>,
    /// Remote address of the client.
    pub remote_addr: SocketAddr,
    replies: Vec<Reply>,
}

impl<'a> Context<'a> {
    pub fn new(uid: &'a str, matrix: &'a Arc<Matrix>, remote_addr: SocketAddr) -> Self {
        Self {
            uid,
            matrix,
            remote_addr,
            replies: Vec::new(),
        }
    }

    /// Queue a reply for the issuing client.
    pub fn reply(&mut self, reply: Reply) {
        self.replies.push(reply);
    }

    /// Hand the collected replies to the writer.
    pub fn take_replies(&mut self) -> Vec<Reply> {
        std::mem::take(&mut self.replies)
    }

    /// The issuing client's record.
    pub fn client(&self) -> Result<Arc<RwLock<Client>>, HandlerError> {
        self.matrix
            .client(self.uid)
            .ok_or_else(|| HandlerError::ClientGone(self.uid.to_string()))
    }

    pub async fn is_registered(&self) -> bool {
        match self.matrix.client(self.uid) {
            Some(client) => client.read().await.is_registered(),
            None => false,
        }
    }

    /// `nick!user@host` of the issuing client.
    pub async fn mask(&self) -> Result<String, HandlerError> {
        Ok(self.client()?.read().await.mask())
    }

    /// Nick and mask snapshot. Commands on one connection run one at a time,
    /// so neither changes while the handler runs.
    pub async fn identity(&self) -> Result<(String, String), HandlerError> {
        let client = self.client()?;
        let client = client.read().await;
        Ok((client.nick_or_star().to_string(), client.mask()))
    }
}
