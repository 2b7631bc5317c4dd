//! QUIT handler for terminating client sessions.

use super::super::{Context, Handler, HandlerError, HandlerResult};
use async_trait::async_trait;
use relay_proto::MessageRef;
use tracing::info;

/// Handler for QUIT command.
pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let quit_msg = msg.arg(0).filter(|m| !m.is_empty()).map(str::to_string);

        info!(uid = %ctx.uid, message = ?quit_msg, "Client quit");

        // The connection loop runs the cleanup path on this error.
        Err(HandlerError::Quit(quit_msg))
    }

    fn allowed_before_registration(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::Harness;

    #[tokio::test]
    async fn quit_parts_channels_with_the_message() {
        let mut h = Harness::new();
        let alice = h.register("alice").await;
        let bob = h.register("bob").await;
        h.send(&alice, "JOIN #rust").await;
        h.send(&bob, "JOIN #rust").await;
        h.drain(&alice).await;

        h.send(&bob, "QUIT :gone fishing").await;

        assert_eq!(
            h.drain(&alice).await,
            vec![":bob!bob@127.0.0.1 PART #rust :gone fishing\r\n"]
        );
        assert!(h.matrix.client(&bob).is_none());
        assert!(h.matrix.uid_for_nick("bob").is_none());
        let chan = h.matrix.channel("#rust").unwrap();
        assert_eq!(chan.read().await.members.len(), 1);
    }

    #[tokio::test]
    async fn quit_without_message_uses_default() {
        let mut h = Harness::new();
        let alice = h.register("alice").await;
        let bob = h.register("bob").await;
        h.send(&alice, "JOIN #rust").await;
        h.send(&bob, "JOIN #rust").await;
        h.drain(&alice).await;

        h.send(&bob, "QUIT").await;
        assert_eq!(
            h.drain(&alice).await,
            vec![":bob!bob@127.0.0.1 PART #rust :Client Quit\r\n"]
        );
    }

    #[tokio::test]
    async fn quit_before_registration_frees_the_nick() {
        let mut h = Harness::new();
        let anon = h.connect();
        h.send(&anon, "NICK ghost").await;
        h.send(&anon, "QUIT").await;
        assert!(h.matrix.uid_for_nick("ghost").is_none());
        assert!(h.matrix.users.is_empty());
    }
}
