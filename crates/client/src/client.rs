//! The widget's single cooperative event loop.
//!
//! One task owns the [`ConversationController`] (and through it the
//! connection state machine).  UI commands and transport events are
//! interleaved with `tokio::select!`, so no state is ever shared.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::conversation::{ConversationController, SubmitOutcome};
use crate::surface::PresentationSurface;
use crate::transport::EventReceiver;
use crate::types::ClientError;

/// Intent coming from the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Submit(String),
    OpenPanel,
    ClosePanel,
}

/// A fully-wired widget ready to run.
///
/// Create via [`WidgetClientBuilder`](crate::builder::WidgetClientBuilder).
pub struct WidgetClient<S> {
    controller: ConversationController<S>,
    events: EventReceiver,
}

impl<S: PresentationSurface> WidgetClient<S> {
    pub(crate) fn new(controller: ConversationController<S>, events: EventReceiver) -> Self {
        Self { controller, events }
    }

    pub fn controller(&self) -> &ConversationController<S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ConversationController<S> {
        &mut self.controller
    }

    /// Apply one UI command.  Returns the submit outcome for `Submit`.
    pub fn dispatch(&mut self, command: UiCommand) -> Option<SubmitOutcome> {
        match command {
            UiCommand::Submit(text) => Some(self.controller.on_user_submit(&text)),
            UiCommand::OpenPanel => {
                self.controller.open_panel();
                None
            }
            UiCommand::ClosePanel => {
                self.controller.close_panel();
                None
            }
        }
    }

    /// Wait for the next transport event and apply it.
    pub async fn pump(&mut self) {
        if let Some(event) = self.events.recv().await {
            self.controller.handle_transport_event(event);
        }
    }

    /// Run until `shutdown` is cancelled or the command channel closes.
    ///
    /// On exit the connection is closed as user-initiated, so no retry
    /// outlives the loop.  Returns [`ClientError::Shutdown`] when stopped
    /// via the token.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<UiCommand>,
        shutdown: CancellationToken,
    ) -> Result<(), ClientError> {
        tracing::info!(session_id = %self.controller.session_id(), "widget loop started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("shutdown requested");
                    self.controller.close_panel();
                    return Err(ClientError::Shutdown);
                }
                command = commands.recv() => match command {
                    Some(command) => {
                        if let Some(outcome) = self.dispatch(command) {
                            tracing::debug!(outcome = ?outcome, "submit handled");
                        }
                    }
                    None => {
                        tracing::info!("command channel closed, stopping widget loop");
                        self.controller.close_panel();
                        return Ok(());
                    }
                },
                Some(event) = self.events.recv() => {
                    self.controller.handle_transport_event(event);
                }
            }
        }
    }
}

impl<S: PresentationSurface + Send + 'static> WidgetClient<S> {
    /// Same as [`run`](Self::run), but on a spawned task.
    pub fn spawn(
        self,
        commands: mpsc::Receiver<UiCommand>,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<Result<(), ClientError>> {
        tokio::spawn(async move { self.run(commands, shutdown).await })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wc_sessions::MemorySessionStore;

    use super::*;
    use crate::builder::WidgetClientBuilder;
    use crate::connection::ConnectionState;
    use crate::surface::{Role, Transcript};
    use crate::test_support::MockConnector;

    fn client(mock: &MockConnector) -> WidgetClient<Transcript> {
        WidgetClientBuilder::new()
            .session_id("s1")
            .session_store(MemorySessionStore::new())
            .connector(mock.clone())
            .build(Transcript::new())
            .unwrap()
    }

    #[tokio::test]
    async fn dispatch_routes_commands() {
        let mock = MockConnector::default();
        let mut c = client(&mock);

        assert_eq!(c.dispatch(UiCommand::OpenPanel), None);
        assert_eq!(mock.opens(), 1);

        mock.last().opened();
        c.pump().await;
        assert_eq!(c.controller().connection().state(), ConnectionState::Open);

        assert_eq!(
            c.dispatch(UiCommand::Submit("hi".into())),
            Some(SubmitOutcome::Sent)
        );
        c.dispatch(UiCommand::ClosePanel);
        assert_eq!(c.controller().connection().state(), ConnectionState::Closing);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_and_closes_socket() {
        let mock = MockConnector::default();
        let c = client(&mock);
        let (tx, rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();
        let handle = c.spawn(rx, shutdown.clone());

        tx.send(UiCommand::OpenPanel).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while mock.opens() == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        shutdown.cancel();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(ClientError::Shutdown)));
        assert!(mock.close_requested(0));
    }

    #[tokio::test]
    async fn run_returns_ok_when_commands_end() {
        let mock = MockConnector::default();
        let c = client(&mock);
        let (tx, rx) = mpsc::channel(8);
        tx.send(UiCommand::Submit("early".into())).await.unwrap();
        drop(tx);

        c.run(rx, CancellationToken::new()).await.unwrap();
        // The deferred submit started exactly one attempt.
        assert_eq!(mock.opens(), 1);
    }

    #[tokio::test]
    async fn greeting_is_first_entry() {
        let mock = MockConnector::default();
        let mut c = client(&mock);
        c.dispatch(UiCommand::OpenPanel);
        let messages = c.controller().surface().messages();
        assert_eq!(messages[0].0, Role::Assistant);
    }
}
