use crate::events::SessionEvent;
use crate::session::{Session, SessionSnapshot};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Owns a session and applies queued events one at a time, publishing a
/// snapshot after each.
pub struct SessionWorker {
    receiver: mpsc::Receiver<SessionEvent>,
    session: Session,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl SessionWorker {
    pub fn new(
        receiver: mpsc::Receiver<SessionEvent>,
        session: Session,
    ) -> (Self, watch::Receiver<SessionSnapshot>) {
        let (snapshots, watcher) = watch::channel(session.snapshot());
        (
            Self {
                receiver,
                session,
                snapshots,
            },
            watcher,
        )
    }

    /// Runs until every sender is dropped, then hands the session back.
    pub async fn run(mut self) -> Session {
        info!("Session worker started");
        while let Some(event) = self.receiver.recv().await {
            debug!("Applying {} event", event_name(&event));
            self.session.apply(event);
            self.snapshots.send_replace(self.session.snapshot());
        }
        info!("Session worker stopped");
        self.session
    }
}

fn event_name(event: &SessionEvent) -> &'static str {
    match event {
        SessionEvent::Loaded(Ok(_)) => "loaded",
        SessionEvent::Loaded(Err(_)) => "load_failed",
        SessionEvent::CellClicked(_) => "cell_clicked",
        SessionEvent::Add(_) => "add",
        SessionEvent::Reset => "reset",
        SessionEvent::Clear => "clear",
    }
}
