use std::sync::Arc;
use tokio::sync::watch;

/// Online/offline flag fed by platform notifications.
///
/// Reads are synchronous and never poll. Subscribers are woken only when the
/// value actually flips.
#[derive(Clone, Debug)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Records a platform online/offline notification.
    pub fn set_online(&self, online: bool) {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Connectivity {
    /// Starts online, matching how browsers report a freshly loaded page.
    fn default() -> Self {
        Self::new(true)
    }
}
