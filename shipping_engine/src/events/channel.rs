use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::sync::mpsc;

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Receives events from any number of [`EventProducer`]s and runs the handler for each one on its
/// own task. The handler loop ends once every producer has been dropped.
pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, listener) = mpsc::channel(buffer_size);
        Self { listener, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer { sender: self.sender.clone() }
    }

    pub async fn start_handler(mut self) {
        debug!("📨️ Event handler started");
        // The internal sender must go, otherwise the recv loop never terminates.
        drop(self.sender);
        while let Some(event) = self.listener.recv().await {
            let handler = Arc::clone(&self.handler);
            tokio::spawn(async move {
                (handler)(event).await;
            });
        }
        debug!("📨️ Event handler shut down: all producers dropped");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📨️ Failed to publish event: {e}");
        }
    }
}
