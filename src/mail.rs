//! Outgoing mail: a queue the request path writes to and a worker task that
//! drains it.
//!
//! Sending never blocks or fails a request. The worker hands each message to
//! a [`MailTransport`]; the default transport only records the message in
//! the log.

use crate::errors::AppResult;
use crate::models::MailData;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

pub trait MailTransport: Send + Sync + 'static {
    fn deliver(&self, msg: &MailData) -> AppResult<()>;
}

/// Logs every message instead of delivering it.
pub struct LogTransport;

impl MailTransport for LogTransport {
    fn deliver(&self, msg: &MailData) -> AppResult<()> {
        tracing::info!(
            to = %msg.to,
            from = %msg.from,
            subject = %msg.subject,
            template = %msg.template,
            "mail delivered"
        );
        tracing::debug!(content = %msg.content, "mail body");
        Ok(())
    }
}

/// Sending half of the mail channel. Cheap to clone.
#[derive(Clone)]
pub struct MailQueue {
    tx: UnboundedSender<MailData>,
}

impl MailQueue {
    pub fn channel() -> (Self, UnboundedReceiver<MailData>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Fire-and-forget. A closed channel is logged and otherwise ignored.
    pub fn send(&self, msg: MailData) {
        if let Err(e) = self.tx.send(msg) {
            tracing::warn!(to = %e.0.to, "mail queue closed, message dropped");
        }
    }
}

/// Spawn the worker draining `rx` into `transport`. The task ends once every
/// [`MailQueue`] clone is dropped.
pub fn listen_for_mail(
    mut rx: UnboundedReceiver<MailData>,
    transport: Arc<dyn MailTransport>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("mail worker started");
        while let Some(msg) = rx.recv().await {
            if let Err(e) = transport.deliver(&msg) {
                tracing::error!(to = %msg.to, error = %e, "mail delivery failed");
            }
        }
        tracing::info!("mail worker stopped");
    })
}
