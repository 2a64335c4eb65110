use crate::cli::commands::open_store;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::logging;
use crate::mail::{LogTransport, MailQueue, listen_for_mail};
use crate::registry::AppRegistry;
use crate::render::JsonRenderer;
use crate::web;
use std::sync::Arc;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Serve { addr } = cmd {
        logging::init(&cfg.log_level);

        let addr = addr.clone().unwrap_or_else(|| cfg.listen_addr.clone());
        let store = open_store(cfg)?;
        tracing::info!(database = %cfg.database, "store ready");

        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| AppError::Server(format!("cannot start runtime: {}", e)))?;

        runtime.block_on(async {
            let (queue, outbox) = MailQueue::channel();
            let mailer = listen_for_mail(outbox, Arc::new(LogTransport));

            let registry = AppRegistry::new(store, queue, Arc::new(JsonRenderer), cfg);
            let result = web::serve(registry, &addr).await;

            // the registry (and its queue) is gone once serve returns
            if let Err(e) = mailer.await {
                tracing::warn!(error = %e, "mail worker ended abnormally");
            }
            result
        })
    } else {
        Ok(())
    }
}
