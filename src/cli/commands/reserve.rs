use crate::cli::commands::open_store;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::workflow::{
    FIELD_EMAIL, FIELD_END, FIELD_FIRST_NAME, FIELD_LAST_NAME, FIELD_PHONE, FIELD_ROOM,
    FIELD_START, Notify, ReservationWorkflow, WorkflowOutcome,
};
use crate::errors::{AppError, AppResult};
use crate::mail::MailQueue;
use crate::ui::messages::{error, mail, success};
use std::collections::HashMap;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Reserve {
        room,
        start,
        end,
        first_name,
        last_name,
        email,
        phone,
    } = cmd
    {
        let store = open_store(cfg)?;
        let (queue, mut outbox) = MailQueue::channel();
        let workflow = ReservationWorkflow::new(
            store.clone(),
            store,
            queue,
            Notify {
                from: cfg.mail_from.clone(),
                owner: cfg.owner_email.clone(),
            },
        );

        let fields: HashMap<String, String> = [
            (FIELD_ROOM, room),
            (FIELD_START, start),
            (FIELD_END, end),
            (FIELD_FIRST_NAME, first_name),
            (FIELD_LAST_NAME, last_name),
            (FIELD_EMAIL, email),
            (FIELD_PHONE, phone),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();

        match workflow.submit(fields) {
            WorkflowOutcome::Confirmed(res) => {
                success(format!(
                    "Reservation {} confirmed: {} in room {} from {} to {}",
                    res.id,
                    res.full_name(),
                    res.room_id,
                    res.start_str(),
                    res.end_str()
                ));
                while let Ok(msg) = outbox.try_recv() {
                    mail(format!("{} <- {}", msg.to, msg.subject));
                }
            }
            WorkflowOutcome::Rejected { form, .. } => {
                for field in form.errors.fields() {
                    error(format!(
                        "{}: {}",
                        field,
                        form.errors.get(field).unwrap_or_default()
                    ));
                }
                return Err(AppError::Validation("reservation rejected".into()));
            }
            WorkflowOutcome::Failed { reached, error } => {
                return Err(AppError::Other(format!(
                    "reservation failed after '{}': {}",
                    reached, error
                )));
            }
        }
    }
    Ok(())
}
