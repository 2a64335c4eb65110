use crate::cli::commands::{date_arg, open_store};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::Ledger;
use crate::errors::{AppError, AppResult};
use crate::store::RoomStore;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Block { room, date } => {
            let day = date_arg(date)?;
            let store = open_store(cfg)?;
            let room = store.room_by_id(*room)?;
            let ledger = Ledger::new(store);

            // a day already carrying a reservation is never blocked
            let current = ledger.restrictions_for_room(room.id, day, day)?;
            if current.iter().any(|r| !r.is_block()) {
                return Err(AppError::Validation(format!(
                    "{} is reserved on {}",
                    room.room_name, day
                )));
            }
            if let Some(existing) = current.iter().find(|r| r.is_block()) {
                success(format!(
                    "{} is already blocked on {} (block #{})",
                    room.room_name, day, existing.id
                ));
                return Ok(());
            }

            let id = ledger.insert_block(room.id, day)?;
            success(format!("Blocked {} on {} (block #{})", room.room_name, day, id));
        }
        Commands::Unblock { id } => {
            let ledger = Ledger::new(open_store(cfg)?);
            ledger.delete_block(*id)?;
            success(format!("Block #{} removed", id));
        }
        _ => {}
    }
    Ok(())
}
