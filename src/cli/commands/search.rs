use crate::cli::commands::{open_store, range_args};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::availability::AvailabilityEngine;
use crate::errors::AppResult;
use crate::store::RoomStore;
use crate::ui::messages::{success, warning};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Search { start, end, room } = cmd {
        let (start, end) = range_args(start, end)?;
        let store = open_store(cfg)?;
        let engine = AvailabilityEngine::new(store.clone());

        if let Some(room_id) = room {
            let room = store.room_by_id(*room_id)?;
            if engine.is_room_available(room.id, start, end)? {
                success(format!(
                    "{} is available from {} to {}",
                    room.room_name, start, end
                ));
            } else {
                warning(format!(
                    "{} is not available from {} to {}",
                    room.room_name, start, end
                ));
            }
            return Ok(());
        }

        let rooms = engine.available_rooms(start, end)?;
        if rooms.is_empty() {
            warning(format!("No availability from {} to {}", start, end));
            return Ok(());
        }

        let mut table = Table::new(vec![Column::new("ID"), Column::new("ROOM")]);
        for r in rooms {
            table.add_row(vec![r.id.to_string(), r.room_name]);
        }
        println!("Available from {} to {}:\n", start, end);
        print!("{}", table.render());
    }
    Ok(())
}
