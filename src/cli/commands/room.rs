use crate::cli::commands::open_store;
use crate::cli::parser::{Commands, RoomAction};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::store::RoomStore;
use crate::ui::messages::{info, success};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Room { action } = cmd {
        let store = open_store(cfg)?;

        match action {
            RoomAction::Add { name } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(AppError::Validation("room name cannot be blank".into()));
                }
                let id = store.insert_room(name)?;
                success(format!("Room {} added with id {}", name, id));
            }
            RoomAction::List => {
                let rooms = store.all_rooms()?;
                if rooms.is_empty() {
                    info("No rooms yet. Add one with `hotelbook room add <NAME>`.");
                    return Ok(());
                }
                let mut table = Table::new(vec![Column::new("ID"), Column::new("ROOM")]);
                for r in rooms {
                    table.add_row(vec![r.id.to_string(), r.room_name]);
                }
                print!("{}", table.render());
            }
        }
    }
    Ok(())
}
