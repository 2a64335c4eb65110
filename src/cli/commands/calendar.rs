use crate::cli::commands::open_store;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::calendar::{MonthView, build_month_view};
use crate::core::ledger::Ledger;
use crate::errors::AppResult;
use crate::store::RoomStore;
use crate::ui::messages::{header, info};
use crate::utils::colors::{GREY, RED, RESET, YELLOW};
use crate::utils::date::current_month;
use chrono::Datelike;
use unicode_width::UnicodeWidthStr;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Calendar { year, month } = cmd {
        let (year, month) = match (year, month) {
            (Some(y), Some(m)) => (*y, *m),
            _ => current_month(),
        };

        let store = open_store(cfg)?;
        let rooms = store.all_rooms()?;
        if rooms.is_empty() {
            info("No rooms yet.");
            return Ok(());
        }

        let view = build_month_view(&Ledger::new(store), year, month, &rooms)?;
        print_view(&view);
    }
    Ok(())
}

/// One line per room, one cell per day: `R` reserved, `B` blocked, `.` free.
fn print_view(view: &MonthView) {
    header(format!("{}-{:02}", view.year, view.month));

    let name_w = view
        .rooms
        .iter()
        .map(|c| c.room.room_name.width())
        .max()
        .unwrap_or(4);

    let days: String = (1..=view.days_in_month)
        .map(|d| format!("{:>3}", d))
        .collect();
    println!("{:name_w$} {}", "", days, name_w = name_w);

    for cal in &view.rooms {
        let mut line = String::new();
        for (day, res_id) in &cal.reservations {
            let cell = if *res_id > 0 {
                format!("{}  R{}", RED, RESET)
            } else if cal.block_id(*day) > 0 {
                format!("{}  B{}", YELLOW, RESET)
            } else {
                format!("{}  .{}", GREY, RESET)
            };
            line.push_str(&cell);
        }
        let pad = " ".repeat(name_w.saturating_sub(cal.room.room_name.width()));
        println!("{}{} {}", cal.room.room_name, pad, line);
    }

    let blocks: Vec<String> = view
        .rooms
        .iter()
        .flat_map(|cal| {
            cal.blocks
                .iter()
                .filter(|(_, id)| **id > 0)
                .map(move |(day, id)| {
                    format!("  #{} {} day {}", id, cal.room.room_name, day.day())
                })
        })
        .collect();
    if !blocks.is_empty() {
        println!("\nBlocks:");
        for b in blocks {
            println!("{}", b);
        }
    }
    println!();
}
