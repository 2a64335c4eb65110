use crate::cli::commands::open_store;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::admin::ReservationAdmin;
use crate::errors::AppResult;
use crate::models::Reservation;
use crate::ui::messages::{info, success};
use crate::utils::colors::{CYAN, RESET, color_for_optional_field, color_for_processed};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Reservations {
        new_only,
        show,
        process,
        delete,
    } = cmd
    {
        let admin = ReservationAdmin::new(open_store(cfg)?);

        if let Some(id) = process {
            admin.mark_processed(*id)?;
            success(format!("Reservation {} marked as processed", id));
            return Ok(());
        }

        if let Some(id) = delete {
            admin.delete(*id)?;
            success(format!("Reservation {} deleted", id));
            return Ok(());
        }

        if let Some(id) = show {
            print_details(&admin.show(*id)?);
            return Ok(());
        }

        let list = if *new_only {
            admin.unprocessed()?
        } else {
            admin.all()?
        };
        if list.is_empty() {
            info("No reservations.");
            return Ok(());
        }
        print_list(&list);
    }
    Ok(())
}

fn print_list(list: &[Reservation]) {
    let mut table = Table::new(vec![
        Column::new("ID"),
        Column::new("GUEST"),
        Column::new("ROOM"),
        Column::new("ARRIVAL"),
        Column::new("DEPARTURE"),
        Column::new("PROCESSED"),
    ]);
    for r in list {
        table.add_row(vec![
            r.id.to_string(),
            r.full_name(),
            r.room_name.clone(),
            r.start_str(),
            r.end_str(),
            if r.processed { "yes" } else { "no" }.to_string(),
        ]);
    }
    print!("{}", table.render());
}

fn print_details(r: &Reservation) {
    let field = |label: &str, value: &str| {
        println!(
            "{}{:<10}{} {}{}{}",
            CYAN,
            label,
            RESET,
            color_for_optional_field(Some(value)),
            if value.is_empty() { "--" } else { value },
            RESET
        );
    };
    println!();
    field("ID", &r.id.to_string());
    field("Guest", &r.full_name());
    field("Email", &r.email);
    field("Phone", &r.phone);
    field("Room", &r.room_name);
    field("Arrival", &r.start_str());
    field("Departure", &r.end_str());
    println!(
        "{}{:<10}{} {}{}{}",
        CYAN,
        "Processed",
        RESET,
        color_for_processed(r.processed),
        if r.processed { "yes" } else { "no" },
        RESET
    );
    println!();
}
