use crate::cli::commands::open_store;
use crate::cli::parser::{Commands, UserAction};
use crate::config::Config;
use crate::core::auth::Authenticator;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::User { action } = cmd {
        let auth = Authenticator::new(open_store(cfg)?);

        match action {
            UserAction::Add {
                first_name,
                last_name,
                email,
                password,
                access_level,
            } => {
                let id = auth.create_user(first_name, last_name, email, password, *access_level)?;
                success(format!("Administrator {} created with id {}", email, id));
            }
        }
    }
    Ok(())
}
