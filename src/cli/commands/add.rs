//! Add user command handler

use crate::config::Config;
use crate::models::{GroupCode, NewUser};
use crate::services::UserService;

use super::open_service;

pub async fn cmd_add_user(
    config: &Config,
    login: String,
    password: String,
    group: GroupCode,
    group_description: Option<String>,
    state_description: Option<String>,
) -> anyhow::Result<()> {
    let service = open_service(config).await?;

    let mut candidate = NewUser::new(login, password, group);
    candidate.group_description = group_description;
    candidate.state_description = state_description;

    println!(
        "Creating user '{}' (takes ~{}ms)...",
        candidate.login, config.accounts.creation_delay_ms
    );

    let user = service.create_user(Some(candidate)).await?;

    println!("✓ Created user '{}' with ID {}", user.login, user.id);
    Ok(())
}
