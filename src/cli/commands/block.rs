//! Block user command handler

use crate::config::Config;
use crate::services::UserService;

use super::open_service;

pub async fn cmd_block_user(config: &Config, id: i32) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    service.deactivate_user(id).await?;

    println!("✓ Blocked user {id}");
    Ok(())
}
