mod add;
mod block;
mod get;
mod list;

pub use add::cmd_add_user;
pub use block::cmd_block_user;
pub use get::cmd_get_user;
pub use list::cmd_list_users;

use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::models::User;
use crate::services::{AdmissionRegistry, DefaultUserService};

async fn open_service(config: &Config) -> anyhow::Result<DefaultUserService> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    Ok(DefaultUserService::from_config(
        Arc::new(store),
        Arc::new(AdmissionRegistry::new()),
        &config.accounts,
    ))
}

fn print_user(user: &User) {
    let group = user
        .group
        .as_ref()
        .map_or_else(|| "-".to_string(), |g| g.code.to_string());
    let state = user
        .state
        .as_ref()
        .map_or_else(|| "-".to_string(), |s| s.code.to_string());

    println!("{} {} [{} | {}]", user.id, user.login, group, state);
    println!("  Created: {}", user.created_at.to_rfc3339());

    if let Some(description) = user.group.as_ref().and_then(|g| g.description.as_deref()) {
        println!("  Group: {description}");
    }
    if let Some(description) = user.state.as_ref().and_then(|s| s.description.as_deref()) {
        println!("  State: {description}");
    }
}
