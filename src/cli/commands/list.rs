//! List users command handler

use crate::config::Config;
use crate::models::{GroupCode, Includes, StatusCode, UserFilter};
use crate::services::UserService;

use super::{open_service, print_user};

#[allow(clippy::too_many_arguments)]
pub async fn cmd_list_users(
    config: &Config,
    skip: u64,
    take: Option<u64>,
    include: &str,
    group: Option<GroupCode>,
    state: Option<StatusCode>,
    json: bool,
) -> anyhow::Result<()> {
    let includes: Includes = include.parse().map_err(anyhow::Error::msg)?;
    let take = take.unwrap_or(config.accounts.default_page_size);

    if take > config.accounts.max_page_size {
        anyhow::bail!(
            "--take cannot exceed {} (accounts.max_page_size)",
            config.accounts.max_page_size
        );
    }

    let filter = UserFilter {
        group,
        state,
        ..UserFilter::default()
    };
    let filter = (!filter.is_empty()).then_some(filter);

    let service = open_service(config).await?;
    let users = service
        .list_users(filter.as_ref(), skip, take, includes)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users found.");
        println!();
        println!("Add one with: usergate add <login> <password>");
        return Ok(());
    }

    println!("Users ({} shown, skipped {})", users.len(), skip);
    println!("{:-<70}", "");

    for user in &users {
        print_user(user);
    }

    Ok(())
}
