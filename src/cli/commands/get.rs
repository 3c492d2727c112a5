//! Get user command handler

use crate::config::Config;
use crate::models::{Includes, Tracking, UserFilter};
use crate::services::UserService;

use super::{open_service, print_user};

pub async fn cmd_get_user(
    config: &Config,
    id: Option<i32>,
    login: Option<String>,
    include: &str,
    tracked: bool,
    json: bool,
) -> anyhow::Result<()> {
    let includes: Includes = include.parse().map_err(anyhow::Error::msg)?;
    let tracking = if tracked {
        Tracking::Tracked
    } else {
        Tracking::NoTracking
    };

    let filter = match (id, login) {
        (Some(id), _) => UserFilter::by_id(id),
        (None, Some(login)) => UserFilter::by_login(login),
        (None, None) => anyhow::bail!("Either --id or --login is required"),
    };

    let service = open_service(config).await?;
    let user = service.get_user(&filter, includes, tracking).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    match user {
        Some(user) => print_user(&user),
        None => println!("User not found."),
    }

    Ok(())
}
