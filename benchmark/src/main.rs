mod data;
mod goose_ext;

use crate::goose_ext::{GooseRequestExt, GooseResponseExt};
use common_lib::RawUser;
use goose::prelude::*;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), GooseError> {
    let custom_host = match std::env::var("HOST") {
        Ok(host) => host,
        Err(_) => "".to_string(),
    };

    GooseAttack::initialize()?
        .register_scenario(
            scenario!("Load Dashboard")
                .set_wait_time(Duration::from_secs(1), Duration::from_secs(5))?
                .register_transaction(transaction!(load_dashboard)),
        )
        .register_scenario(
            scenario!("Browse Directory")
                .set_wait_time(Duration::from_secs(2), Duration::from_secs(10))?
                .register_transaction(transaction!(browse_directory)),
        )
        .register_scenario(
            scenario!("Toggle Follow")
                .set_wait_time(Duration::from_secs(5), Duration::from_secs(15))?
                .register_transaction(transaction!(toggle_follow)),
        )
        .set_default(GooseDefault::Host, custom_host.as_str())?
        .execute()
        .await?;

    Ok(())
}

/// Own profile, followers and following: what every follow toggle re-fetches.
async fn reconcile(user: &mut GooseUser) -> TransactionResult {
    let viewer_id = data::viewer_id();

    let _response = user
        .get_request("profile-get", format!("/users/profile/{viewer_id}").as_str())
        .await?;
    let _response = user.get_request("followers-get", "/users/followers").await?;
    let _response = user.get_request("followings-get", "/users/followings").await?;

    Ok(())
}

async fn load_dashboard(user: &mut GooseUser) -> TransactionResult {
    reconcile(user).await?;

    let _response = user.get_request("users-all", "/users/all").await?;

    Ok(())
}

async fn browse_directory(user: &mut GooseUser) -> TransactionResult {
    let response = user.get_request("users-all", "/users/all").await?;
    let users: Option<Vec<RawUser>> = response.json().await?;
    let ids: Vec<String> = users
        .unwrap_or_default()
        .into_iter()
        .map(|u| u.uid)
        .collect();

    if let Some(user_id) = data::rand_listed_id(&ids) {
        let _response = user
            .get_request("profile-get", format!("/users/profile/{user_id}").as_str())
            .await?;
    }

    Ok(())
}

async fn toggle_follow(user: &mut GooseUser) -> TransactionResult {
    let target_id = data::rand_target_id();

    // 1. Follow, then re-fetch
    let _response = user
        .post_empty_request("follow", format!("/follow/{target_id}").as_str())
        .await?;
    reconcile(user).await?;

    // 2. Unfollow, then re-fetch
    let _response = user
        .post_empty_request("unfollow", format!("/unfollow/{target_id}").as_str())
        .await?;
    reconcile(user).await?;

    Ok(())
}
