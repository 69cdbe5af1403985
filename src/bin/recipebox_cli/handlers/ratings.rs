#![deny(clippy::all, clippy::pedantic)]

use recipebox::cache::QueryOptions;
use recipebox::domain::ratings::{RatingSummary, Stars, rating_by};
use recipebox_api_types::Id;
use serde_json::json;

use crate::args::RatingsCmd;
use crate::context::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: RatingsCmd) -> Result<(), CliError> {
    match cmd {
        RatingsCmd::List { recipe_id } => list(ctx, recipe_id).await,
        RatingsCmd::Rate { recipe_id, stars } => rate(ctx, recipe_id, stars).await,
        RatingsCmd::Delete { recipe_id, yes } => delete(ctx, recipe_id, yes).await,
    }
}

async fn list(ctx: &Ctx, recipe_id: Id) -> Result<(), CliError> {
    let snapshot = ctx
        .cache()
        .ratings(recipe_id, QueryOptions::default())
        .await;
    if let Some(error) = snapshot.error {
        return Err(error.into());
    }
    let ratings = snapshot.data.unwrap_or_default();
    let summary = RatingSummary::of(&ratings);
    let mine = ctx
        .session
        .current_user_id()
        .and_then(|user_id| rating_by(&ratings, user_id))
        .map(|rating| rating.stars);

    print_json(&json!({
        "recipeId": recipe_id,
        "average": summary.average,
        "count": summary.count,
        "mine": mine,
        "ratings": ratings,
    }))
}

async fn rate(ctx: &Ctx, recipe_id: Id, stars: i64) -> Result<(), CliError> {
    let stars = Stars::new(stars)?;
    ctx.require_login()?;

    let rating = ctx.cache().upsert_rating(recipe_id, stars).await?;
    print_json(&rating)
}

async fn delete(ctx: &Ctx, recipe_id: Id, yes: bool) -> Result<(), CliError> {
    ctx.require_login()?;

    let confirm = Ctx::confirmer(yes);
    let prompt = format!("Delete your rating of recipe {recipe_id}?");
    if !confirm.confirm(&prompt) {
        return print_json(&json!({ "recipeId": recipe_id, "deleted": false }));
    }
    ctx.cache().delete_rating(recipe_id).await?;
    print_json(&json!({ "recipeId": recipe_id, "deleted": true }))
}
