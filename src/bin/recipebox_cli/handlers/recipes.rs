#![deny(clippy::all, clippy::pedantic)]

use recipebox::application::{AppError, HomeScreen, RecipeCard, RecipeEditor, ViewState};
use recipebox::cache::QueryOptions;
use recipebox::domain::error::ValidationError;
use recipebox::domain::recipes::IngredientList;
use recipebox_api_types::{Id, Recipe, UpdateRecipeRequest};
use serde_json::json;

use crate::args::RecipesCmd;
use crate::context::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: RecipesCmd) -> Result<(), CliError> {
    match cmd {
        RecipesCmd::List { mine, search } => list(ctx, mine, search).await,
        RecipesCmd::Get { id } => get(ctx, id).await,
        RecipesCmd::Create {
            title,
            description,
            ingredients,
            instructions,
        } => create(ctx, title, description, ingredients, instructions).await,
        RecipesCmd::Update {
            id,
            title,
            description,
            ingredients,
            instructions,
        } => update(ctx, id, title, description, ingredients, instructions).await,
        RecipesCmd::Delete { id, yes } => delete(ctx, id, yes).await,
    }
}

async fn list(ctx: &Ctx, mine: bool, search: Option<String>) -> Result<(), CliError> {
    if mine {
        ctx.require_login()?;
    }
    let mut home = HomeScreen::new(ctx.session.clone());
    home.set_show_mine(mine);
    home.search = search.unwrap_or_default();

    match home.load().await {
        ViewState::Populated(recipes) => print_json(&recipes),
        ViewState::Empty => print_json(&Vec::<Recipe>::new()),
        ViewState::Error(message) => Err(CliError::Query(message)),
        ViewState::Loading => Err(CliError::Query("recipes did not load".into())),
    }
}

pub(crate) async fn fetch_recipe(ctx: &Ctx, id: Id) -> Result<Recipe, CliError> {
    let snapshot = ctx.cache().recipe(id, QueryOptions::default()).await;
    if let Some(error) = snapshot.error {
        return Err(error.into());
    }
    snapshot
        .data
        .ok_or_else(|| CliError::App(AppError::NotFound))
}

async fn get(ctx: &Ctx, id: Id) -> Result<(), CliError> {
    let recipe = fetch_recipe(ctx, id).await?;
    print_json(&recipe)
}

async fn create(
    ctx: &Ctx,
    title: String,
    description: Option<String>,
    ingredients: Vec<String>,
    instructions: String,
) -> Result<(), CliError> {
    ctx.require_login()?;

    let mut editor = RecipeEditor::new();
    editor.title = title;
    editor.description = description.unwrap_or_default();
    editor.instructions = instructions;
    for ingredient in ingredients {
        editor.ingredient_input = ingredient;
        editor.add_ingredient();
    }

    let created = editor.submit(ctx.cache()).await?;
    print_json(&created)
}

async fn update(
    ctx: &Ctx,
    id: Id,
    title: Option<String>,
    description: Option<String>,
    ingredients: Vec<String>,
    instructions: Option<String>,
) -> Result<(), CliError> {
    ctx.require_login()?;

    let ingredients = if ingredients.is_empty() {
        None
    } else {
        let list = IngredientList::from_values(&ingredients);
        if list.is_empty() {
            return Err(ValidationError::NoIngredients.into());
        }
        Some(list.to_vec())
    };
    let patch = UpdateRecipeRequest {
        title,
        description,
        ingredients,
        instructions,
        ..UpdateRecipeRequest::new(id)
    };
    if patch.is_empty() {
        return Err(ValidationError::EmptyPatch.into());
    }

    let updated = ctx.cache().update_recipe(&patch).await?;
    print_json(&updated)
}

async fn delete(ctx: &Ctx, id: Id, yes: bool) -> Result<(), CliError> {
    ctx.require_login()?;

    let recipe = fetch_recipe(ctx, id).await?;
    let card = RecipeCard::new(recipe, &ctx.session);
    let confirm = Ctx::confirmer(yes);
    let deleted = card.delete_recipe(confirm.as_ref()).await?;
    print_json(&json!({ "id": id, "deleted": deleted }))
}
