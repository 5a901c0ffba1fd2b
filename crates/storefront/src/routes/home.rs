//! Home page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::view::PageContext;
use crate::error::Result;
use crate::models::{load_user, save_user};
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
}

/// Name form data.
#[derive(Debug, Deserialize)]
pub struct UsernameForm {
    #[serde(default)]
    pub username: String,
}

/// Display the home page.
///
/// Asks for the visitor's name until one is known, then offers to continue
/// ordering.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<HomeTemplate> {
    let page = PageContext::load(&session, state.currency()).await?;
    Ok(HomeTemplate { page })
}

/// Store the visitor's name and go to the menu.
///
/// A blank name keeps the visitor on the home page.
#[instrument(skip(session, form))]
pub async fn set_username(session: Session, Form(form): Form<UsernameForm>) -> Result<Response> {
    let mut user = load_user(&session).await?;
    if !user.set_username(&form.username) {
        return Ok(Redirect::to("/").into_response());
    }
    save_user(&session, &user).await?;
    Ok(Redirect::to("/menu").into_response())
}
