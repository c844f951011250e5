//! HTML routes serving the widget.

use axum::extract::{Query, State};
use axum::response::Html;

use super::error::{ApiError, PersistenceError};
use super::AppState;
use crate::config::API_BASE;
use crate::widget::{render_host_page, MountHandle, WIDGET_TAG};

/// Demo page with the widget pointed at this server's API.
pub async fn host_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let widget = render_widget(&state, vec![("api-base".to_string(), API_BASE.to_string())])?;
    Ok(Html(render_host_page("Feedback", &widget.to_html())))
}

/// A bare `<my-widget>` element. Query parameters become the element's
/// attributes, so `/embed?api-base=/x&title=Hi` mounts
/// `<my-widget api-base="/x" title="Hi">`.
pub async fn embed(
    State(state): State<AppState>,
    Query(attributes): Query<Vec<(String, String)>>,
) -> Result<Html<String>, ApiError> {
    let widget = render_widget(&state, attributes)?;
    Ok(Html(widget.to_html()))
}

fn render_widget(
    state: &AppState,
    attributes: Vec<(String, String)>,
) -> Result<MountHandle, ApiError> {
    let feedbacks = state.db.list_feedback().map_err(PersistenceError::Fetch)?;

    let mut widget = state.elements.mount(WIDGET_TAG, attributes)?;
    widget.render(&feedbacks);
    Ok(widget)
}
