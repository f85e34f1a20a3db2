use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub(crate) async fn dashboard_page(State(state): State<AppState>) -> Html<String> {
    Html(state.page.html().to_string())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard_page))
}
