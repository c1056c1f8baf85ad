//! Embedded showcase page.
//!
//! The HTML template, CSS, and JS files from `frontend/` are compiled into
//! the binary using `include_str!`. The page is rendered once, when the
//! showcase answer is known, and served as a static string afterwards.

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use minijinja::{Environment, context};

use crate::SharedState;

const INDEX_HTML: &str = include_str!("../../../frontend/index.html");
const STYLE_CSS: &str = include_str!("../../../frontend/style.css");
const APP_JS: &str = include_str!("../../../frontend/app.js");

pub const PAGE_TITLE: &str = "visionOS Docs GPT";
pub const DOCS_URL: &str = "https://developer.apple.com/documentation/visionos";

/// Render the index page for one question/answer pair. Values are
/// HTML-escaped.
pub fn render_index(question: &str, answer: &str) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("index.html", INDEX_HTML)?;
    let tmpl = env.get_template("index.html")?;
    tmpl.render(context! {
        title => PAGE_TITLE,
        question => question,
        answer => answer,
        docs_url => DOCS_URL,
    })
}

/// Build a router that serves the embedded frontend.
pub fn frontend_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index_handler))
        .route("/static/style.css", get(css_handler))
        .route("/static/app.js", get(js_handler))
}

async fn index_handler(State(state): State<SharedState>) -> Html<String> {
    Html(state.page.clone())
}

async fn css_handler() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLE_CSS,
    )
        .into_response()
}

async fn js_handler() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        APP_JS,
    )
        .into_response()
}
