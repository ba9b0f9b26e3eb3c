use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::error::HttpError;
use crate::application::users::UserRecord;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Site-wide chrome shared by every rendered page.
#[derive(Debug, Clone)]
pub struct SiteView {
    pub title: String,
    pub environment: &'static str,
}

/// Wrapper pairing the site chrome with page-specific content, mirroring the
/// shape every template expects under its `view` field.
#[derive(Debug, Clone)]
pub struct LayoutContext<T> {
    pub site: SiteView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(site: SiteView, content: T) -> Self {
        Self { site, content }
    }
}

pub struct IndexContext {
    pub welcome: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<IndexContext>,
}

pub struct UserCard {
    pub name: String,
    pub handle: String,
}

impl From<&UserRecord> for UserCard {
    fn from(record: &UserRecord) -> Self {
        Self {
            name: record.name.clone(),
            handle: record.handle.clone(),
        }
    }
}

pub struct UsersContext {
    pub users: Vec<UserCard>,
}

#[derive(Template)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub view: LayoutContext<UsersContext>,
}

/// Content for the terminal error page. `detail` stays empty outside of
/// development.
pub struct ErrorPageView {
    pub message: String,
    pub status_code: u16,
    pub detail: Vec<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

/// Render the error view with the given status, falling back to a plain
/// response if the error template itself cannot render.
pub fn render_error_page(
    site: SiteView,
    status: StatusCode,
    message: String,
    detail: Vec<String>,
) -> Response {
    let content = ErrorPageView {
        message: message.clone(),
        status_code: status.as_u16(),
        detail,
    };
    let template = ErrorTemplate {
        view: LayoutContext::new(site, content),
    };

    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(_) => (status, message).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteView {
        SiteView {
            title: "Brezza".to_string(),
            environment: "development",
        }
    }

    #[test]
    fn index_template_renders_site_title() {
        let template = IndexTemplate {
            view: LayoutContext::new(
                site(),
                IndexContext {
                    welcome: "Welcome to Brezza".to_string(),
                },
            ),
        };
        let html = template.render().expect("index renders");
        assert!(html.contains("Welcome to Brezza"));
        assert!(html.contains("<title>Brezza</title>"));
    }

    #[test]
    fn error_template_renders_detail_lines_when_present() {
        let template = ErrorTemplate {
            view: LayoutContext::new(
                site(),
                ErrorPageView {
                    message: "Not Found".to_string(),
                    status_code: 404,
                    detail: vec!["no route matched `/missing`".to_string()],
                },
            ),
        };
        let html = template.render().expect("error renders");
        assert!(html.contains("Not Found"));
        assert!(html.contains("404"));
        assert!(html.contains("no route matched `/missing`"));
    }

    #[test]
    fn error_template_omits_detail_section_when_empty() {
        let template = ErrorTemplate {
            view: LayoutContext::new(
                site(),
                ErrorPageView {
                    message: "Not Found".to_string(),
                    status_code: 404,
                    detail: Vec::new(),
                },
            ),
        };
        let html = template.render().expect("error renders");
        assert!(!html.contains("error-detail"));
    }
}
