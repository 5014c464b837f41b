use axum::{
    extract::Query,
    response::Response,
    Form,
};
use serde::Deserialize;
use tracing::debug;

use super::html;
use super::session::WebSession;
use crate::auth::Gate;
use crate::pages::{AuthForm, AuthPage, DashboardPage, Notice, ProfileForm, ProfileSetupPage, Route, Transition};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET / - static landing page
pub async fn landing(mut session: WebSession) -> Response {
    let notices: Vec<_> = session.take_flash().into_iter().collect();
    session.page(html::landing(&notices))
}

/// GET /register
pub async fn register_form(mut session: WebSession) -> Response {
    let notices: Vec<_> = session.take_flash().into_iter().collect();
    session.page(html::auth_form(Route::Register, "", &notices))
}

/// POST /register
pub async fn register_submit(session: WebSession, Form(form): Form<AuthForm>) -> Response {
    let outcome = AuthPage::new(session.client().clone()).register(&form).await;
    respond(&session, outcome, |notices| html::auth_form(Route::Register, &form.email, notices))
}

/// GET /login
pub async fn login_form(mut session: WebSession) -> Response {
    let notices: Vec<_> = session.take_flash().into_iter().collect();
    session.page(html::auth_form(Route::Login, "", &notices))
}

/// POST /login
pub async fn login_submit(session: WebSession, Form(form): Form<AuthForm>) -> Response {
    let outcome = AuthPage::new(session.client().clone()).login(&form).await;
    respond(&session, outcome, |notices| html::auth_form(Route::Login, &form.email, notices))
}

/// GET /profile-setup
pub async fn profile_setup_form(mut session: WebSession) -> Response {
    match ProfileSetupPage::enter(session.client()).await {
        Gate::Redirect(route) => session.redirect(route, None),
        Gate::Admitted(_page) => {
            let notices: Vec<_> = session.take_flash().into_iter().collect();
            session.page(html::profile_setup(&ProfileForm::default(), &notices))
        }
    }
}

/// POST /profile-setup
pub async fn profile_setup_submit(session: WebSession, Form(form): Form<ProfileForm>) -> Response {
    let page = match ProfileSetupPage::enter(session.client()).await {
        Gate::Redirect(route) => return session.redirect(route, None),
        Gate::Admitted(page) => page,
    };
    let outcome = page.submit(&form).await;
    respond(&session, outcome, |notices| html::profile_setup(&form, notices))
}

/// GET /dashboard?q= - gate, load profile and papers, render the filtered list
pub async fn dashboard(mut session: WebSession, Query(params): Query<SearchParams>) -> Response {
    let mut page = match DashboardPage::enter(session.client()).await {
        Gate::Redirect(route) => return session.redirect(route, None),
        Gate::Admitted(page) => page,
    };

    let mut notices: Vec<_> = session.take_flash().into_iter().collect();
    notices.extend(page.load().await);
    page.set_query(params.q);
    debug!(query = page.query(), shown = page.visible().len(), "rendering dashboard");

    session.page(html::dashboard(&page, &notices))
}

/// POST /logout
pub async fn logout(session: WebSession) -> Response {
    let mut page = match DashboardPage::enter(session.client()).await {
        Gate::Redirect(route) => return session.redirect(route, None),
        Gate::Admitted(page) => page,
    };
    let notice = page.logout().await;
    let route = page.poll_signed_out().unwrap_or(Route::Login);
    session.redirect(route, Some(&notice))
}

/// Follow a form transition: redirect with its notice, or re-render the form
fn respond(
    session: &WebSession,
    outcome: Transition,
    render: impl FnOnce(&[Notice]) -> String,
) -> Response {
    match outcome {
        Transition::Navigate { to, notice } => session.redirect(to, notice.as_ref()),
        Transition::Stay(notice) => session.page(render(std::slice::from_ref(&notice))),
    }
}
