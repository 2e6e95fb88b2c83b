//! Server-rendered pages for the session deployment.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::errors::Error;

/// Build the template environment. Templates are compiled into the binary.
pub fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("base.html", include_str!("../templates/base.html"))?;
    env.add_template("home.html", include_str!("../templates/home.html"))?;
    env.add_template("login.html", include_str!("../templates/login.html"))?;
    env.add_template("signup.html", include_str!("../templates/signup.html"))?;
    env.add_template("dashboard.html", include_str!("../templates/dashboard.html"))?;
    Ok(env)
}

pub fn render<S: Serialize>(env: &Environment<'_>, name: &str, context: S) -> Result<Html<String>, Error> {
    let template = env.get_template(name).map_err(|e| Error::Internal {
        operation: format!("load template {name}: {e}"),
    })?;
    let html = template.render(context).map_err(|e| Error::Internal {
        operation: format!("render template {name}: {e}"),
    })?;
    Ok(Html(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_templates_compile() {
        let env = environment().unwrap();
        for name in ["home.html", "login.html", "signup.html", "dashboard.html"] {
            assert!(env.get_template(name).is_ok(), "{name} should be registered");
        }
    }

    #[test]
    fn test_flash_and_escaping() {
        let env = environment().unwrap();
        let Html(page) = render(
            &env,
            "login.html",
            context! { flash => "Invalid username or password", username => "<script>" },
        )
        .unwrap();

        assert!(page.contains("Invalid username or password"));
        assert!(!page.contains("value=\"<script>\""));
    }

    #[test]
    fn test_dashboard_cells() {
        let env = environment().unwrap();
        let Html(page) = render(
            &env,
            "dashboard.html",
            context! {
                username => "alice",
                today => "2024-01-15",
                cells => vec![
                    context! { date => "2024-01-14", score => 0 },
                    context! { date => "2024-01-15", score => 4 },
                ],
            },
        )
        .unwrap();

        assert!(page.contains("Welcome, alice!"));
        assert!(page.contains("title=\"2024-01-15: 4\""));
        assert!(page.contains("rgb(0, 100, 0)"));
    }

    #[test]
    fn test_unknown_template_is_internal_error() {
        let env = environment().unwrap();
        let err = render(&env, "missing.html", context! {}).unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));
    }
}
