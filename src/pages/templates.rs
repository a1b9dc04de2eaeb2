use askama::Template;

use crate::activity::calculator::Activity;
use crate::auth::{claims::Role, extractors::Session};
use crate::news::Article;

/// What the navigation bar needs to know about the current session.
pub struct Viewer {
    pub name: String,
    pub avatar: Option<String>,
    pub is_guest: bool,
    pub is_admin: bool,
}

impl Viewer {
    pub fn from_session(session: &Session) -> Option<Viewer> {
        let Session::Authenticated(claims) = session else {
            return None;
        };
        let (name, avatar) = match (&claims.user, claims.role) {
            (Some(identity), _) => (identity.name.clone(), Some(identity.avatar.clone())),
            (None, Role::Admin) => ("Admin".to_string(), None),
            (None, _) => ("Guest".to_string(), None),
        };
        Some(Viewer {
            name,
            avatar,
            is_guest: claims.role == Role::Guest,
            is_admin: claims.role == Role::Admin,
        })
    }
}

pub struct FactorRow {
    pub label: &'static str,
    pub factor: f64,
}

pub struct DashboardRow {
    pub activity: &'static str,
    pub total_amount: String,
    pub total_carbon_emission: String,
}

pub struct HistoryRow {
    pub date: String,
    pub activity: String,
    pub amount: String,
    pub carbon_emission: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: &'static str,
    pub viewer: Option<Viewer>,
    pub activities: Vec<&'static str>,
}

impl IndexTemplate {
    pub fn new(viewer: Option<Viewer>) -> Self {
        Self {
            title: "EcoTrack - Carbon Footprint Tracker",
            viewer,
            activities: Activity::ALL.iter().map(|a| a.label()).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub title: &'static str,
    pub viewer: Option<Viewer>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub title: &'static str,
    pub viewer: Option<Viewer>,
}

#[derive(Template)]
#[template(path = "admin_login.html")]
pub struct AdminLoginTemplate {
    pub title: &'static str,
    pub viewer: Option<Viewer>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub title: &'static str,
    pub viewer: Option<Viewer>,
    pub total_users: i64,
    pub rows: Vec<DashboardRow>,
    pub total_carbon_emission: String,
}

#[derive(Template)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    pub title: &'static str,
    pub viewer: Option<Viewer>,
    pub rows: Vec<HistoryRow>,
}

#[derive(Template)]
#[template(path = "news.html")]
pub struct NewsTemplate {
    pub title: &'static str,
    pub viewer: Option<Viewer>,
    pub articles: Vec<Article>,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub title: &'static str,
    pub viewer: Option<Viewer>,
    pub factors: Vec<FactorRow>,
}

#[derive(Template)]
#[template(path = "access_denied.html")]
pub struct AccessDeniedTemplate {
    pub title: &'static str,
    pub viewer: Option<Viewer>,
}

#[derive(Template)]
#[template(path = "error_404.html")]
pub struct NotFoundTemplate {
    pub title: &'static str,
    pub viewer: Option<Viewer>,
}

#[derive(Template)]
#[template(path = "error_500.html")]
pub struct ServerErrorTemplate {
    pub title: &'static str,
    pub viewer: Option<Viewer>,
}

/// Two decimals, the precision the pages show amounts, emissions and totals with.
pub fn two_places(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_lists_every_activity() {
        let html = IndexTemplate::new(None).render().unwrap();
        for a in Activity::ALL {
            assert!(html.contains(&format!(r#"value="{}""#, a.label())));
        }
        assert!(html.contains("carbonForm"));
        assert!(html.contains("Log in"));
    }

    #[test]
    fn guest_nav_hides_history() {
        let viewer = Viewer {
            name: "Guest".into(),
            avatar: None,
            is_guest: true,
            is_admin: false,
        };
        let html = IndexTemplate::new(Some(viewer)).render().unwrap();
        assert!(!html.contains(r#"href="/history""#));
        assert!(html.contains("Log out"));
    }

    #[test]
    fn history_escapes_user_text() {
        let html = HistoryTemplate {
            title: "History - EcoTrack",
            viewer: None,
            rows: vec![HistoryRow {
                date: "2024-05-01".into(),
                activity: "<script>".into(),
                amount: "1".into(),
                carbon_emission: two_places(0.0),
            }],
        }
        .render()
        .unwrap();
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn two_places_rounds_to_cents() {
        assert_eq!(two_places(21.0), "21.00");
        assert_eq!(two_places(0.527 * 3.0), "1.58");
    }
}
