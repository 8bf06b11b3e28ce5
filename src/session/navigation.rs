use std::fmt;

use crate::{info, warning};

/// Destinations of the client. Protected ones require a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Landing,
    Login,
    Register,
    Dashboard,
    Urls,
    Analytics,
    Profile,
}

impl View {
    pub fn path(self) -> &'static str {
        match self {
            View::Landing => "/",
            View::Login => "/login",
            View::Register => "/register",
            View::Dashboard => "/dashboard",
            View::Urls => "/urls",
            View::Analytics => "/analytics",
            View::Profile => "/profile",
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(
            self,
            View::Dashboard | View::Urls | View::Analytics | View::Profile
        )
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Receives forced navigations (logout, failed refresh, guard redirects).
pub trait Navigator: Send + Sync {
    fn navigate(&self, view: View);
}

/// Navigator for the terminal: tells the user which command to run next.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, view: View) {
        tracing::debug!(view = %view, "navigate");
        match view {
            View::Login => warning!("You are not signed in. Run `trimify login` to continue."),
            View::Register => info!("Create an account with `trimify register`."),
            View::Landing => info!("Signed out."),
            other => info!("Continue at {}", other),
        }
    }
}
