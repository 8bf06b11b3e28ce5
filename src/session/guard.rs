use crate::session::{SessionState, View};

/// Outcome of gating a view on the session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Session still being resolved; show a placeholder.
    Pending,
    Redirect(View),
    Render(View),
}

/// Decides whether `requested` may be shown for `state`.
///
/// Unprotected views always render.
pub fn admit(state: &SessionState, requested: View) -> Admission {
    if !requested.is_protected() {
        return Admission::Render(requested);
    }

    match state {
        SessionState::Loading => Admission::Pending,
        SessionState::Anonymous => Admission::Redirect(View::Login),
        SessionState::Authenticated(_) => Admission::Render(requested),
    }
}
