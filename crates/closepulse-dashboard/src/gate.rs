//! Render gating and post-transition navigation
//!
//! [`ViewGate`] checks `mounted` before it looks at the session. Until the
//! environment is mounted nothing is rendered, whatever the session says,
//! so an undetermined session never triggers a redirect.

use closepulse_core::config::RouteConfig;
use closepulse_core::{SessionSnapshot, SessionState};
use std::time::Duration;
use tracing::debug;

/// What the dashboard surface should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Render nothing
    Blank,
    /// Show a loading indicator
    Loading,
    /// Navigate to the route and render nothing further
    Redirect(String),
    /// Render the dashboard
    Dashboard,
}

impl GateDecision {
    /// Whether the dashboard is rendered
    pub const fn renders_dashboard(&self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

/// Decides whether the dashboard renders, redirects or waits
#[derive(Debug, Clone)]
pub struct ViewGate {
    mounted: bool,
    entry_route: String,
}

impl ViewGate {
    /// Unmounted gate redirecting anonymous users to `entry_route`
    pub fn new(entry_route: impl Into<String>) -> Self {
        Self {
            mounted: false,
            entry_route: entry_route.into(),
        }
    }

    /// Gate using the configured entry route
    pub fn from_routes(routes: &RouteConfig) -> Self {
        Self::new(routes.entry.clone())
    }

    /// Signal that the rendering environment is ready
    pub fn mount(&mut self) {
        self.mounted = true;
    }

    /// Whether [`ViewGate::mount`] has been called
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Decision for the current session
    pub fn decide(&self, snapshot: &SessionSnapshot) -> GateDecision {
        let decision = if !self.mounted {
            GateDecision::Blank
        } else {
            match snapshot.state {
                SessionState::Unknown | SessionState::Loading => GateDecision::Loading,
                SessionState::Anonymous => GateDecision::Redirect(self.entry_route.clone()),
                SessionState::Authenticated if snapshot.session.is_some() => {
                    GateDecision::Dashboard
                }
                // Authenticated without identity cannot be published; treat as undetermined
                SessionState::Authenticated => GateDecision::Loading,
            }
        };
        debug!(mounted = self.mounted, state = %snapshot.state, ?decision, "Gate decision");
        decision
    }
}

/// Navigation collaborator driven by the surrounding UI
pub trait Navigator: Send + Sync {
    /// Move to `route`
    fn navigate(&self, route: &str);
}

/// Where to go after a session transition, and how long to wait first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPlan {
    /// Target route
    pub route: String,
    /// Pause before navigating
    pub delay: Duration,
}

impl NavigationPlan {
    /// Plan for a transition from `previous` to `next`
    ///
    /// A login lands on the dashboard after the configured redirect delay and
    /// a logout returns to the entry route at once. Restore completion yields
    /// no plan; the gate handles it.
    pub fn after_transition(
        previous: SessionState,
        next: SessionState,
        routes: &RouteConfig,
    ) -> Option<Self> {
        match (previous, next) {
            (SessionState::Unknown | SessionState::Anonymous, SessionState::Authenticated) => {
                Some(Self {
                    route: routes.dashboard.clone(),
                    delay: Duration::from_millis(routes.redirect_delay_ms),
                })
            }
            (SessionState::Authenticated, SessionState::Anonymous) => Some(Self {
                route: routes.entry.clone(),
                delay: Duration::ZERO,
            }),
            _ => None,
        }
    }

    /// Wait out the delay, then navigate
    pub async fn follow(&self, navigator: &dyn Navigator) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        navigator.navigate(&self.route);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use closepulse_core::Session;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn snapshot(state: SessionState) -> SessionSnapshot {
        let session = (state == SessionState::Authenticated).then(|| Session {
            id: "user-1".to_string(),
            email: "demo@closepulse.com".to_string(),
            name: "Demo User".to_string(),
        });
        SessionSnapshot { session, state }
    }

    #[rstest]
    #[case(SessionState::Unknown)]
    #[case(SessionState::Loading)]
    #[case(SessionState::Anonymous)]
    #[case(SessionState::Authenticated)]
    fn test_unmounted_renders_nothing(#[case] state: SessionState) {
        let gate = ViewGate::new("/");
        assert_eq!(gate.decide(&snapshot(state)), GateDecision::Blank);
    }

    #[rstest]
    #[case(SessionState::Unknown, GateDecision::Loading)]
    #[case(SessionState::Loading, GateDecision::Loading)]
    #[case(SessionState::Anonymous, GateDecision::Redirect("/".to_string()))]
    #[case(SessionState::Authenticated, GateDecision::Dashboard)]
    fn test_mounted_decisions(#[case] state: SessionState, #[case] expected: GateDecision) {
        let mut gate = ViewGate::from_routes(&RouteConfig::default());
        gate.mount();
        assert!(gate.is_mounted());
        assert_eq!(gate.decide(&snapshot(state)), expected);
    }

    #[test]
    fn test_authenticated_without_identity_does_not_render() {
        let mut gate = ViewGate::new("/");
        gate.mount();
        let hollow = SessionSnapshot {
            session: None,
            state: SessionState::Authenticated,
        };
        assert!(!gate.decide(&hollow).renders_dashboard());
    }

    #[rstest]
    #[case(SessionState::Anonymous, SessionState::Authenticated, Some(("/dashboard", 1500)))]
    #[case(SessionState::Unknown, SessionState::Authenticated, Some(("/dashboard", 1500)))]
    #[case(SessionState::Authenticated, SessionState::Anonymous, Some(("/", 0)))]
    #[case(SessionState::Loading, SessionState::Authenticated, None)]
    #[case(SessionState::Loading, SessionState::Anonymous, None)]
    #[case(SessionState::Anonymous, SessionState::Anonymous, None)]
    #[case(SessionState::Unknown, SessionState::Loading, None)]
    fn test_navigation_plan(
        #[case] previous: SessionState,
        #[case] next: SessionState,
        #[case] expected: Option<(&str, u64)>,
    ) {
        let plan = NavigationPlan::after_transition(previous, next, &RouteConfig::default());
        let expected = expected.map(|(route, ms)| NavigationPlan {
            route: route.to_string(),
            delay: Duration::from_millis(ms),
        });
        assert_eq!(plan, expected);
    }

    #[derive(Default)]
    struct Recorder(parking_lot::Mutex<Vec<String>>);

    impl Navigator for Recorder {
        fn navigate(&self, route: &str) {
            self.0.lock().push(route.to_string());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_waits_then_navigates() {
        let recorder = Recorder::default();
        let plan = NavigationPlan {
            route: "/dashboard".to_string(),
            delay: Duration::from_millis(1500),
        };
        let started = tokio::time::Instant::now();

        plan.follow(&recorder).await;

        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert_eq!(*recorder.0.lock(), vec!["/dashboard".to_string()]);
    }
}
