use crate::domain::value_objects::Principal;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Feed,
    Search,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteState {
    pub view: View,
    pub viewed_identity: Option<Principal>,
    pub generation: u64,
}

/// Captured when a load starts; its result is applied only while the ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTicket {
    generation: u64,
}

/// 画面遷移の状態
///
/// Every transition bumps the route generation, which retires tickets taken
/// for the previous screen.
pub struct Router {
    state: watch::Sender<RouteState>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        let (state, _) = watch::channel(RouteState {
            view: View::Feed,
            viewed_identity: None,
            generation: 0,
        });
        Self { state }
    }

    pub fn current(&self) -> RouteState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RouteState> {
        self.state.subscribe()
    }

    pub fn ticket(&self) -> RouteTicket {
        RouteTicket {
            generation: self.state.borrow().generation,
        }
    }

    pub fn is_current(&self, ticket: RouteTicket) -> bool {
        self.state.borrow().generation == ticket.generation
    }

    pub fn select_feed(&self) -> RouteTicket {
        self.transition(View::Feed, None)
    }

    pub fn select_search(&self) -> RouteTicket {
        self.transition(View::Search, None)
    }

    pub fn select_profile(&self, user: &Principal) -> RouteTicket {
        self.transition(View::Profile, Some(user.clone()))
    }

    /// Does nothing while signed out.
    pub fn navigate_to_own_profile(&self, caller: Option<&Principal>) -> Option<RouteTicket> {
        caller.map(|caller| self.select_profile(caller))
    }

    fn transition(&self, view: View, viewed_identity: Option<Principal>) -> RouteTicket {
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.view = view;
            state.viewed_identity = viewed_identity;
            state.generation += 1;
            generation = state.generation;
        });
        debug!(view = ?view, generation, "route changed");
        RouteTicket { generation }
    }
}
