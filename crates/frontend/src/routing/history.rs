//! Route history: every completed navigation, plus the queue of visits
//! waiting to be persisted on the server.

use super::route::Route;
use contracts::system::route_history::{DeferredInsertRequest, RouteHistoryRecord};

#[derive(Debug, Default)]
pub struct RouteHistory {
    routes: Vec<Route>,
    queue: Vec<RouteHistoryRecord>,
    /// First segments never queued for persistence.
    skip: Vec<String>,
}

impl RouteHistory {
    pub fn new(skip: Vec<String>) -> Self {
        Self {
            skip,
            ..Default::default()
        }
    }

    pub fn push(&mut self, route: &Route) {
        self.routes.push(route.clone());
        let skipped = route
            .kind()
            .is_some_and(|kind| self.skip.iter().any(|s| s == kind));
        if route.is_empty() || skipped {
            return;
        }
        self.queue.push(RouteHistoryRecord {
            creation: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            route: route.to_route_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The route visited before the current one.
    pub fn prev_route(&self) -> Route {
        match self.routes.len() {
            n if n >= 2 => self.routes[n - 2].clone(),
            _ => Route::default(),
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Drain the persistence queue into one request.
    pub fn take_batch(&mut self) -> Option<DeferredInsertRequest> {
        if self.queue.is_empty() {
            return None;
        }
        Some(DeferredInsertRequest {
            routes: std::mem::take(&mut self.queue),
        })
    }

    /// Put a failed batch back in front of anything queued since.
    pub fn requeue(&mut self, batch: DeferredInsertRequest) {
        let newer = std::mem::replace(&mut self.queue, batch.routes);
        self.queue.extend(newer);
    }
}
