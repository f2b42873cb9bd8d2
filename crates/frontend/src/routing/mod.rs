//! Routing: location fragments, route history and dispatch
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut router = Router::new(&config, Rc::new(BrowserLocation), Rc::new(BrowserStorage));
//! router.set_route(["Form", "Task", "TASK-0001"]);
//! // on hashchange:
//! let dispatch = router.route(&mut views)?;
//! ```

pub mod history;
pub mod location;
pub mod parser;
pub mod route;
pub mod router;
pub mod titles;

pub use location::{Location, MemoryLocation, SharedLocation};
pub use route::Route;
pub use router::{Dispatch, RouteArg, RouteTarget, Router};
pub use titles::TitleAction;
