pub mod route_history;
