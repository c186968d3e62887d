pub mod end_point;
pub mod match_actor;
pub mod protocol;
pub mod registry;
pub mod session;
