pub mod prelude;

pub mod user_groups;
pub mod user_states;
pub mod users;
