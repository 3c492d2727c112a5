pub mod user;

pub use user::{
    GroupCode, Includes, NewUser, StatusCode, Tracking, User, UserFilter, UserGroup, UserRecord,
    UserState,
};
