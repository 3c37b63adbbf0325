mod storage;
mod user_store;

pub use storage::{RedisStorage, Storage};
pub use user_store::{UserStore, NEXT_ID_KEY, USERS_KEY};
