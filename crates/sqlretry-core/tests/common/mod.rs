pub mod sqlite_lock;
