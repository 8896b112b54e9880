pub use self::handler::*;

mod handler;
