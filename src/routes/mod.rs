mod admin;
mod reviewer;
mod submissions;

pub use admin::*;
pub use reviewer::*;
pub use submissions::*;
