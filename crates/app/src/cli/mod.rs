pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Get, Ls, Mkdir, Mv, Put, Rm, Url, Version, Versions};
