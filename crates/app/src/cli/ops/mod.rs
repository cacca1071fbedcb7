pub mod get;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod put;
pub mod rm;
pub mod url;
pub mod version;
pub mod versions;

pub use get::Get;
pub use ls::Ls;
pub use mkdir::Mkdir;
pub use mv::Mv;
pub use put::Put;
pub use rm::Rm;
pub use url::Url;
pub use version::Version;
pub use versions::Versions;
