pub mod store;
pub mod subscription;
pub mod traits;
pub mod watch;

pub use store::*;
pub use subscription::Subscription;
pub use traits::*;
pub use watch::*;
