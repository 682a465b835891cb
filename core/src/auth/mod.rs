pub mod guard;
pub mod password;
pub mod session;

pub use guard::{authorize, require_owner, Decision};
pub use session::{SessionError, SessionSigner};
