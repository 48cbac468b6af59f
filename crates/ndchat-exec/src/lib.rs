pub mod attachments;
pub mod contracts;
pub mod coordinator;
pub mod error;
pub mod stream;
pub mod transport;

pub use contracts::*;
pub use coordinator::*;
pub use error::*;
pub use transport::*;
