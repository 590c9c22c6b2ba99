pub mod error;
pub mod openrouter;
pub mod traits;
pub mod util;

pub use error::{AiError, Result};
pub use openrouter::OpenRouter;
pub use traits::{ChatModel, Message, MessageRole};
