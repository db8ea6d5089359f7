pub mod blacklisted_token;
pub mod project;
pub mod refresh_token;
pub mod task;
pub mod user;

pub use blacklisted_token::BlacklistedToken;
pub use project::{Project, ProjectInput};
pub use refresh_token::RefreshToken;
pub use task::{Task, TaskInput, TaskPriority, TaskQuery, TaskStatus};
pub use user::{Credentials, User};
