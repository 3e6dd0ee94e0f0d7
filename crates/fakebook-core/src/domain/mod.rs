//! Domain entities - the core business objects.

mod comment;
mod profile;
mod reaction;
mod token;
mod upload;
mod user;

mod post;

pub use comment::PostComment;
pub use post::{MediaType, Post, PostMedia, PostVisibility};
pub use profile::Profile;
pub use reaction::{Reaction, ReactionTarget, ReactionToggle, ReactionType, ToggleOutcome};
pub use token::{AccessToken, ExternalProvider, UserExternal};
pub use upload::FileUpload;
pub use user::{Gender, User};
