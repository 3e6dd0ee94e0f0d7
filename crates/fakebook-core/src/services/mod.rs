//! Application services.
//!
//! Each service owns the rules of one area and reaches infrastructure only
//! through the traits in [`crate::ports`].

mod auth;
mod comments;
mod feed;
mod posts;
mod profiles;
mod reactions;
mod uploads;
mod users;

pub use auth::{AuthService, ExternalLogin, RegisterUser, Session};
pub use comments::CommentService;
pub use feed::FeedAssembler;
pub use posts::{NewMedia, NewPost, PostChanges, PostService};
pub use profiles::{ACTIVE_PROFILE_COOKIE, MAX_PROFILE_NAME_LEN, ProfileService};
pub use reactions::ReactionService;
pub use uploads::{IncomingFile, MAX_UPLOAD_BYTES, UploadArea, UploadService};
pub use users::{UserChanges, UserService};

/// Mask an email address for logging: `jane@example.com` becomes `j***@example.com`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().unwrap_or('*');
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("jane@example.com"), "j***@example.com");
        assert_eq!(mask_email("@example.com"), "****@example.com");
        assert_eq!(mask_email("nope"), "***");
    }
}
