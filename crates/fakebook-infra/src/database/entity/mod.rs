//! SeaORM entities. Enum columns are stored as `smallint` codes.

pub mod file_upload;
pub mod post;
pub mod post_comment;
pub mod post_media;
pub mod profile;
pub mod reaction;
pub mod token;
pub mod user;
pub mod user_external;
