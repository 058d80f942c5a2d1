//! Repository layer
//!
//! Trait-based data access over the SQLite pool. Each repository pairs a
//! trait (the seam services depend on) with a `Sqlx*` implementation.

pub mod link;
pub mod memo;
pub mod post;
pub mod post_tag;
pub mod tag;
pub mod user;

pub use link::{LinkRepository, SqlxLinkRepository};
pub use memo::{MemoRepository, SqlxMemoRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use post_tag::{PostTagLink, PostTagRepository, SqlxPostTagRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{ProfileUpdate, SqlxUserRepository, UserRepository};
