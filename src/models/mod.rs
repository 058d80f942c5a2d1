//! Data models
//!
//! Entities, input types and query/pagination types shared by the
//! repository and service layers.

pub mod link;
pub mod memo;
pub mod post;
pub mod tag;
pub mod user;

pub use link::{Link, LinkInput};
pub use memo::{Memo, MemoInput, MemoStats};
pub use post::{
    AdjacentDirection, CreatePostInput, PageResult, Post, PostDetail, PostNav, PostQuery,
    PostSummary, PublishStatus, UpdatePostInput,
};
pub use tag::{Tag, TagRef, TagWithCount};
pub use user::{Session, User};
