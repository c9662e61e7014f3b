pub mod catalog;
pub mod comment_tree;
pub mod comments;
pub mod list_membership;
pub mod lists;

pub use comment_tree::build_comment_tree;
pub use comments::CommentService;
pub use list_membership::{reconcile, reconcile_with_action};
pub use lists::ListService;
