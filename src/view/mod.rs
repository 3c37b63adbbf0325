mod pipeline;

pub use pipeline::{build_view, filter_users, paginate, sort_users, PageView, SortOption};
