use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::User;

/// Sort modes offered by the table's filter dropdown.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    #[default]
    None,
    Alphabetical,
    DateAdded,
    Admin,
}

impl SortOption {
    /// Query-string token for the mode, used when regenerating panel links.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::None => "none",
            SortOption::Alphabetical => "alphabetical",
            SortOption::DateAdded => "dateAdded",
            SortOption::Admin => "admin",
        }
    }

    /// Label shown on the filter button.
    pub fn label(&self) -> &'static str {
        match self {
            SortOption::None => "Filters",
            SortOption::Alphabetical => "A-Z",
            SortOption::DateAdded => "Recent first",
            SortOption::Admin => "Admins first",
        }
    }
}

/// The slice of records the table renders, plus the pagination totals.
#[derive(Debug, Clone)]
pub struct PageView {
    pub users: Vec<User>,
    pub total_count: usize,
    pub total_pages: usize,
    pub page: usize,
}

/// Derive the visible table contents from a full store snapshot. Stages run
/// in fixed order (filter, sort, paginate) and the whole pipeline recomputes
/// from scratch on every call.
pub fn build_view(
    snapshot: Vec<User>,
    query: &str,
    sort: SortOption,
    page: usize,
    page_size: usize,
) -> PageView {
    let filtered = sort_users(filter_users(snapshot, query), sort);
    let total_count = filtered.len();
    let total_pages = total_count.div_ceil(page_size);
    let users = paginate(&filtered, page, page_size);

    PageView {
        users,
        total_count,
        total_pages,
        page,
    }
}

/// Keep records whose name or email contains the query, case-insensitively.
/// An empty query matches everything. The query is not trimmed.
pub fn filter_users(users: Vec<User>, query: &str) -> Vec<User> {
    if query.is_empty() {
        return users;
    }
    let query = query.to_lowercase();
    users
        .into_iter()
        .filter(|user| {
            user.name.to_lowercase().contains(&query)
                || user.email.to_lowercase().contains(&query)
        })
        .collect()
}

/// Reorder records for the requested sort mode. All sorts are stable, so
/// ties keep their relative order from the previous stage.
pub fn sort_users(mut users: Vec<User>, sort: SortOption) -> Vec<User> {
    match sort {
        SortOption::None => {}
        SortOption::Alphabetical => {
            users.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }
        SortOption::DateAdded => {
            // Most recent first
            users.sort_by(|a, b| {
                parse_display_date(&b.date_added).cmp(&parse_display_date(&a.date_added))
            });
        }
        SortOption::Admin => {
            // Administrators first
            users.sort_by(|a, b| b.is_admin.cmp(&a.is_admin));
        }
    }
    users
}

/// One page of the sequence, 1-based. Out-of-range pages yield an empty or
/// partial slice; callers keep their page number inside the valid range.
pub fn paginate(users: &[User], page: usize, page_size: usize) -> Vec<User> {
    users
        .iter()
        .skip(page.saturating_sub(1) * page_size)
        .take(page_size)
        .cloned()
        .collect()
}

/// Parse a display date like "Mar 4, 2024" or "July 4, 2022". Unparseable
/// values sort as the oldest possible date rather than erroring.
fn parse_display_date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%b %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%B %d, %Y"))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str, email: &str, date_added: &str, is_admin: bool) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            avatar: String::new(),
            is_admin,
            can_export_data: false,
            can_import_data: false,
            last_active: date_added.to_string(),
            date_added: date_added.to_string(),
        }
    }

    fn names(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn test_filter_matches_name_or_email_case_insensitively() {
        let users = vec![
            user("1", "Alice", "alice@example.com", "Jan 1, 2023", false),
            user("2", "Bob", "bob@other.com", "Jan 2, 2023", false),
            user("3", "Carol", "carol@example.com", "Jan 3, 2023", false),
        ];

        let by_name = filter_users(users.clone(), "ALI");
        assert_eq!(names(&by_name), vec!["Alice"]);

        let by_email = filter_users(users.clone(), "other.com");
        assert_eq!(names(&by_email), vec!["Bob"]);

        let all = filter_users(users.clone(), "");
        assert_eq!(all.len(), 3);

        let none = filter_users(users, "zz");
        assert!(none.is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let users = vec![
            user("1", "Alice", "alice@example.com", "Jan 1, 2023", false),
            user("2", "Bob", "bob@example.com", "Jan 2, 2023", false),
        ];

        let once = filter_users(users, "example");
        let twice = filter_users(once.clone(), "example");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_alphabetical_ignores_case_and_is_idempotent() {
        let users = vec![
            user("1", "bob", "bob@example.com", "Jan 1, 2023", false),
            user("2", "Alice", "alice@example.com", "Jan 2, 2023", false),
            user("3", "carol", "carol@example.com", "Jan 3, 2023", false),
        ];

        let once = sort_users(users, SortOption::Alphabetical);
        assert_eq!(names(&once), vec!["Alice", "bob", "carol"]);

        let twice = sort_users(once.clone(), SortOption::Alphabetical);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_date_added_is_descending() {
        let users = vec![
            user("1", "Old", "old@example.com", "Jan 1, 2023", false),
            user("2", "New", "new@example.com", "Jun 1, 2024", false),
            user("3", "Mid", "mid@example.com", "Dec 25, 2023", false),
        ];

        let sorted = sort_users(users, SortOption::DateAdded);
        assert_eq!(names(&sorted), vec!["New", "Mid", "Old"]);

        let dates: Vec<_> = sorted
            .iter()
            .map(|u| parse_display_date(&u.date_added))
            .collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_sort_date_added_accepts_both_month_spellings() {
        let users = vec![
            user("1", "Abbrev", "a@example.com", "Mar 4, 2024", false),
            user("2", "Full", "b@example.com", "July 4, 2022", false),
        ];

        let sorted = sort_users(users, SortOption::DateAdded);
        assert_eq!(names(&sorted), vec!["Abbrev", "Full"]);
    }

    #[test]
    fn test_sort_date_added_puts_unparseable_dates_last() {
        let users = vec![
            user("1", "Broken", "broken@example.com", "not a date", false),
            user("2", "Valid", "valid@example.com", "Jan 1, 2023", false),
        ];

        let sorted = sort_users(users, SortOption::DateAdded);
        assert_eq!(names(&sorted), vec!["Valid", "Broken"]);
    }

    #[test]
    fn test_sort_admin_first_is_stable_within_groups() {
        let users = vec![
            user("1", "Alice", "alice@example.com", "Jan 1, 2023", false),
            user("2", "Bob", "bob@example.com", "Jan 2, 2023", true),
            user("3", "Carol", "carol@example.com", "Jan 3, 2023", false),
            user("4", "Dave", "dave@example.com", "Jan 4, 2023", true),
        ];

        let sorted = sort_users(users, SortOption::Admin);
        assert_eq!(names(&sorted), vec!["Bob", "Dave", "Alice", "Carol"]);
    }

    #[test]
    fn test_sort_none_preserves_insertion_order() {
        let users = vec![
            user("1", "Carol", "carol@example.com", "Jan 3, 2023", false),
            user("2", "Alice", "alice@example.com", "Jan 1, 2023", true),
        ];

        let sorted = sort_users(users.clone(), SortOption::None);
        assert_eq!(sorted, users);
    }

    #[test]
    fn test_pagination_covers_sequence_exactly_once() {
        let users: Vec<User> = (1..=20)
            .map(|i| {
                user(
                    &i.to_string(),
                    &format!("User {:02}", i),
                    &format!("u{}@example.com", i),
                    "Jan 1, 2023",
                    false,
                )
            })
            .collect();

        let view = build_view(users.clone(), "", SortOption::None, 1, 8);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.total_count, 20);

        let mut seen = Vec::new();
        for page in 1..=view.total_pages {
            seen.extend(paginate(&users, page, 8));
        }
        assert_eq!(seen, users);
    }

    #[test]
    fn test_pagination_splits_nine_records_into_eight_and_one() {
        let users: Vec<User> = (1..=9)
            .map(|i| {
                user(
                    &i.to_string(),
                    &format!("User {}", i),
                    &format!("u{}@example.com", i),
                    "Jan 1, 2023",
                    false,
                )
            })
            .collect();

        let view = build_view(users.clone(), "", SortOption::None, 1, 8);
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.users.len(), 8);

        let second = build_view(users, "", SortOption::None, 2, 8);
        assert_eq!(second.users.len(), 1);
        assert_eq!(second.users[0].name, "User 9");
    }

    #[test]
    fn test_pagination_out_of_range_page_is_empty() {
        let users = vec![user("1", "Alice", "alice@example.com", "Jan 1, 2023", false)];

        let view = build_view(users, "", SortOption::None, 5, 8);
        assert!(view.users.is_empty());
        assert_eq!(view.total_pages, 1);
    }

    #[test]
    fn test_empty_snapshot_has_zero_pages() {
        let view = build_view(Vec::new(), "", SortOption::None, 1, 8);
        assert!(view.users.is_empty());
        assert_eq!(view.total_pages, 0);
        assert_eq!(view.total_count, 0);
    }

    #[test]
    fn test_admin_sort_and_query_scenario() {
        let users = vec![
            user("1", "Alice", "alice@example.com", "Jan 1, 2023", false),
            user("2", "bob", "bob@example.com", "Jun 1, 2024", true),
        ];

        let admin_first = build_view(users.clone(), "", SortOption::Admin, 1, 8);
        assert_eq!(names(&admin_first.users), vec!["bob", "Alice"]);

        let by_query = build_view(users.clone(), "ali", SortOption::None, 1, 8);
        assert_eq!(names(&by_query.users), vec!["Alice"]);

        let no_match = build_view(users, "zz", SortOption::None, 1, 8);
        assert!(no_match.users.is_empty());
        assert_eq!(no_match.total_pages, 0);
    }
}
