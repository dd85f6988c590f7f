use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::TaskFilter;
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::models::task::{TaskRow, TASK_COLUMNS};
use crate::models::{timestamp, Task};

/// Null due dates last, earliest due first, higher priority first, then id.
const ORDER_BY: &str = " ORDER BY CASE WHEN due_at IS NULL THEN 1 ELSE 0 END, \
     due_at ASC, priority DESC, id ASC";

/// Read query for one owner's task list
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    owner_external_id: String,
    filter: TaskFilter,
    search: Option<String>,
    today: Option<NaiveDate>,
}

impl TaskQuery {
    pub fn for_owner(owner_external_id: impl Into<String>) -> Self {
        Self {
            owner_external_id: owner_external_id.into(),
            filter: TaskFilter::All,
            search: None,
            today: None,
        }
    }

    pub fn filter(mut self, filter: TaskFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Free-text search over title, description and the raw tag string.
    /// Blank text disables the search; otherwise the text is matched as given,
    /// surrounding spaces included.
    pub fn search(mut self, text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        self.search = (!text.trim().is_empty()).then(|| text.to_string());
        self
    }

    /// Calendar date the `today` filter compares against. Defaults to the
    /// system clock's local date.
    pub fn today(mut self, date: NaiveDate) -> Self {
        self.today = Some(date);
        self
    }

    pub fn owner_external_id(&self) -> &str {
        &self.owner_external_id
    }

    pub fn current_filter(&self) -> TaskFilter {
        self.filter
    }

    /// Assemble the statement with every user value bound.
    pub fn to_query_builder(&self) -> QueryBuilder<'static, Sqlite> {
        let mut builder: QueryBuilder<'static, Sqlite> =
            QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_external_id = "));
        builder.push_bind(self.owner_external_id.clone());

        match self.filter {
            TaskFilter::All => {}
            TaskFilter::Active => {
                builder.push(" AND completed = 0");
            }
            TaskFilter::Completed => {
                builder.push(" AND completed = 1");
            }
            TaskFilter::Today => {
                let today = self.today.unwrap_or_else(|| SystemClock.today());
                builder.push(" AND due_at IS NOT NULL AND date(due_at) = ");
                builder.push_bind(timestamp::format_date(&today));
            }
        }

        if let Some(text) = &self.search {
            // % and _ inside `text` keep their LIKE meaning
            let pattern = format!("%{text}%");
            builder.push(" AND (title LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR tags LIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        builder.push(ORDER_BY);
        builder
    }

    /// SQL text of the statement, for logging and tests
    pub fn build_sql(&self) -> String {
        self.to_query_builder().into_sql()
    }

    pub async fn fetch_all(&self, pool: &SqlitePool) -> Result<Vec<Task>> {
        let mut builder = self.to_query_builder();
        let rows = builder
            .build_query_as::<TaskRow>()
            .fetch_all(pool)
            .await?;

        tracing::debug!(
            owner = %self.owner_external_id,
            filter = %self.filter,
            search = self.search.as_deref().unwrap_or(""),
            count = rows.len(),
            "Fetched task list"
        );

        rows.into_iter().map(Task::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, Tags};
    use crate::test_utils::{at, test_pool};

    #[test]
    fn test_sql_for_each_filter() {
        let base = TaskQuery::for_owner("1");
        assert!(!base.build_sql().contains("completed ="));
        assert!(base
            .clone()
            .filter(TaskFilter::Active)
            .build_sql()
            .contains("AND completed = 0"));
        assert!(base
            .clone()
            .filter(TaskFilter::Completed)
            .build_sql()
            .contains("AND completed = 1"));
        assert!(base
            .filter(TaskFilter::Today)
            .build_sql()
            .contains("date(due_at) = ?"));
    }

    #[test]
    fn test_user_values_are_never_inlined() {
        let sql = TaskQuery::for_owner("x' OR 1=1 --")
            .search("'; DROP TABLE tasks; --")
            .build_sql();
        assert!(!sql.contains("DROP"));
        assert!(!sql.contains("1=1"));
        assert!(sql.contains("(title LIKE ? OR description LIKE ? OR tags LIKE ?)"));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let sql = TaskQuery::for_owner("1").search("   ").build_sql();
        assert!(!sql.contains("LIKE"));
    }

    #[tokio::test]
    async fn test_filters_and_owner_scope() {
        let pool = test_pool().await;
        let now = at("2026-10-18 09:00:00");

        let open = Task::create(&pool, NewTask::new("1", "open").unwrap(), now).await.unwrap();
        let done = Task::create(&pool, NewTask::new("1", "done").unwrap(), now).await.unwrap();
        Task::create(&pool, NewTask::new("2", "someone else").unwrap(), now)
            .await
            .unwrap();
        sqlx::query("UPDATE tasks SET completed = 1 WHERE id = ?")
            .bind(done.id)
            .execute(&pool)
            .await
            .unwrap();

        let all = TaskQuery::for_owner("1").fetch_all(&pool).await.unwrap();
        assert_eq!(all.len(), 2);

        let active = TaskQuery::for_owner("1")
            .filter(TaskFilter::Active)
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(active.iter().map(|t| t.id).collect::<Vec<_>>(), vec![open.id]);

        let completed = TaskQuery::for_owner("1")
            .filter(TaskFilter::Completed)
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(completed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![done.id]);
    }

    #[tokio::test]
    async fn test_today_uses_supplied_date() {
        let pool = test_pool().await;
        let now = at("2026-10-18 09:00:00");

        let due_today = NewTask::new("1", "today")
            .unwrap()
            .with_due_at(Some(at("2026-10-18 23:30:00")));
        let due_tomorrow = NewTask::new("1", "tomorrow")
            .unwrap()
            .with_due_at(Some(at("2026-10-19 00:00:00")));
        let today = Task::create(&pool, due_today, now).await.unwrap();
        Task::create(&pool, due_tomorrow, now).await.unwrap();
        Task::create(&pool, NewTask::new("1", "undated").unwrap(), now)
            .await
            .unwrap();

        let found = TaskQuery::for_owner("1")
            .filter(TaskFilter::Today)
            .today(now.date())
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(found, vec![today]);
    }

    #[tokio::test]
    async fn test_search_matches_title_description_and_tags() {
        let pool = test_pool().await;
        let now = at("2026-10-18 09:00:00");

        let by_title = NewTask::new("1", "Buy MILK").unwrap();
        let by_description = NewTask::new("1", "errand")
            .unwrap()
            .with_description("remember the milk");
        let by_tag = NewTask::new("1", "shopping")
            .unwrap()
            .with_tags(Tags::from_values(["milkman"]).unwrap());
        let unrelated = NewTask::new("1", "call mom").unwrap();
        for task in [by_title, by_description, by_tag, unrelated] {
            Task::create(&pool, task, now).await.unwrap();
        }

        let found = TaskQuery::for_owner("1")
            .search("milk")
            .fetch_all(&pool)
            .await
            .unwrap();
        let mut titles: Vec<_> = found.into_iter().map(|t| t.title).collect();
        titles.sort();
        assert_eq!(titles, vec!["Buy MILK", "errand", "shopping"]);
    }

    async fn titles_matching(pool: &SqlitePool, owner: &str, text: &str) -> Vec<String> {
        let mut titles: Vec<_> = TaskQuery::for_owner(owner)
            .search(text)
            .fetch_all(pool)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        titles.sort();
        titles
    }

    #[tokio::test]
    async fn test_search_wildcards_are_not_escaped() {
        let pool = test_pool().await;
        let now = at("2026-10-18 09:00:00");
        for (owner, title) in [("1", "abc"), ("1", "a-c"), ("1", "xyz"), ("2", "abc too")] {
            Task::create(&pool, NewTask::new(owner, title).unwrap(), now)
                .await
                .unwrap();
        }

        assert_eq!(titles_matching(&pool, "1", "%").await, vec!["a-c", "abc", "xyz"]);
        assert_eq!(titles_matching(&pool, "1", "a_c").await, vec!["a-c", "abc"]);
    }

    #[tokio::test]
    async fn test_search_text_keeps_surrounding_spaces() {
        let pool = test_pool().await;
        let now = at("2026-10-18 09:00:00");
        for title in ["a milk run", "Buy milk", "milkshake"] {
            Task::create(&pool, NewTask::new("1", title).unwrap(), now)
                .await
                .unwrap();
        }

        assert_eq!(titles_matching(&pool, "1", " milk ").await, vec!["a milk run"]);
        assert_eq!(titles_matching(&pool, "1", "milk").await.len(), 3);
    }

    #[tokio::test]
    async fn test_sort_order() {
        let pool = test_pool().await;
        let now = at("2026-10-18 09:00:00");

        let specs = [
            ("undated low", None, 0),
            ("late", Some("2026-10-20 10:00:00"), 5),
            ("early low", Some("2026-10-19 10:00:00"), 1),
            ("early high", Some("2026-10-19 10:00:00"), 3),
            ("undated high", None, 9),
        ];
        for (title, due, priority) in specs {
            let task = NewTask::new("1", title)
                .unwrap()
                .with_priority(priority)
                .with_due_at(due.map(at));
            Task::create(&pool, task, now).await.unwrap();
        }

        let titles: Vec<_> = TaskQuery::for_owner("1")
            .fetch_all(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(
            titles,
            vec!["early high", "early low", "late", "undated high", "undated low"]
        );
    }
}
