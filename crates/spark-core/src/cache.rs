use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::CoreError;
use crate::models::Task;
use crate::notify::{ChangeNotifier, Subscription, Table};
use crate::repository::TaskRepository;

#[derive(Debug, Default)]
struct CacheState {
    tasks: Vec<Task>,
    stale: bool,
    /// Bumped on every invalidation so a fetch that raced with a change does
    /// not mark the cache fresh.
    generation: u64,
}

/// The last fetched task list, re-fetched in full after any change.
#[derive(Debug, Clone)]
pub struct TaskCache {
    state: Arc<Mutex<CacheState>>,
}

impl Default for TaskCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskCache {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                stale: true,
                ..Default::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.stale = true;
        state.generation += 1;
    }

    pub fn is_stale(&self) -> bool {
        self.lock().stale
    }

    /// Marks the cache stale whenever tasks or their subtasks change. Delivery
    /// stops once the returned subscriptions are dropped.
    pub fn watch(&self, notifier: &ChangeNotifier) -> Vec<Subscription> {
        [Table::Tasks, Table::Subtasks]
            .into_iter()
            .map(|table| {
                let cache = self.clone();
                notifier.subscribe(table, move |_| cache.invalidate())
            })
            .collect()
    }

    /// Returns the cached tasks, fetching them first if the cache is stale.
    pub async fn tasks<R>(&self, repo: &R) -> Result<Vec<Task>, CoreError>
    where
        R: TaskRepository + Sync + ?Sized,
    {
        let generation = {
            let state = self.lock();
            if !state.stale {
                return Ok(state.tasks.clone());
            }
            state.generation
        };

        let tasks = repo.list_tasks().await?;

        let mut state = self.lock();
        if state.generation == generation {
            state.stale = false;
        }
        state.tasks = tasks.clone();
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTaskData, UpdateTaskData};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Serves a fixed task list and counts how often it was asked.
    #[derive(Default)]
    struct CountingRepo {
        fetches: AtomicUsize,
    }

    fn unsupported<T>() -> Result<T, CoreError> {
        Err(CoreError::InvalidInput("unsupported in this fake".to_string()))
    }

    #[async_trait]
    impl TaskRepository for CountingRepo {
        async fn add_task(&self, _data: NewTaskData) -> Result<Task, CoreError> {
            unsupported()
        }
        async fn find_task_by_id(&self, _id: Uuid) -> Result<Option<Task>, CoreError> {
            unsupported()
        }
        async fn find_tasks_by_short_id_prefix(&self, _s: &str) -> Result<Vec<Task>, CoreError> {
            unsupported()
        }
        async fn list_tasks(&self) -> Result<Vec<Task>, CoreError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Task {
                title: format!("fetch {}", n),
                ..Default::default()
            }])
        }
        async fn update_task(&self, _id: Uuid, _data: UpdateTaskData) -> Result<Task, CoreError> {
            unsupported()
        }
        async fn complete_task(&self, _id: Uuid) -> Result<Task, CoreError> {
            unsupported()
        }
        async fn reopen_task(&self, _id: Uuid) -> Result<Task, CoreError> {
            unsupported()
        }
        async fn delete_task(&self, _id: Uuid) -> Result<(), CoreError> {
            unsupported()
        }
    }

    #[tokio::test]
    async fn test_fetches_only_when_stale() {
        let repo = CountingRepo::default();
        let cache = TaskCache::new();
        assert!(cache.is_stale());

        let first = cache.tasks(&repo).await.unwrap();
        let second = cache.tasks(&repo).await.unwrap();
        assert_eq!(first[0].title, "fetch 0");
        assert_eq!(second[0].title, "fetch 0");
        assert_eq!(repo.fetches.load(Ordering::SeqCst), 1);

        cache.invalidate();
        let third = cache.tasks(&repo).await.unwrap();
        assert_eq!(third[0].title, "fetch 1");
        assert!(!cache.is_stale());
    }

    #[tokio::test]
    async fn test_subtask_changes_invalidate() {
        let repo = CountingRepo::default();
        let notifier = ChangeNotifier::default();
        let cache = TaskCache::new();
        let _subscriptions = cache.watch(&notifier);
        cache.tasks(&repo).await.unwrap();
        assert!(!cache.is_stale());

        notifier.publish(Table::Subtasks, crate::notify::ChangeKind::Update);
        for _ in 0..50 {
            if cache.is_stale() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(cache.is_stale());
    }
}
