use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;

use crate::models::Task;

#[derive(Default)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
    notify: Notify,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Task>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, task: Task) {
        self.lock().push_back(task);
        self.notify.notify_one();
    }

    pub fn try_pop(&self) -> Option<Task> {
        self.lock().pop_front()
    }

    pub async fn pop_timeout(&self, wait: Duration) -> Option<Task> {
        if let Some(task) = self.try_pop() {
            return Some(task);
        }
        let _ = tokio::time::timeout(wait, self.notify.notified()).await;
        self.try_pop()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }
}
