// One-shot deferred tasks on a virtual clock. The clock only moves when the
// owner calls `advance`, so a dropped scheduler never fires again.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TaskId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TaskId,
    due: Duration,
    task: T,
}

#[derive(Debug)]
pub(crate) struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub(crate) fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn pending(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due: self.now.saturating_add(delay),
            task,
        });
        id
    }

    pub(crate) fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub(crate) fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    /// Move the clock forward and hand back every task that came due,
    /// earliest deadline first, scheduling order breaking ties.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due <= now {
                due.push(self.entries.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|e| (e.due, e.id));
        due.into_iter().map(|e| e.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let mut s = Scheduler::new();
        s.schedule(ms(100), "a");
        assert!(s.advance(ms(99)).is_empty());
        assert_eq!(s.advance(ms(1)), vec!["a"]);
        assert!(s.advance(ms(1000)).is_empty());
    }

    #[test]
    fn due_tasks_come_back_in_deadline_order() {
        let mut s = Scheduler::new();
        s.schedule(ms(300), 3);
        s.schedule(ms(100), 1);
        s.schedule(ms(200), 2);
        s.schedule(ms(100), 11);
        assert_eq!(s.advance(ms(1000)), vec![1, 11, 2, 3]);
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut s = Scheduler::new();
        let a = s.schedule(ms(50), 'a');
        s.schedule(ms(50), 'b');
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert_eq!(s.pending(), 1);
        assert_eq!(s.advance(ms(50)), vec!['b']);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn cancel_all_empties_queue() {
        let mut s = Scheduler::new();
        s.schedule(ms(10), ());
        s.schedule(ms(20), ());
        assert_eq!(s.pending(), 2);
        assert_eq!(s.cancel_all(), 2);
        assert_eq!(s.pending(), 0);
        assert!(s.advance(ms(100)).is_empty());
    }

    #[test]
    fn clock_only_moves_on_advance() {
        let mut s = Scheduler::<()>::new();
        assert_eq!(s.now(), Duration::ZERO);
        s.advance(ms(200));
        s.advance(ms(300));
        assert_eq!(s.now(), ms(500));
    }
}
