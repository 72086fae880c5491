//! Cooperative single-consumer task queue
//!
//! All restore work runs on one logical thread: deferring work means
//! posting a task value here and returning, and the owning event loop
//! drains the queue between other pending work. There is no locking
//! because there is no parallel execution.
//!
//! Every task is tagged with the episode that posted it. An episode must
//! be registered live for its tasks to be honored: posts for a released
//! episode are refused, and tasks already queued when the episode is
//! released are skipped at drain time. This replaces a non-owning
//! back-reference to a possibly-destroyed peer with an explicit liveness
//! check at call time.

use std::collections::{HashSet, VecDeque};
use std::fmt;

/// Handle for one registered restore lifetime.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct EpisodeId(u64);

impl EpisodeId {
    /// Returns the raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Posting seam used by the restore coordinator.
pub trait Scheduler<T> {
    /// Enqueues a task on behalf of an episode.
    ///
    /// Returns false, without queueing, when the episode is not live.
    fn post(&mut self, episode: EpisodeId, task: T) -> bool;
}

/// FIFO task queue with an embedded live-episode set.
#[derive(Debug)]
pub struct TaskQueue<T> {
    next_episode: u64,
    live: HashSet<EpisodeId>,
    queue: VecDeque<(EpisodeId, T)>,
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            next_episode: 0,
            live: HashSet::new(),
            queue: VecDeque::new(),
        }
    }

    /// Registers a new live episode and returns its handle.
    pub fn register(&mut self) -> EpisodeId {
        let episode = EpisodeId(self.next_episode);
        self.next_episode += 1;
        self.live.insert(episode);
        episode
    }

    /// Releases an episode. Its queued tasks become dead and further posts
    /// are refused. Releasing an unknown episode is a no-op.
    pub fn release(&mut self, episode: EpisodeId) {
        self.live.remove(&episode);
    }

    /// Whether the episode is still registered.
    pub fn is_live(&self, episode: EpisodeId) -> bool {
        self.live.contains(&episode)
    }

    /// Removes and returns the next task belonging to a live episode,
    /// discarding any dead tasks encountered on the way.
    pub fn take_next(&mut self) -> Option<(EpisodeId, T)> {
        while let Some((episode, task)) = self.queue.pop_front() {
            if self.live.contains(&episode) {
                return Some((episode, task));
            }
        }
        None
    }

    /// Number of queued tasks belonging to live episodes.
    pub fn pending(&self) -> usize {
        self.queue
            .iter()
            .filter(|(episode, _)| self.live.contains(episode))
            .count()
    }

    /// Whether no live task is queued.
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> for TaskQueue<T> {
    fn post(&mut self, episode: EpisodeId, task: T) -> bool {
        if !self.live.contains(&episode) {
            return false;
        }
        self.queue.push_back((episode, task));
        true
    }
}
