//! Serialized narrative scene queue.
//!
//! Scene presentation is the one place the engine suspends. Requests are
//! queued with a delay; a single cooperative loop drains them strictly in
//! order: wait the request's delay, present the scene, wait the inter-scene
//! gap, repeat. The loop exits when the queue is empty and is restarted by
//! the next enqueue.
//!
//! # Architecture
//!
//! The queue lives behind a [`std::sync::Mutex`] that is never held across
//! an await point. The running flag is only flipped off while the queue
//! lock is held, so [`NarrativeScheduler::enqueue`] always sees a
//! consistent answer to "does someone need to start the loop".
//!
//! Every request carries the queue generation it was queued under.
//! [`NarrativeScheduler::clear`] bumps the generation, so a request the
//! loop already popped and is waiting out is dropped instead of presented.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use revolution_types::{SceneId, SceneRecord};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A pending request to present a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneRequest {
    /// The scene to present.
    pub scene_id: SceneId,
    /// Wait before presenting.
    pub delay: Duration,
    /// Whether the request jumped the queue.
    pub priority: bool,
    /// When the request was queued.
    pub enqueued_at: Instant,
    /// Queue generation at enqueue time.
    pub generation: u64,
}

/// Presents a scene by id.
///
/// Returning `None` means the scene was rejected (unknown, stale, or its
/// requirements do not hold); the scheduler skips it and moves on.
pub trait ScenePresenter: Send + Sync {
    /// Present the requested scene now.
    fn present(&self, request: &SceneRequest) -> Option<SceneRecord>;
}

/// FIFO scene queue with a single cooperative drain loop.
#[derive(Debug)]
pub struct NarrativeScheduler {
    queue: Mutex<VecDeque<SceneRequest>>,
    running: AtomicBool,
    generation: AtomicU64,
    gap: Duration,
}

impl NarrativeScheduler {
    /// Create an idle scheduler that pauses `gap` after each scene.
    pub const fn new(gap: Duration) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            running: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            gap,
        }
    }

    /// Queue a scene. Priority requests go to the front, others to the back.
    ///
    /// Returns `true` when no loop is running and the caller should start
    /// one with [`run_loop`](Self::run_loop).
    pub fn enqueue(&self, scene_id: SceneId, delay: Duration, priority: bool) -> bool {
        let mut queue = self.lock();
        debug!(scene = %scene_id, delay_ms = delay.as_millis(), priority, "Scene queued");
        let request = SceneRequest {
            scene_id,
            delay,
            priority,
            enqueued_at: Instant::now(),
            generation: self.generation.load(Ordering::Acquire),
        };
        if priority {
            queue.push_front(request);
        } else {
            queue.push_back(request);
        }
        !self.running.load(Ordering::Acquire)
    }

    /// Drain the queue, presenting each scene in order.
    ///
    /// A no-op returning 0 if another loop is already running. Returns the
    /// number of scenes presented (rejected scenes are not counted).
    pub async fn run_loop<P: ScenePresenter + ?Sized>(&self, presenter: &P) -> usize {
        if self.running.swap(true, Ordering::AcqRel) {
            debug!("Narrative loop already running");
            return 0;
        }

        let mut presented: usize = 0;
        loop {
            let next = {
                let mut queue = self.lock();
                let Some(next) = queue.pop_front() else {
                    self.running.store(false, Ordering::Release);
                    break;
                };
                next
            };

            tokio::time::sleep(next.delay).await;
            if self.is_stale(&next) {
                debug!(scene = %next.scene_id, "Queue cleared during delay, dropping scene");
                continue;
            }
            match presenter.present(&next) {
                Some(scene) => {
                    presented = presented.saturating_add(1);
                    debug!(
                        scene = %scene.id,
                        waited_ms = next.enqueued_at.elapsed().as_millis(),
                        "Scene presented"
                    );
                }
                None => warn!(scene = %next.scene_id, "Scene rejected, skipping"),
            }
            tokio::time::sleep(self.gap).await;
        }

        info!(presented, "Narrative queue drained");
        presented
    }

    /// Drop every pending request, including one the loop is waiting out.
    /// Returns how many queued requests were dropped.
    pub fn clear(&self) -> usize {
        let mut queue = self.lock();
        let dropped = queue.len();
        queue.clear();
        self.generation.fetch_add(1, Ordering::AcqRel);
        if dropped > 0 {
            debug!(dropped, "Narrative queue cleared");
        }
        dropped
    }

    /// Ids of the pending requests, front first.
    pub fn pending(&self) -> Vec<SceneId> {
        self.lock().iter().map(|r| r.scene_id.clone()).collect()
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether the queue was cleared after this request was queued.
    pub fn is_stale(&self, request: &SceneRequest) -> bool {
        request.generation != self.generation.load(Ordering::Acquire)
    }

    /// Whether a drain loop is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<SceneRequest>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        shown: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn shown(&self) -> Vec<String> {
            self.shown.lock().unwrap().clone()
        }
    }

    impl ScenePresenter for Recorder {
        fn present(&self, request: &SceneRequest) -> Option<SceneRecord> {
            let scene_id = &request.scene_id;
            if scene_id.as_str().starts_with("missing") {
                return None;
            }
            self.shown.lock().unwrap().push(scene_id.to_string());
            Some(SceneRecord {
                id: scene_id.clone(),
                title: String::new(),
                text: String::new(),
                characters: Vec::new(),
                background: String::new(),
                mood: None,
                effects: Vec::new(),
                epoch: None,
                ending: None,
                requirements: revolution_types::Requirements::default(),
                trigger: None,
                next: None,
                generated: false,
            })
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn priority_request_runs_first() {
        let scheduler = NarrativeScheduler::new(ms(3000));
        let recorder = Recorder::default();

        assert!(scheduler.enqueue(SceneId::from("first"), ms(1000), false));
        assert!(scheduler.enqueue(SceneId::from("second"), ms(500), false));
        assert!(scheduler.enqueue(SceneId::from("priority"), ms(500), true));
        assert_eq!(scheduler.pending().len(), 3);

        let presented = scheduler.run_loop(&recorder).await;
        assert_eq!(presented, 3);
        assert_eq!(recorder.shown(), ["priority", "first", "second"]);
        assert!(!scheduler.is_running());
        assert!(scheduler.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_scenes_are_skipped() {
        let scheduler = NarrativeScheduler::new(ms(10));
        let recorder = Recorder::default();
        scheduler.enqueue(SceneId::from("missing_scene"), ms(0), false);
        scheduler.enqueue(SceneId::from("opening"), ms(0), false);

        assert_eq!(scheduler.run_loop(&recorder).await, 1);
        assert_eq!(recorder.shown(), ["opening"]);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_is_idempotent_and_restartable() {
        let scheduler = Arc::new(NarrativeScheduler::new(ms(3000)));
        let recorder = Arc::new(Recorder::default());

        scheduler.enqueue(SceneId::from("a"), ms(100), false);
        let task = {
            let scheduler = Arc::clone(&scheduler);
            let recorder = Arc::clone(&recorder);
            tokio::spawn(async move { scheduler.run_loop(&*recorder).await })
        };
        tokio::time::sleep(ms(50)).await;
        assert!(scheduler.is_running());

        // A second loop while one is active does nothing.
        assert_eq!(scheduler.run_loop(&*recorder).await, 0);
        // Enqueue during a run does not ask for a new loop.
        assert!(!scheduler.enqueue(SceneId::from("b"), ms(100), false));

        assert_eq!(task.await.unwrap(), 2);
        assert_eq!(recorder.shown(), ["a", "b"]);
        assert!(!scheduler.is_running());

        assert!(scheduler.enqueue(SceneId::from("c"), ms(0), false));
        assert_eq!(scheduler.run_loop(&*recorder).await, 1);
        assert_eq!(recorder.shown(), ["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_drops_pending_requests() {
        let scheduler = NarrativeScheduler::new(ms(10));
        scheduler.enqueue(SceneId::from("a"), ms(0), false);
        scheduler.enqueue(SceneId::from("b"), ms(0), false);
        assert_eq!(scheduler.clear(), 2);
        assert_eq!(scheduler.run_loop(&Recorder::default()).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_drops_request_waiting_out_its_delay() {
        let scheduler = Arc::new(NarrativeScheduler::new(ms(10)));
        let recorder = Arc::new(Recorder::default());

        scheduler.enqueue(SceneId::from("a"), ms(500), false);
        scheduler.enqueue(SceneId::from("b"), ms(500), false);
        let task = {
            let scheduler = Arc::clone(&scheduler);
            let recorder = Arc::clone(&recorder);
            tokio::spawn(async move { scheduler.run_loop(&*recorder).await })
        };
        tokio::time::sleep(ms(100)).await;
        assert_eq!(scheduler.pending().len(), 1);

        assert_eq!(scheduler.clear(), 1);
        assert_eq!(task.await.unwrap(), 0);
        assert!(recorder.shown().is_empty());

        assert!(scheduler.enqueue(SceneId::from("c"), ms(0), false));
        assert_eq!(scheduler.run_loop(&*recorder).await, 1);
        assert_eq!(recorder.shown(), ["c"]);
    }
}
