//! Follower task
//!
//! While running, the follower re-asserts the target's camera every tick.
//! After enough consecutive failed switches it re-resolves the target from
//! live match state, and stops if the target has left the match.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use followcam_core::{resolve, CameraIndex, CameraRange, CorrectionMap, FollowSession};
use followcam_integration::GameApi;

use crate::error::DirectorError;

/// Correction map shared between the interactive path and the follower
pub type SharedCorrections = Arc<RwLock<CorrectionMap>>;

/// Follower timing and escalation
#[derive(Debug, Clone)]
pub struct FollowerConfig {
    /// Delay between camera re-assertions
    pub tick_interval: Duration,
    /// Consecutive failed switches before re-resolving the target
    pub failure_threshold: u32,
    /// Delay after a tick that faulted
    pub fault_backoff: Duration,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(2),
            failure_threshold: 3,
            fault_backoff: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    Stopped,
    Running,
}

/// Why a follow run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The user stopped following
    Requested,
    /// Re-resolution no longer finds the target
    PlayerLeft,
    /// Re-resolution produced a corrected camera outside the target's side
    OutOfRange { camera: CameraIndex, range: CameraRange },
}

/// Status updates for the interactive surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowEvent {
    Started {
        target: String,
        camera: CameraIndex,
    },
    Reresolved {
        target: String,
        from: CameraIndex,
        to: CameraIndex,
    },
    Stopped {
        target: String,
        reason: StopReason,
    },
}

impl FollowEvent {
    /// Whether this should be shown as an error
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            FollowEvent::Stopped {
                reason: StopReason::PlayerLeft | StopReason::OutOfRange { .. },
                ..
            }
        )
    }
}

impl fmt::Display for FollowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowEvent::Started { target, camera } => {
                write!(f, "Following {} on camera {}", target, camera)
            }
            FollowEvent::Reresolved { target, from, to } => {
                write!(f, "Re-resolved {}: camera {} -> {}", target, from, to)
            }
            FollowEvent::Stopped { reason, .. } => match reason {
                StopReason::Requested => write!(f, "Stopped following"),
                StopReason::PlayerLeft => write!(f, "Player left the match"),
                StopReason::OutOfRange { camera, range } => {
                    write!(f, "Camera {} out of valid range {}, stopped", camera, range)
                }
            },
        }
    }
}

/// State owned by one follow run. A new run gets a fresh one, so a stopped
/// run still finishing its last tick cannot touch the next session.
struct FollowRun {
    running: AtomicBool,
    session: Mutex<FollowSession>,
}

impl FollowRun {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Clear the flag; true if this call did the transition
    fn halt(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }
}

/// Starts, stops, and retargets the background follow task
pub struct Follower<A: GameApi + 'static> {
    api: Arc<A>,
    corrections: SharedCorrections,
    config: FollowerConfig,
    handle: Handle,
    run: Option<Arc<FollowRun>>,
    events: Option<mpsc::Sender<FollowEvent>>,
}

impl<A: GameApi + 'static> Follower<A> {
    /// Create a stopped follower that spawns its task on `handle`
    pub fn new(
        api: Arc<A>,
        corrections: SharedCorrections,
        config: FollowerConfig,
        handle: Handle,
    ) -> Self {
        Self {
            api,
            corrections,
            config,
            handle,
            run: None,
            events: None,
        }
    }

    /// Receive follow events. Replaces any previous subscriber.
    pub fn subscribe(&mut self) -> mpsc::Receiver<FollowEvent> {
        let (tx, rx) = mpsc::channel();
        self.events = Some(tx);
        rx
    }

    pub fn state(&self) -> FollowState {
        match &self.run {
            Some(run) if run.is_running() => FollowState::Running,
            _ => FollowState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == FollowState::Running
    }

    /// Session of the current or most recent run
    pub fn session(&self) -> Option<FollowSession> {
        self.run.as_ref().map(|run| run.session.lock().clone())
    }

    /// Begin following. The session's camera must already be resolved and
    /// within its range.
    pub fn start(&mut self, session: FollowSession) -> Result<(), DirectorError> {
        if let Some(current) = self.session().filter(|_| self.is_running()) {
            return Err(DirectorError::AlreadyRunning(current.target));
        }
        if !session.is_in_range() {
            return Err(DirectorError::OutOfRange {
                camera: session.camera,
                range: session.range,
            });
        }

        info!("Following {} on camera {}", session.target, session.camera);
        emit(
            &self.events,
            FollowEvent::Started {
                target: session.target.clone(),
                camera: session.camera,
            },
        );

        let run = Arc::new(FollowRun {
            running: AtomicBool::new(true),
            session: Mutex::new(session),
        });
        let task = FollowTask {
            api: Arc::clone(&self.api),
            corrections: Arc::clone(&self.corrections),
            config: self.config.clone(),
            run: Arc::clone(&run),
            events: self.events.clone(),
        };
        self.handle.spawn(task.run());
        self.run = Some(run);
        Ok(())
    }

    /// Stop following. Does nothing when already stopped.
    pub fn stop(&mut self) {
        let Some(run) = &self.run else {
            return;
        };
        if run.halt() {
            let target = run.session.lock().target.clone();
            info!("Stopped following {}", target);
            emit(
                &self.events,
                FollowEvent::Stopped {
                    target,
                    reason: StopReason::Requested,
                },
            );
        }
    }

    /// Point the running session at a different camera (manual adjustment)
    pub fn retarget(&self, camera: CameraIndex) -> Result<(), DirectorError> {
        let run = self
            .run
            .as_ref()
            .filter(|run| run.is_running())
            .ok_or(DirectorError::NoTarget)?;

        let mut session = run.session.lock();
        if !session.range.contains(camera) {
            return Err(DirectorError::OutOfRange {
                camera,
                range: session.range,
            });
        }
        debug!("Retargeted {} from camera {} to {}", session.target, session.camera, camera);
        session.camera = camera;
        Ok(())
    }
}

fn emit(events: &Option<mpsc::Sender<FollowEvent>>, event: FollowEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

enum TickOutcome {
    Continue,
    Stop(StopReason),
}

struct FollowTask<A: GameApi> {
    api: Arc<A>,
    corrections: SharedCorrections,
    config: FollowerConfig,
    run: Arc<FollowRun>,
    events: Option<mpsc::Sender<FollowEvent>>,
}

impl<A: GameApi> FollowTask<A> {
    async fn run(self) {
        let mut failures = 0u32;

        while self.run.is_running() {
            let delay = match self.tick(&mut failures).await {
                Ok(TickOutcome::Continue) => self.config.tick_interval,
                Ok(TickOutcome::Stop(reason)) => {
                    if self.run.halt() {
                        let target = self.run.session.lock().target.clone();
                        warn!("Stopped following {}: {:?}", target, reason);
                        emit(&self.events, FollowEvent::Stopped { target, reason });
                    }
                    break;
                }
                Err(e) => {
                    warn!("Follow tick failed, backing off: {}", e);
                    self.config.fault_backoff
                }
            };
            tokio::time::sleep(delay).await;
        }

        debug!("Follow task exited");
    }

    async fn tick(&self, failures: &mut u32) -> Result<TickOutcome, DirectorError> {
        let camera = self.run.session.lock().camera;

        match self.api.set_camera(camera).await {
            Ok(()) => {
                *failures = 0;
                return Ok(TickOutcome::Continue);
            }
            Err(e) => {
                *failures += 1;
                debug!("Camera switch failed ({} in a row): {}", failures, e);
            }
        }

        if *failures < self.config.failure_threshold {
            return Ok(TickOutcome::Continue);
        }

        let target = self.run.session.lock().target.clone();
        let state = self.api.get_match_state().await?;
        let resolution = match resolve(&state, &target) {
            Ok(resolution) => resolution,
            Err(_) => return Ok(TickOutcome::Stop(StopReason::PlayerLeft)),
        };

        let corrected = self.corrections.read().apply(&target, resolution.camera);
        let range = resolution.range();
        if !range.contains(corrected) {
            return Ok(TickOutcome::Stop(StopReason::OutOfRange {
                camera: corrected,
                range,
            }));
        }

        let from = {
            let mut session = self.run.session.lock();
            let from = session.camera;
            session.camera = corrected;
            session.range = range;
            from
        };
        *failures = 0;

        info!("Re-resolved {} to camera {}", target, corrected);
        emit(
            &self.events,
            FollowEvent::Reresolved {
                target,
                from,
                to: corrected,
            },
        );
        Ok(TickOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use followcam_core::{MatchState, Team, TeamSide, UiFlag};
    use followcam_integration::ApiError;

    /// Game API double with scripted camera results
    #[derive(Default)]
    struct FakeApi {
        state: Mutex<MatchState>,
        offline: AtomicBool,
        fail_cameras: AtomicBool,
        camera_script: Mutex<VecDeque<bool>>,
        camera_calls: Mutex<Vec<CameraIndex>>,
        state_calls: AtomicUsize,
    }

    impl FakeApi {
        fn with_state(state: MatchState) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new(state),
                ..Default::default()
            })
        }

        fn camera_calls(&self) -> usize {
            self.camera_calls.lock().len()
        }

        fn last_camera(&self) -> Option<CameraIndex> {
            self.camera_calls.lock().last().copied()
        }

        fn state_calls(&self) -> usize {
            self.state_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GameApi for FakeApi {
        async fn get_match_state(&self) -> Result<MatchState, ApiError> {
            self.state_calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(ApiError::Offline);
            }
            Ok(self.state.lock().clone())
        }

        async fn set_camera(&self, camera: CameraIndex) -> Result<(), ApiError> {
            self.camera_calls.lock().push(camera);
            let ok = self
                .camera_script
                .lock()
                .pop_front()
                .unwrap_or(!self.fail_cameras.load(Ordering::SeqCst));
            if ok {
                Ok(())
            } else {
                Err(ApiError::Offline)
            }
        }

        async fn set_ui_flag(&self, _flag: UiFlag, _enabled: bool) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn sample_state() -> MatchState {
        MatchState::new(vec![
            Team::new("ORANGE", ["A", "B"]),
            Team::new("BLUE", ["C", "D"]),
        ])
    }

    fn blue_session(target: &str, camera: i32) -> FollowSession {
        FollowSession::new(target, CameraIndex(camera), TeamSide::Blue.camera_range())
    }

    fn follower(api: &Arc<FakeApi>, corrections: CorrectionMap) -> Follower<FakeApi> {
        Follower::new(
            Arc::clone(api),
            Arc::new(RwLock::new(corrections)),
            FollowerConfig::default(),
            Handle::current(),
        )
    }

    async fn advance(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_reassert_camera() {
        let api = FakeApi::with_state(sample_state());
        let mut follower = follower(&api, CorrectionMap::new());

        follower.start(blue_session("C", 6)).unwrap();
        assert_eq!(follower.state(), FollowState::Running);

        // Ticks at t=0, 2, 4
        advance(5).await;
        assert_eq!(api.camera_calls(), 3);
        assert_eq!(api.last_camera(), Some(CameraIndex(6)));
        assert_eq!(api.state_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_third_failure_triggers_single_reresolution() {
        let api = FakeApi::with_state(sample_state());
        api.fail_cameras.store(true, Ordering::SeqCst);
        let mut corrections = CorrectionMap::new();
        corrections.set("C", 1);
        let mut follower = follower(&api, corrections);
        let events = follower.subscribe();

        follower.start(blue_session("C", 6)).unwrap();

        // Failures at t=0 and t=2 only
        advance(3).await;
        assert_eq!(api.camera_calls(), 2);
        assert_eq!(api.state_calls(), 0);

        // Third failure at t=4 re-resolves
        advance(2).await;
        assert_eq!(api.camera_calls(), 3);
        assert_eq!(api.state_calls(), 1);
        assert_eq!(follower.session().unwrap().camera, CameraIndex(7));

        // Counter was reset: failures at t=6 and t=8 do not re-resolve
        advance(4).await;
        assert_eq!(api.camera_calls(), 5);
        assert_eq!(api.state_calls(), 1);
        assert_eq!(api.last_camera(), Some(CameraIndex(7)));
        assert!(follower.is_running());

        let received: Vec<FollowEvent> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![
                FollowEvent::Started { target: "C".into(), camera: CameraIndex(6) },
                FollowEvent::Reresolved {
                    target: "C".into(),
                    from: CameraIndex(6),
                    to: CameraIndex(7),
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_failure_count() {
        let api = FakeApi::with_state(sample_state());
        api.camera_script
            .lock()
            .extend([false, false, true, false, false, true]);
        let mut follower = follower(&api, CorrectionMap::new());

        follower.start(blue_session("C", 6)).unwrap();
        advance(13).await;

        assert_eq!(api.camera_calls(), 7);
        assert_eq!(api.state_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_player_left_stops_follower() {
        let api = FakeApi::with_state(MatchState::new(vec![Team::new("ORANGE", ["A"])]));
        api.fail_cameras.store(true, Ordering::SeqCst);
        let mut follower = follower(&api, CorrectionMap::new());
        let events = follower.subscribe();

        follower.start(blue_session("C", 6)).unwrap();
        advance(5).await;

        assert_eq!(follower.state(), FollowState::Stopped);
        assert_eq!(api.state_calls(), 1);
        let calls = api.camera_calls();
        assert_eq!(calls, 3);

        advance(20).await;
        assert_eq!(api.camera_calls(), calls);

        let last = events.try_iter().last().unwrap();
        assert_eq!(
            last,
            FollowEvent::Stopped { target: "C".into(), reason: StopReason::PlayerLeft }
        );
        assert!(last.is_error());
        assert_eq!(last.to_string(), "Player left the match");
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_reresolution_stops() {
        let api = FakeApi::with_state(sample_state());
        api.fail_cameras.store(true, Ordering::SeqCst);
        let mut corrections = CorrectionMap::new();
        corrections.set("D", 4);
        let mut follower = follower(&api, corrections);
        let events = follower.subscribe();

        follower.start(blue_session("D", 7)).unwrap();
        advance(5).await;

        assert!(!follower.is_running());
        let last = events.try_iter().last().unwrap();
        assert_eq!(
            last,
            FollowEvent::Stopped {
                target: "D".into(),
                reason: StopReason::OutOfRange {
                    camera: CameraIndex(11),
                    range: TeamSide::Blue.camera_range(),
                },
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_backs_off_and_keeps_running() {
        let api = FakeApi::with_state(sample_state());
        api.fail_cameras.store(true, Ordering::SeqCst);
        api.offline.store(true, Ordering::SeqCst);
        let mut follower = follower(&api, CorrectionMap::new());

        follower.start(blue_session("C", 6)).unwrap();

        // Fault at t=4, next tick waits for t=9 instead of t=6
        advance(8).await;
        assert_eq!(api.camera_calls(), 3);
        assert_eq!(api.state_calls(), 1);
        assert!(follower.is_running());

        advance(2).await;
        assert_eq!(api.camera_calls(), 4);
        assert_eq!(api.state_calls(), 2);
        assert!(follower.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_and_halts_ticks() {
        let api = FakeApi::with_state(sample_state());
        let mut follower = follower(&api, CorrectionMap::new());
        let events = follower.subscribe();

        follower.start(blue_session("C", 6)).unwrap();
        advance(1).await;
        follower.stop();
        follower.stop();
        assert_eq!(follower.state(), FollowState::Stopped);

        advance(10).await;
        assert_eq!(api.camera_calls(), 1);

        let stops = events
            .try_iter()
            .filter(|e| matches!(e, FollowEvent::Stopped { .. }))
            .count();
        assert_eq!(stops, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_rejects_out_of_range_session() {
        let api = FakeApi::with_state(sample_state());
        let mut follower = follower(&api, CorrectionMap::new());

        let err = follower.start(blue_session("C", 3)).unwrap_err();
        assert!(matches!(err, DirectorError::OutOfRange { camera: CameraIndex(3), .. }));
        assert_eq!(follower.state(), FollowState::Stopped);

        advance(5).await;
        assert_eq!(api.camera_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_is_rejected() {
        let api = FakeApi::with_state(sample_state());
        let mut follower = follower(&api, CorrectionMap::new());

        follower.start(blue_session("C", 6)).unwrap();
        let err = follower.start(blue_session("D", 7)).unwrap_err();
        assert!(matches!(err, DirectorError::AlreadyRunning(ref t) if t == "C"));

        follower.stop();
        follower.start(blue_session("D", 7)).unwrap();
        advance(1).await;
        assert_eq!(api.last_camera(), Some(CameraIndex(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retarget_changes_asserted_camera() {
        let api = FakeApi::with_state(sample_state());
        let mut follower = follower(&api, CorrectionMap::new());

        assert!(matches!(follower.retarget(CameraIndex(7)), Err(DirectorError::NoTarget)));

        follower.start(blue_session("C", 6)).unwrap();
        advance(1).await;
        follower.retarget(CameraIndex(7)).unwrap();
        assert!(follower.retarget(CameraIndex(2)).is_err());

        advance(2).await;
        assert_eq!(api.last_camera(), Some(CameraIndex(7)));
        assert_eq!(follower.session().unwrap().camera, CameraIndex(7));
    }
}
