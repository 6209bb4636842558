//! Module Tracker - 호스트 모듈 생명주기를 레지스트리에 반영
//!
//! 모듈이 도착하면 스캔해서 그룹 단위로 등록하고, 떠나면 그 그룹만 해제한다.
//! 그룹 테이블 락을 잡은 채 레지스트리 락을 잡는다 (항상 이 순서).

use crate::registry::Locator;
use crate::scanner::{ModuleScanner, RegistrationGroup};
use locator_foundation::{
    Error, ListenerId, LocatorConfig, Module, ModuleEvent, ModuleHost, ModuleId, ModuleListener,
    ModuleState, Result,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, trace};

/// 호스트 구독 정보
struct Subscription {
    host: Arc<dyn ModuleHost>,
    listener: ListenerId,
}

/// 그룹 테이블 (추적기 락 하나로 보호)
#[derive(Default)]
struct TrackerState {
    /// 모듈 → 그 모듈이 기여한 등록 그룹
    groups: HashMap<ModuleId, RegistrationGroup>,

    /// 시작 열거 중 이벤트로 이미 처리된 모듈 (열거가 끝나면 None)
    ///
    /// 열거 스냅샷은 이 모듈들에 대해 낡았으므로 재생하지 않는다.
    startup_seen: Option<HashSet<ModuleId>>,
}

impl TrackerState {
    fn mark_seen(&mut self, id: ModuleId) {
        if let Some(seen) = self.startup_seen.as_mut() {
            seen.insert(id);
        }
    }
}

/// 모듈 생명주기 추적기
pub struct ModuleTracker {
    locator: Arc<Locator>,
    scanner: ModuleScanner,
    startup_states: Vec<ModuleState>,

    state: Mutex<TrackerState>,

    subscription: Mutex<Option<Subscription>>,

    /// 그룹 테이블 락 아래에서만 바뀜
    running: AtomicBool,
}

impl ModuleTracker {
    pub fn new(locator: Arc<Locator>, scanner: ModuleScanner) -> Self {
        Self {
            locator,
            scanner,
            startup_states: ModuleState::startup_defaults(),
            state: Mutex::new(TrackerState::default()),
            subscription: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    pub fn from_config(locator: Arc<Locator>, config: &LocatorConfig) -> Self {
        Self::new(locator, ModuleScanner::from_config(config))
            .with_startup_states(config.startup_states.clone())
    }

    /// 시작 시 스캔할 모듈 상태
    pub fn with_startup_states(mut self, states: Vec<ModuleState>) -> Self {
        self.startup_states = states;
        self
    }

    pub fn locator(&self) -> &Arc<Locator> {
        &self.locator
    }

    // ========================================================================
    // 시작 / 정지
    // ========================================================================

    /// 호스트 구독 후 현재 모듈들을 등록
    ///
    /// 구독을 먼저 하므로 열거 중에 도착한 모듈도 놓치지 않는다. 구독 이후
    /// 이벤트가 온 모듈은 열거 스냅샷에서 건너뛴다 (이미 떠났거나 이미 등록됨).
    pub fn start(self: &Arc<Self>, host: Arc<dyn ModuleHost>) -> Result<()> {
        {
            let mut subscription = self.subscription.lock();
            if subscription.is_some() {
                return Err(Error::InvalidInput(
                    "module tracker is already running".to_string(),
                ));
            }

            let listener = Arc::new(TrackerListener {
                tracker: Arc::downgrade(self),
            });
            {
                let mut state = self.state.lock();
                state.startup_seen = Some(HashSet::new());
                self.running.store(true, Ordering::SeqCst);
            }
            let listener = host.subscribe(listener);
            *subscription = Some(Subscription {
                host: host.clone(),
                listener,
            });
        }

        let mut scanned = 0;
        for hosted in host.modules() {
            if !self.startup_states.contains(&hosted.state) {
                trace!("Skipping module {} in state {}", hosted.id(), hosted.state);
            } else if self.replay(&hosted.module) {
                scanned += 1;
            }
        }
        self.state.lock().startup_seen = None;

        info!(
            "Module tracker started: {} modules scanned, {} factory ids registered",
            scanned,
            self.locator.factory_ids().len()
        );
        Ok(())
    }

    /// 구독 해제 후 남은 그룹을 모두 해제 (여러 번 호출해도 안전)
    pub fn stop(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.host.unsubscribe(subscription.listener);
        }

        let mut state = self.state.lock();
        self.running.store(false, Ordering::SeqCst);
        state.startup_seen = None;

        let count = state.groups.len();
        for (_, group) in state.groups.drain() {
            self.locator.unregister_group(&group);
        }

        if count > 0 {
            info!("Module tracker stopped: {} module groups unregistered", count);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    // ========================================================================
    // 도착 / 떠남
    // ========================================================================

    /// 모듈 도착: 스캔 후 그룹 등록 (기존 그룹은 먼저 해제)
    pub fn module_arrived(&self, module: &Arc<dyn Module>) {
        self.arrive(module, false);
    }

    /// 모듈 떠남: 그 모듈의 그룹만 해제 (모르는 모듈이면 아무 일도 없음)
    pub fn module_departed(&self, id: ModuleId) {
        let mut state = self.state.lock();
        state.mark_seen(id);
        if let Some(group) = state.groups.remove(&id) {
            let removed = self.locator.unregister_group(&group);
            debug!("Module {} departed: {} loaders unregistered", id, removed);
        } else {
            trace!("Module {} departed but was not tracked", id);
        }
    }

    fn arrive(&self, module: &Arc<dyn Module>, require_running: bool) {
        // 스캔은 락 밖에서
        let group = self.scanner.scan(module);
        let id = module.id();

        let mut state = self.state.lock();
        if require_running && !self.running.load(Ordering::SeqCst) {
            trace!("Ignoring arrival of module {}: tracker stopped", id);
            return;
        }

        state.mark_seen(id);
        self.install_group(&mut state, module, group);
    }

    /// 시작 열거 스냅샷의 모듈 등록 (등록했으면 true)
    fn replay(&self, module: &Arc<dyn Module>) -> bool {
        let group = self.scanner.scan(module);
        let id = module.id();

        let mut state = self.state.lock();
        if !self.running.load(Ordering::SeqCst) {
            trace!("Ignoring startup module {}: tracker stopped", id);
            return false;
        }
        if state
            .startup_seen
            .as_ref()
            .is_some_and(|seen| seen.contains(&id))
        {
            debug!("Skipping startup module {}: changed during enumeration", id);
            return false;
        }

        self.install_group(&mut state, module, group);
        true
    }

    fn install_group(
        &self,
        state: &mut TrackerState,
        module: &Arc<dyn Module>,
        group: RegistrationGroup,
    ) {
        let id = module.id();
        if let Some(old) = state.groups.remove(&id) {
            debug!("Module {} re-arrived, replacing previous group", id);
            self.locator.unregister_group(&old);
        }

        self.locator.register_group(&group);
        debug!(
            "Module {} ({}) arrived: {} loaders registered",
            id,
            module.name(),
            group.len()
        );
        state.groups.insert(id, group);
    }

    fn handle_event(&self, event: &ModuleEvent) {
        if event.kind.is_arrival() {
            self.arrive(&event.module, true);
        } else if event.kind.is_departure() {
            self.module_departed(event.module_id());
        } else {
            trace!("Ignoring {} event for module {}", event.kind, event.module_id());
        }
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 추적 중인 모듈 (정렬됨)
    pub fn tracked_modules(&self) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self.state.lock().groups.keys().copied().collect();
        ids.sort();
        ids
    }

    /// 모듈이 기여한 factory id들
    pub fn contributions(&self, id: ModuleId) -> Option<Vec<String>> {
        self.state.lock().groups.get(&id).map(|group| {
            group
                .factory_ids()
                .into_iter()
                .map(str::to_string)
                .collect()
        })
    }
}

impl Drop for ModuleTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// TrackerListener
// ============================================================================

/// 호스트에 등록되는 리스너 (추적기를 약하게 참조)
struct TrackerListener {
    tracker: Weak<ModuleTracker>,
}

impl ModuleListener for TrackerListener {
    fn name(&self) -> &str {
        "module-tracker"
    }

    fn module_changed(&self, event: &ModuleEvent) {
        if let Some(tracker) = self.tracker.upgrade() {
            tracker.handle_event(event);
        }
    }
}
