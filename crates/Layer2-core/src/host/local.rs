//! Local Host - 프로세스 내 모듈 호스트
//!
//! 모듈 목록과 상태를 들고 있고, 상태가 바뀔 때마다 EventBus로 이벤트를
//! 발행한다. 이벤트는 호출한 스레드에서 동기적으로 전달되며, 호스트 자신의
//! 락은 전달 전에 풀린다.
//!
//! ```text
//! install ──▶ Installed ──resolve──▶ Resolved ──start──▶ Active
//!                 ▲                     │  ▲               │
//!                 └──────unresolve──────┘  └─────stop──────┘
//! uninstall: (Unresolved) → Uninstalled
//! update:    (Unresolved) → Updated → (Resolved)
//! ```

use locator_foundation::{
    Error, EventBus, EventBusConfig, HostedModule, ListenerId, Module, ModuleEvent,
    ModuleEventKind, ModuleHost, ModuleId, ModuleListener, ModuleState, Result,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// 프로세스 내 ModuleHost
pub struct LocalHost {
    /// 설치 순서대로 보관
    modules: RwLock<Vec<HostedModule>>,
    bus: EventBus,
    next_id: AtomicU64,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::with_bus_config(EventBusConfig::default())
    }

    pub fn with_bus_config(config: EventBusConfig) -> Self {
        Self {
            modules: RwLock::new(Vec::new()),
            bus: EventBus::with_config(config),
            next_id: AtomicU64::new(1),
        }
    }

    /// 아직 쓰이지 않은 모듈 ID 할당
    pub fn next_module_id(&self) -> ModuleId {
        ModuleId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// 이벤트 버스 (히스토리/수신자 조회용)
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn state(&self, id: ModuleId) -> Option<ModuleState> {
        self.modules
            .read()
            .iter()
            .find(|m| m.id() == id)
            .map(|m| m.state)
    }

    pub fn module(&self, id: ModuleId) -> Option<Arc<dyn Module>> {
        self.modules
            .read()
            .iter()
            .find(|m| m.id() == id)
            .map(|m| m.module.clone())
    }

    // ========================================================================
    // 생명주기
    // ========================================================================

    /// 모듈 설치
    pub fn install(&self, module: Arc<dyn Module>) -> Result<ModuleId> {
        let id = module.id();
        {
            let mut modules = self.modules.write();
            if modules.iter().any(|m| m.id() == id) {
                return Err(Error::InvalidInput(format!(
                    "module {} is already installed",
                    id
                )));
            }
            modules.push(HostedModule::new(module.clone(), ModuleState::Installed));
        }

        // 이후 할당할 ID가 겹치지 않게
        self.next_id.fetch_max(id.0 + 1, Ordering::SeqCst);

        info!("Installed module {} ({})", id, module.name());
        self.bus
            .publish(ModuleEvent::new(ModuleEventKind::Installed, module));
        Ok(id)
    }

    /// 모듈 해석 (이미 해석된 상태면 아무 일도 없음)
    pub fn resolve(&self, id: ModuleId) -> Result<()> {
        let module = self.transition(id, |state| match state {
            ModuleState::Installed => Ok(Some(ModuleState::Resolved)),
            s if s.is_resolved() => Ok(None),
            s => Err(invalid(id, s, "resolve")),
        })?;

        if let Some(module) = module {
            self.bus
                .publish(ModuleEvent::new(ModuleEventKind::Resolved, module));
        }
        Ok(())
    }

    /// 모듈 시작 (필요하면 먼저 해석)
    pub fn start(&self, id: ModuleId) -> Result<()> {
        self.resolve(id)?;
        let module = self.transition(id, |state| match state {
            ModuleState::Resolved => Ok(Some(ModuleState::Active)),
            ModuleState::Active => Ok(None),
            s => Err(invalid(id, s, "start")),
        })?;

        if let Some(module) = module {
            self.bus
                .publish(ModuleEvent::new(ModuleEventKind::Started, module));
        }
        Ok(())
    }

    /// 모듈 정지
    pub fn stop(&self, id: ModuleId) -> Result<()> {
        let module = self.transition(id, |state| match state {
            ModuleState::Active => Ok(Some(ModuleState::Resolved)),
            ModuleState::Installed | ModuleState::Resolved => Ok(None),
            s => Err(invalid(id, s, "stop")),
        })?;

        if let Some(module) = module {
            self.bus
                .publish(ModuleEvent::new(ModuleEventKind::Stopped, module));
        }
        Ok(())
    }

    /// 해석 해제 (타입 공간 무효화)
    pub fn unresolve(&self, id: ModuleId) -> Result<()> {
        let module = self.transition(id, |state| match state {
            s if s.is_resolved() => Ok(Some(ModuleState::Installed)),
            _ => Ok(None),
        })?;

        if let Some(module) = module {
            self.bus
                .publish(ModuleEvent::new(ModuleEventKind::Unresolved, module));
        }
        Ok(())
    }

    /// 모듈 내용 교체
    ///
    /// 해석된 모듈이었다면 Unresolved → Updated → Resolved 순으로 발행해서
    /// 추적기가 떠남 + 도착으로 처리하게 한다.
    pub fn update(&self, replacement: Arc<dyn Module>) -> Result<()> {
        let id = replacement.id();
        let was_resolved = self
            .state(id)
            .ok_or(Error::ModuleNotFound(id))?
            .is_resolved();

        if was_resolved {
            self.unresolve(id)?;
        }

        {
            let mut modules = self.modules.write();
            let hosted = modules
                .iter_mut()
                .find(|m| m.id() == id)
                .ok_or(Error::ModuleNotFound(id))?;
            hosted.module = replacement.clone();
        }

        debug!("Updated module {} ({})", id, replacement.name());
        self.bus
            .publish(ModuleEvent::new(ModuleEventKind::Updated, replacement));

        if was_resolved {
            self.resolve(id)?;
        }
        Ok(())
    }

    /// 모듈 제거
    pub fn uninstall(&self, id: ModuleId) -> Result<()> {
        self.unresolve(id)?;

        let hosted = {
            let mut modules = self.modules.write();
            let idx = modules
                .iter()
                .position(|m| m.id() == id)
                .ok_or(Error::ModuleNotFound(id))?;
            modules.remove(idx)
        };

        info!("Uninstalled module {} ({})", id, hosted.module.name());
        self.bus.publish(ModuleEvent::new(
            ModuleEventKind::Uninstalled,
            hosted.module,
        ));
        Ok(())
    }

    /// 상태 전이 (쓰기 락 안에서), 바뀌었으면 모듈을 돌려줌
    fn transition<F>(&self, id: ModuleId, next: F) -> Result<Option<Arc<dyn Module>>>
    where
        F: FnOnce(ModuleState) -> Result<Option<ModuleState>>,
    {
        let mut modules = self.modules.write();
        let hosted = modules
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or(Error::ModuleNotFound(id))?;

        match next(hosted.state)? {
            Some(state) => {
                debug!("Module {}: {} -> {}", id, hosted.state, state);
                hosted.state = state;
                Ok(Some(hosted.module.clone()))
            }
            None => Ok(None),
        }
    }
}

fn invalid(id: ModuleId, state: ModuleState, op: &str) -> Error {
    Error::InvalidInput(format!("cannot {} module {} in state {}", op, id, state))
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleHost for LocalHost {
    fn modules(&self) -> Vec<HostedModule> {
        self.modules.read().clone()
    }

    fn subscribe(&self, listener: Arc<dyn ModuleListener>) -> ListenerId {
        self.bus.subscribe(listener)
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }
}
