//! Core Traits - 호스트 모듈 시스템 인터페이스
//!
//! Locator는 모듈을 직접 관리하지 않는다. 호스트가 아래 trait들을 구현해서
//! 모듈 목록, 상태 변경 알림, 모듈 단위의 리소스/타입 접근을 제공한다.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  ModuleHost                                  │
//! │  ├── modules()       현재 모듈 + 상태        │
//! │  ├── subscribe()     ModuleListener 등록     │
//! │  └── unsubscribe()                           │
//! │                                              │
//! │  Module (모듈마다 하나)                       │
//! │  ├── entries(path)   직계 엔트리 나열        │
//! │  ├── open(url)       엔트리 읽기             │
//! │  └── load_type(name) 모듈 자신의 타입 공간   │
//! └──────────────────────────────────────────────┘
//! ```

use super::types::{ModuleId, ModuleState, ResourceUrl, TypeHandle};
use crate::error::TypeLoadError;
use crate::event::{ListenerId, ModuleEvent};
use std::io::Read;
use std::sync::Arc;

// ============================================================================
// Module Trait
// ============================================================================

/// 호스트가 관리하는 모듈 하나
pub trait Module: Send + Sync {
    /// 호스트가 부여한 식별자
    fn id(&self) -> ModuleId;

    /// 표시 이름 (로그용)
    fn name(&self) -> &str;

    /// `path` 바로 아래의 엔트리 목록 (재귀하지 않음)
    ///
    /// 하위 디렉토리 엔트리는 `/`로 끝나는 위치로 반환한다.
    fn entries(&self, path: &str) -> std::io::Result<Vec<ResourceUrl>>;

    /// 엔트리를 읽기용으로 연다
    fn open(&self, url: &ResourceUrl) -> std::io::Result<Box<dyn Read + Send>>;

    /// 모듈 자신의 타입 공간에서 이름으로 타입을 로드
    fn load_type(&self, name: &str) -> Result<TypeHandle, TypeLoadError>;
}

impl std::fmt::Debug for dyn Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

/// 호스트가 보고하는 모듈과 그 시점의 상태
#[derive(Debug, Clone)]
pub struct HostedModule {
    pub module: Arc<dyn Module>,
    pub state: ModuleState,
}

impl HostedModule {
    pub fn new(module: Arc<dyn Module>, state: ModuleState) -> Self {
        Self { module, state }
    }

    pub fn id(&self) -> ModuleId {
        self.module.id()
    }
}

// ============================================================================
// ModuleListener / ModuleHost
// ============================================================================

/// 모듈 상태 변경 알림 수신자
///
/// 호스트는 임의의 스레드에서 호출할 수 있다.
pub trait ModuleListener: Send + Sync {
    /// 리스너 이름 (디버깅용)
    fn name(&self) -> &str;

    /// 상태 변경 처리
    fn module_changed(&self, event: &ModuleEvent);
}

/// 모듈 호스트
pub trait ModuleHost: Send + Sync {
    /// 현재 알려진 모듈 목록 (호스트 순서)
    fn modules(&self) -> Vec<HostedModule>;

    /// 리스너 등록
    fn subscribe(&self, listener: Arc<dyn ModuleListener>) -> ListenerId;

    /// 리스너 해제
    fn unsubscribe(&self, id: ListenerId) -> bool;
}
