//! Event Types - 모듈 상태 변경 이벤트

use crate::core::{Module, ModuleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Event ID
// ============================================================================

/// 이벤트 고유 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    /// 새 이벤트 ID 생성
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ModuleEventKind
// ============================================================================

/// 모듈 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleEventKind {
    Installed,
    Resolved,
    Started,
    Stopped,
    Updated,
    Unresolved,
    Uninstalled,
}

impl ModuleEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Resolved => "resolved",
            Self::Started => "started",
            Self::Stopped => "stopped",
            Self::Updated => "updated",
            Self::Unresolved => "unresolved",
            Self::Uninstalled => "uninstalled",
        }
    }

    /// 모듈의 타입 공간이 사용 가능해졌음을 뜻하는지
    pub fn is_arrival(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// 모듈의 타입 공간이 사라졌음을 뜻하는지
    pub fn is_departure(&self) -> bool {
        matches!(self, Self::Unresolved | Self::Uninstalled)
    }
}

impl std::fmt::Display for ModuleEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ModuleEvent
// ============================================================================

/// 호스트가 발행하는 모듈 이벤트
#[derive(Clone)]
pub struct ModuleEvent {
    pub id: EventId,
    pub kind: ModuleEventKind,
    pub module: Arc<dyn Module>,
    pub timestamp: DateTime<Utc>,
}

impl ModuleEvent {
    pub fn new(kind: ModuleEventKind, module: Arc<dyn Module>) -> Self {
        Self {
            id: EventId::new(),
            kind,
            module,
            timestamp: Utc::now(),
        }
    }

    pub fn module_id(&self) -> ModuleId {
        self.module.id()
    }
}

impl std::fmt::Debug for ModuleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEvent")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("module", &self.module.id())
            .field("timestamp", &self.timestamp)
            .finish()
    }
}
