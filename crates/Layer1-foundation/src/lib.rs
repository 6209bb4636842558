//! # locator-foundation
//!
//! Foundation layer for the service locator:
//! - Core: 호스트 모듈 계약 (Module, ModuleHost, ModuleListener) 및 값 타입
//! - Event: 모듈 상태 변경 이벤트 + 동기 EventBus
//! - Config: LocatorConfig (글로벌/프로젝트/환경 변수 병합)
//! - Error: 공통 에러 타입
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Host (모듈 시스템)                                      │
//! │  ├── Module: entries / open / load_type                 │
//! │  └── ModuleHost: modules / subscribe                    │
//! │                     │                                   │
//! │                     ▼ ModuleEvent                       │
//! │          ModuleListener (locator-core Tracker)          │
//! │                     │                                   │
//! │                     ▼                                   │
//! │          Locator Registry (factory id → loaders)        │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod event;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result, TypeLoadError};

// ============================================================================
// Core (호스트 계약 및 값 타입)
// ============================================================================
pub use core::{
    // Traits (traits.rs)
    HostedModule,
    Module,
    ModuleHost,
    ModuleListener,
    // Types (types.rs)
    ModuleId,
    ModuleState,
    ResourceUrl,
    TypeHandle,
};

// ============================================================================
// Event
// ============================================================================
pub use event::{EventBus, EventBusConfig, EventId, ListenerId, ModuleEvent, ModuleEventKind};

// ============================================================================
// Config
// ============================================================================
pub use config::{ConfigLayer, JsonStore, LocatorConfig, CONFIG_FILE, DEFAULT_DESCRIPTOR_DIR};

/// 크레이트 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
