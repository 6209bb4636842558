//! Event System - 모듈 상태 변경 이벤트 발행/구독
//!
//! 호스트는 모듈이 설치/해석/제거될 때 이벤트를 발행하고, Locator의
//! 모듈 추적기는 리스너로 등록되어 등록 테이블을 갱신합니다.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        EventBus                              │
//! │   publish(ModuleEvent) ── 발행 스레드에서 동기 전달          │
//! │         │                                                   │
//! │         ▼                                                   │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐      │
//! │  │  Listener 1  │  │  Listener 2  │  │  receiver()  │      │
//! │  │  (Tracker)   │  │  (...)       │  │  (관찰용)    │      │
//! │  └──────────────┘  └──────────────┘  └──────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod bus;
pub mod types;

pub use bus::{EventBus, EventBusConfig, ListenerId};
pub use types::{EventId, ModuleEvent, ModuleEventKind};
