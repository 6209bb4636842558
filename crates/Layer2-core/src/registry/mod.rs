//! Registry - 서비스 팩토리 레지스트리
//!
//! ## 구조
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Locator                              │
//! │  ┌────────────────────────────────────────────────────────┐ │
//! │  │  RwLock<HashMap<factory id, Vec<FactoryLoader>>>       │ │
//! │  │    "com.example.Svc" → [M2 로더, M1 로더]  (최근 우선)  │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! │          │ locate / locate_all                              │
//! │          ▼                                                  │
//! │  OverrideSource (env / static / chain) + Contract 검사      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod contract;
mod locator;
mod overrides;

pub use contract::Contract;
pub use locator::Locator;
pub use overrides::{EnvOverrides, OverrideChain, OverrideSource, StaticOverrides};
