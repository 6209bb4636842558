//! Core Module - 호스트 모듈 계약
//!
//! - `types.rs`: 값 타입 (ModuleId, ResourceUrl, TypeHandle, ModuleState)
//! - `traits.rs`: 호스트가 구현하는 인터페이스 (Module, ModuleHost, ModuleListener)

pub mod traits;
pub mod types;

pub use traits::{HostedModule, Module, ModuleHost, ModuleListener};
pub use types::{ModuleId, ModuleState, ResourceUrl, TypeHandle};
