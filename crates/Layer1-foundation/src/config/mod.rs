//! Config - Locator 설정 관리
//!
//! - `store.rs` - JSON 설정 파일 저장소 (글로벌/프로젝트 디렉토리)
//! - `locator.rs` - LocatorConfig 병합 설정

mod locator;
mod store;

pub use locator::{
    ConfigLayer, LocatorConfig, CONFIG_FILE, DEFAULT_DESCRIPTOR_DIR, ENV_DEBUG, ENV_DESCRIPTOR_DIR,
};
pub use store::JsonStore;
