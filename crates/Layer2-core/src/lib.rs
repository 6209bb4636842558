//! locator-core: 동적 서비스 팩토리 레지스트리
//!
//! Layer2 - 호스트 모듈이 제공하는 서비스 기술자를 추적하고 조회하는 레이어
//!
//! # 주요 모듈
//!
//! - `loader`: 기술자 하나에 대한 지연 로더 (한 번만 해석)
//! - `scanner`: 모듈의 기술자 디렉토리 스캔 → 등록 그룹
//! - `registry`: factory id → 후보 로더 레지스트리 (override, 계약 검사)
//! - `tracker`: 호스트 모듈 도착/떠남을 레지스트리에 반영
//! - `finder`: 호출자 모듈 관점의 fallback 체인
//! - `host`: 번들 호스트 (LocalHost, StaticModule, DirectoryModule)
//!
//! # 사용 예시
//!
//! ```ignore
//! use locator_core::{Locator, ModuleTracker, ModuleScanner, LocalHost, StaticModule};
//!
//! let host = Arc::new(LocalHost::new());
//! let locator = Arc::new(Locator::new());
//! let tracker = Arc::new(ModuleTracker::new(locator.clone(), ModuleScanner::new()));
//! tracker.start(host.clone())?;
//!
//! let id = host.install(Arc::new(
//!     StaticModule::builder(1)
//!         .service("com.example.Svc", "com.example.impl.A")
//!         .defines("com.example.impl.A")
//!         .build(),
//! ))?;
//! host.resolve(id)?;
//!
//! let handle = locator.locate("com.example.Svc");
//! ```

pub mod finder;
pub mod host;
pub mod loader;
pub mod registry;
pub mod scanner;
pub mod tracker;

// Re-exports: Loader / Scanner
pub use loader::{FactoryLoader, ResolveError};
pub use scanner::{ModuleScanner, RegistrationGroup};

// Re-exports: Registry
pub use registry::{
    Contract, EnvOverrides, Locator, OverrideChain, OverrideSource, StaticOverrides,
};

// Re-exports: Tracker / Finder
pub use finder::FactoryFinder;
pub use tracker::ModuleTracker;

// Re-exports: Host
pub use host::{
    DirectoryModule, LocalHost, ModuleManifest, StaticModule, StaticModuleBuilder, TypeSpace,
    MANIFEST_FILE,
};
