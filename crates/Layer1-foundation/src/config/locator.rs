//! Locator Config - Locator 동작 설정
//!
//! 로드 순서 (뒤가 우선):
//! 1. 기본값
//! 2. 글로벌 설정 (`<config_dir>/locator/config.json`)
//! 3. 프로젝트 설정 (`./.locator/config.json`)
//! 4. 명시적으로 지정한 파일
//! 5. 환경 변수 (`LOCATOR_DEBUG`, `LOCATOR_DESCRIPTOR_DIR`)

use super::store::{load_path, JsonStore};
use crate::core::ModuleState;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// 설정 파일명
pub const CONFIG_FILE: &str = "config.json";

/// 기본 서비스 기술자 디렉토리
pub const DEFAULT_DESCRIPTOR_DIR: &str = "META-INF/services/";

/// 디버그 로깅 환경 변수
pub const ENV_DEBUG: &str = "LOCATOR_DEBUG";

/// 기술자 디렉토리 환경 변수
pub const ENV_DESCRIPTOR_DIR: &str = "LOCATOR_DESCRIPTOR_DIR";

// ============================================================================
// LocatorConfig
// ============================================================================

/// Locator 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocatorConfig {
    /// 상세 로깅
    pub debug: bool,

    /// 모듈 안에서 기술자를 찾을 디렉토리 (`/`로 끝남)
    pub descriptor_dir: String,

    /// 해석 실패도 캐시할지
    pub cache_failures: bool,

    /// 환경 변수 override 조회 여부
    pub consult_env: bool,

    /// factory id → 구현 타입 이름 고정
    pub overrides: BTreeMap<String, String>,

    /// 시작 시 스캔할 모듈 상태
    pub startup_states: Vec<ModuleState>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            debug: false,
            descriptor_dir: DEFAULT_DESCRIPTOR_DIR.to_string(),
            cache_failures: true,
            consult_env: true,
            overrides: BTreeMap::new(),
            startup_states: ModuleState::startup_defaults(),
        }
    }
}

/// 설정 파일 한 겹 (지정한 값만 덮어씀)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor_dir: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_failures: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consult_env: Option<bool>,

    /// 기존 항목에 병합됨
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_states: Option<Vec<ModuleState>>,
}

impl LocatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 글로벌 + 프로젝트 + 환경 변수 병합 로드
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// 명시적 설정 파일을 포함한 병합 로드
    pub fn load_with(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(layer) = global.load_optional::<ConfigLayer>(CONFIG_FILE)? {
                debug!("Loaded global config from {}", global.base_dir().display());
                config.merge(layer);
            }
        }

        // 2. 프로젝트 설정
        if let Ok(project) = JsonStore::current_project() {
            if let Some(layer) = project.load_optional::<ConfigLayer>(CONFIG_FILE)? {
                debug!("Loaded project config from {}", project.base_dir().display());
                config.merge(layer);
            }
        }

        // 3. 명시적 파일 (없으면 에러)
        if let Some(path) = explicit {
            config.merge(Self::load_file(path)?);
        }

        // 4. 환경 변수
        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// 설정 파일 한 겹 로드
    pub fn load_file(path: &Path) -> Result<ConfigLayer> {
        let layer = load_path(path)?;
        debug!("Loaded config from {}", path.display());
        Ok(layer)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 설정 한 겹 병합 (layer가 우선)
    pub fn merge(&mut self, layer: ConfigLayer) {
        if let Some(debug) = layer.debug {
            self.debug = debug;
        }
        if let Some(dir) = layer.descriptor_dir {
            self.descriptor_dir = normalize_dir(&dir);
        }
        if let Some(cache) = layer.cache_failures {
            self.cache_failures = cache;
        }
        if let Some(consult) = layer.consult_env {
            self.consult_env = consult;
        }
        self.overrides.extend(layer.overrides);
        if let Some(states) = layer.startup_states {
            self.startup_states = states;
        }
    }

    /// 환경 변수 적용
    ///
    /// `LOCATOR_DEBUG`는 `false`가 아닌 어떤 값이든 디버그를 켠다.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_DEBUG) {
            self.debug = value != "false";
        }
        if let Some(dir) = lookup(ENV_DESCRIPTOR_DIR) {
            if !dir.is_empty() {
                self.descriptor_dir = normalize_dir(&dir);
            }
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn descriptor_dir(mut self, dir: impl AsRef<str>) -> Self {
        self.descriptor_dir = normalize_dir(dir.as_ref());
        self
    }

    pub fn cache_failures(mut self, cache: bool) -> Self {
        self.cache_failures = cache;
        self
    }

    pub fn consult_env(mut self, consult: bool) -> Self {
        self.consult_env = consult;
        self
    }

    pub fn with_override(mut self, id: impl Into<String>, implementation: impl Into<String>) -> Self {
        self.overrides.insert(id.into(), implementation.into());
        self
    }

    pub fn startup_states(mut self, states: Vec<ModuleState>) -> Self {
        self.startup_states = states;
        self
    }
}

/// 디렉토리 경로는 항상 `/`로 끝나게
fn normalize_dir(dir: &str) -> String {
    let trimmed = dir.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LocatorConfig::default();
        assert!(!config.debug);
        assert_eq!(config.descriptor_dir, "META-INF/services/");
        assert!(config.cache_failures);
        assert!(config.consult_env);
        assert!(config.overrides.is_empty());
        assert_eq!(config.startup_states, ModuleState::startup_defaults());
    }

    #[test]
    fn test_merge_layer() {
        let mut config = LocatorConfig::new().with_override("a.Svc", "a.Impl");

        let layer: ConfigLayer = serde_json::from_str(
            r#"{
                "descriptorDir": "services",
                "cacheFailures": false,
                "overrides": { "b.Svc": "b.Impl" },
                "startupStates": ["active"]
            }"#,
        )
        .unwrap();
        config.merge(layer);

        assert_eq!(config.descriptor_dir, "services/");
        assert!(!config.cache_failures);
        assert!(config.consult_env);
        assert_eq!(config.overrides.len(), 2);
        assert_eq!(config.startup_states, vec![ModuleState::Active]);
    }

    #[test]
    fn test_apply_env() {
        let mut config = LocatorConfig::new();
        config.apply_env(|key| match key {
            ENV_DEBUG => Some("1".to_string()),
            ENV_DESCRIPTOR_DIR => Some("/custom/dir".to_string()),
            _ => None,
        });
        assert!(config.debug);
        assert_eq!(config.descriptor_dir, "custom/dir/");

        config.apply_env(|key| (key == ENV_DEBUG).then(|| "false".to_string()));
        assert!(!config.debug);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locator.json");
        std::fs::write(&path, r#"{ "debug": true }"#).unwrap();

        let layer = LocatorConfig::load_file(&path).unwrap();
        assert_eq!(layer.debug, Some(true));
        assert!(layer.descriptor_dir.is_none());

        assert!(LocatorConfig::load_file(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_full_config_roundtrip() {
        let config = LocatorConfig::new()
            .debug(true)
            .with_override("x.Svc", "x.Impl");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"descriptorDir\""));
        let parsed: LocatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
