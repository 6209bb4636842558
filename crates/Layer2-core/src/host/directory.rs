//! Directory Module - 파일 시스템 디렉토리를 모듈로 사용
//!
//! ```text
//! my-module/
//! ├── module.json                     # { "name", "types", "imports" }
//! └── META-INF/services/
//!     └── com.example.Svc             # 첫 줄: 구현 타입 이름
//! ```

use super::{dir_path, owned_path, TypeSpace};
use locator_foundation::{
    Error, Module, ModuleId, ResourceUrl, Result, TypeHandle, TypeLoadError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// 매니페스트 파일명
pub const MANIFEST_FILE: &str = "module.json";

/// 디렉토리 모듈 매니페스트
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleManifest {
    /// 표시 이름 (없으면 디렉토리 이름)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// 모듈이 정의하는 타입
    #[serde(default)]
    pub types: Vec<String>,

    /// 가져온 타입 → 정의 모듈
    #[serde(default)]
    pub imports: BTreeMap<String, ModuleId>,
}

/// 디렉토리 기반 모듈
#[derive(Debug, Clone)]
pub struct DirectoryModule {
    id: ModuleId,
    name: String,
    root: PathBuf,
    types: TypeSpace,
}

impl DirectoryModule {
    /// 디렉토리를 모듈로 연다 (매니페스트는 선택)
    pub fn load(id: ModuleId, root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Module(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let manifest_path = root.join(MANIFEST_FILE);
        let manifest = if manifest_path.exists() {
            let content = std::fs::read_to_string(&manifest_path)?;
            serde_json::from_str::<ModuleManifest>(&content).map_err(|e| {
                Error::Module(format!(
                    "Failed to parse {}: {}",
                    manifest_path.display(),
                    e
                ))
            })?
        } else {
            ModuleManifest::default()
        };

        let name = manifest.name.clone().unwrap_or_else(|| {
            root.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("module-{}", id))
        });

        let types = TypeSpace {
            defined: manifest.types.into_iter().collect(),
            imports: manifest.imports,
            rejected: BTreeMap::new(),
        };

        debug!(
            "Opened directory module {} ({}) at {}",
            id,
            name,
            root.display()
        );

        Ok(Self {
            id,
            name,
            root,
            types,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 모듈 내부 경로 → 파일 시스템 경로 (루트 밖으로 나가지 못함)
    fn resolve_path(&self, path: &str) -> std::io::Result<PathBuf> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid entry path: {}", path),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl Module for DirectoryModule {
    fn id(&self) -> ModuleId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self, path: &str) -> std::io::Result<Vec<ResourceUrl>> {
        let dir = dir_path(path);
        let fs_dir = self.resolve_path(&dir)?;

        let read_dir = match std::fs::read_dir(&fs_dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let entry_path = if entry.file_type()?.is_dir() {
                format!("{}{}/", dir, name)
            } else {
                format!("{}{}", dir, name)
            };
            entries.push(ResourceUrl::for_entry(self.id, &entry_path));
        }
        entries.sort();
        Ok(entries)
    }

    fn open(&self, url: &ResourceUrl) -> std::io::Result<Box<dyn Read + Send>> {
        let path = owned_path(self.id, url)?;
        let file = std::fs::File::open(self.resolve_path(path)?)?;
        Ok(Box::new(file))
    }

    fn load_type(&self, name: &str) -> std::result::Result<TypeHandle, TypeLoadError> {
        self.types.load(self.id, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_module(root: &Path) {
        fs::create_dir_all(root.join("META-INF/services/nested")).unwrap();
        fs::write(
            root.join("META-INF/services/com.example.Svc"),
            "com.example.impl.A\n",
        )
        .unwrap();
        fs::write(
            root.join(MANIFEST_FILE),
            r#"{
                "name": "impl-a",
                "types": ["com.example.impl.A"],
                "imports": { "com.example.Svc": 1 }
            }"#,
        )
        .unwrap();
    }

    #[test]
    fn test_open_with_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write_module(dir.path());

        let module = DirectoryModule::load(ModuleId(2), dir.path()).unwrap();
        assert_eq!(module.name(), "impl-a");
        assert_eq!(
            module.load_type("com.example.impl.A").unwrap().origin(),
            ModuleId(2)
        );
        assert_eq!(
            module.load_type("com.example.Svc").unwrap().origin(),
            ModuleId(1)
        );
        assert!(module.load_type("other.Type").is_err());
    }

    #[test]
    fn test_entries_and_open() {
        let dir = tempfile::tempdir().unwrap();
        write_module(dir.path());
        let module = DirectoryModule::load(ModuleId(5), dir.path()).unwrap();

        let entries = module.entries("META-INF/services/").unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|u| u.is_directory()));

        let file = entries.iter().find(|u| !u.is_directory()).unwrap();
        assert_eq!(file.base_name(), "com.example.Svc");

        let mut content = String::new();
        module.open(file).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "com.example.impl.A\n");
    }

    #[test]
    fn test_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let module = DirectoryModule::load(ModuleId(7), dir.path()).unwrap();
        assert!(module.entries("META-INF/services/").unwrap().is_empty());
        assert!(!module.name().is_empty());
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let module = DirectoryModule::load(ModuleId(8), dir.path()).unwrap();
        let url = ResourceUrl::for_entry(ModuleId(8), "../secret");
        assert!(module.open(&url).is_err());
    }

    #[test]
    fn test_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, "x").unwrap();
        assert!(DirectoryModule::load(ModuleId(9), &file).is_err());
    }
}
