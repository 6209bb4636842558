//! 질의 결과 출력 (텍스트 / JSON)

use locator_core::{Locator, ModuleTracker};
use locator_foundation::{HostedModule, ModuleId, ModuleState, TypeHandle};
use serde::Serialize;

/// 모듈 하나의 스캔 결과
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleReport {
    pub id: ModuleId,
    pub name: String,
    pub state: ModuleState,
    pub factory_ids: Vec<String>,
}

/// 명령 결과
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Scan {
        modules: Vec<ModuleReport>,
    },
    Locate {
        id: String,
        found: Option<TypeHandle>,
    },
    LocateAll {
        id: String,
        found: Vec<TypeHandle>,
    },
    Ids {
        ids: Vec<IdReport>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct IdReport {
    pub id: String,
    pub candidates: usize,
}

impl Report {
    pub fn scan(modules: &[HostedModule], tracker: &ModuleTracker) -> Self {
        let modules = modules
            .iter()
            .map(|hosted| ModuleReport {
                id: hosted.id(),
                name: hosted.module.name().to_string(),
                state: hosted.state,
                factory_ids: tracker.contributions(hosted.id()).unwrap_or_default(),
            })
            .collect();
        Report::Scan { modules }
    }

    pub fn locate(id: &str, found: Option<TypeHandle>) -> Self {
        Report::Locate {
            id: id.to_string(),
            found,
        }
    }

    pub fn locate_all(id: &str, found: Vec<TypeHandle>) -> Self {
        Report::LocateAll {
            id: id.to_string(),
            found,
        }
    }

    pub fn ids(locator: &Locator) -> Self {
        let ids = locator
            .factory_ids()
            .into_iter()
            .map(|id| IdReport {
                candidates: locator.candidates(&id).len(),
                id,
            })
            .collect();
        Report::Ids { ids }
    }

    /// 조회 결과가 비었는지 (종료 코드용)
    pub fn is_miss(&self) -> bool {
        match self {
            Report::Locate { found, .. } => found.is_none(),
            Report::LocateAll { found, .. } => found.is_empty(),
            _ => false,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        match self {
            Report::Scan { modules } => {
                for m in modules {
                    out.push_str(&format!("[{}] {} ({})\n", m.id, m.name, m.state));
                    for id in &m.factory_ids {
                        out.push_str(&format!("  {}\n", id));
                    }
                }
            }
            Report::Locate { id, found } => match found {
                Some(handle) => {
                    out.push_str(&format!("{} (module {})\n", handle, handle.origin()))
                }
                None => out.push_str(&format!("No provider for {}\n", id)),
            },
            Report::LocateAll { id, found } => {
                if found.is_empty() {
                    out.push_str(&format!("No provider for {}\n", id));
                }
                for handle in found {
                    out.push_str(&format!("{} (module {})\n", handle, handle.origin()));
                }
            }
            Report::Ids { ids } => {
                for entry in ids {
                    out.push_str(&format!("{} ({})\n", entry.id, entry.candidates));
                }
            }
        }
        out
    }

    pub fn print(&self, json: bool) -> anyhow::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
        } else {
            print!("{}", self.render_text());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_text_and_json() {
        let hit = Report::locate("a.Svc", Some(TypeHandle::new("a.Impl", ModuleId(2))));
        assert_eq!(hit.render_text(), "a.Impl (module 2)\n");
        assert!(!hit.is_miss());

        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["kind"], "locate");
        assert_eq!(json["found"]["name"], "a.Impl");
        assert_eq!(json["found"]["origin"], 2);

        let miss = Report::locate("a.Svc", None);
        assert!(miss.is_miss());
        assert_eq!(miss.render_text(), "No provider for a.Svc\n");
    }

    #[test]
    fn test_locate_all_order_preserved() {
        let report = Report::locate_all(
            "a.Svc",
            vec![
                TypeHandle::new("a.B", ModuleId(2)),
                TypeHandle::new("a.A", ModuleId(1)),
            ],
        );
        assert_eq!(report.render_text(), "a.B (module 2)\na.A (module 1)\n");
    }
}
