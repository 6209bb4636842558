//! Locator CLI - Main entry point
//!
//! 모듈 디렉토리들을 프로세스 내 호스트에 설치하고, 추적기를 돌린 뒤
//! 레지스트리에 질의한다.

mod output;

use clap::{Parser, Subcommand};
use locator_core::{
    DirectoryModule, LocalHost, Locator, ModuleTracker, OverrideChain, StaticOverrides,
};
use locator_foundation::{Error, LocatorConfig, ModuleHost};
use output::Report;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Locator - 모듈 기반 서비스 팩토리 조회 도구
#[derive(Parser, Debug)]
#[command(name = "locator")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Additional config file (merged after global and project config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Do not consult environment variables for overrides
    #[arg(long, global = true)]
    no_env: bool,

    /// Pin a factory id to an implementation (ID=IMPL, repeatable)
    #[arg(long = "override", value_name = "ID=IMPL", global = true, value_parser = parse_override)]
    overrides: Vec<(String, String)>,

    /// Descriptor directory inside each module
    #[arg(long, global = true)]
    descriptor_dir: Option<String>,

    /// Print JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the descriptors each module contributes
    Scan {
        #[command(flatten)]
        modules: ModuleArgs,
    },
    /// Find the preferred implementation for a factory id
    Locate {
        /// Factory id
        id: String,
        #[command(flatten)]
        modules: ModuleArgs,
    },
    /// Find every implementation for a factory id
    LocateAll {
        /// Factory id
        id: String,
        #[command(flatten)]
        modules: ModuleArgs,
    },
    /// List registered factory ids
    Ids {
        #[command(flatten)]
        modules: ModuleArgs,
    },
}

#[derive(clap::Args, Debug)]
struct ModuleArgs {
    /// Module directory (repeatable, later modules take precedence)
    #[arg(short, long = "module", value_name = "DIR", required = true)]
    modules: Vec<PathBuf>,
}

impl Command {
    fn modules(&self) -> &[PathBuf] {
        match self {
            Command::Scan { modules }
            | Command::Locate { modules, .. }
            | Command::LocateAll { modules, .. }
            | Command::Ids { modules } => &modules.modules,
        }
    }
}

fn parse_override(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((id, implementation)) if !id.is_empty() && !implementation.is_empty() => {
            Ok((id.to_string(), implementation.to_string()))
        }
        _ => Err(format!("expected ID=IMPL, got '{}'", raw)),
    }
}

/// 종료 코드: 조회 결과 없음
const EXIT_MISS: i32 = 1;
/// 종료 코드: 입력/설정 에러
const EXIT_ERROR: i32 = 2;

fn main() {
    let args = Args::parse();
    match run(args) {
        Ok(report) if report.is_miss() => std::process::exit(EXIT_MISS),
        Ok(_) => {}
        Err(err) => {
            eprintln!("{}", error_message(&err));
            std::process::exit(exit_code(&err));
        }
    }
}

/// 사용자용 에러는 메시지만, 그 외에는 원인 체인까지
fn error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<Error>() {
        Some(e) if e.is_user_facing() => format!("error: {}", e),
        _ => format!("error: {:?}", err),
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<Error>() {
        Some(e) if e.is_not_found() => EXIT_MISS,
        _ => EXIT_ERROR,
    }
}

fn run(args: Args) -> anyhow::Result<Report> {
    // Load configuration
    let mut config = LocatorConfig::load_with(args.config.as_deref())?;
    if args.debug {
        config.debug = true;
    }
    if args.no_env {
        config.consult_env = false;
    }
    if let Some(dir) = &args.descriptor_dir {
        config = config.descriptor_dir(dir);
    }

    // Initialize logging
    let log_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Effective config: {:?}", config);

    // 명령줄 override가 가장 우선
    let mut overrides = OverrideChain::from_config(&config);
    if !args.overrides.is_empty() {
        let pins = args
            .overrides
            .iter()
            .fold(StaticOverrides::new(), |pins, (id, implementation)| {
                pins.with(id.clone(), implementation.clone())
            });
        overrides = overrides.prepend(Arc::new(pins));
    }

    let host = Arc::new(LocalHost::new());
    let locator = Arc::new(Locator::with_overrides(Arc::new(overrides)));
    let tracker = Arc::new(ModuleTracker::from_config(locator.clone(), &config));
    tracker.start(host.clone())?;

    for dir in args.command.modules() {
        let module = DirectoryModule::load(host.next_module_id(), dir)?;
        let id = host.install(Arc::new(module))?;
        host.start(id)?;
    }

    let report = match &args.command {
        Command::Scan { .. } => Report::scan(&host.modules(), &tracker),
        Command::Locate { id, .. } => Report::locate(id, locator.locate(id)),
        Command::LocateAll { id, .. } => Report::locate_all(id, locator.locate_all(id)),
        Command::Ids { .. } => Report::ids(&locator),
    };

    tracker.stop();

    report.print(args.json)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use locator_foundation::ModuleId;

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("a.Svc=a.Impl").unwrap(),
            ("a.Svc".to_string(), "a.Impl".to_string())
        );
        assert!(parse_override("a.Svc").is_err());
        assert!(parse_override("=a.Impl").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "locator",
            "locate",
            "com.example.Svc",
            "--module",
            "m1",
            "-m",
            "m2",
            "--override",
            "com.example.Svc=impl.A",
            "--json",
        ])
        .unwrap();

        assert!(args.json);
        assert_eq!(args.overrides.len(), 1);
        assert_eq!(args.command.modules().len(), 2);
        assert!(matches!(args.command, Command::Locate { ref id, .. } if id == "com.example.Svc"));
    }

    #[test]
    fn test_error_exit_codes() {
        let missing = anyhow::Error::from(Error::ModuleNotFound(ModuleId(4)));
        assert_eq!(exit_code(&missing), EXIT_MISS);
        assert_eq!(error_message(&missing), "error: Module not found: 4");

        let bad_config = anyhow::Error::from(Error::Config("bad".to_string()));
        assert_eq!(exit_code(&bad_config), EXIT_ERROR);
        assert_eq!(error_message(&bad_config), "error: Configuration error: bad");

        let io = anyhow::Error::from(Error::Io(std::io::Error::other("disk")));
        assert_eq!(exit_code(&io), EXIT_ERROR);
        // 사용자용이 아니면 원인 체인까지 출력
        let message = error_message(&io);
        assert!(message.starts_with("error: IO error: disk"));
        assert!(message.contains("Caused by:"));
    }

    #[test]
    fn test_module_required() {
        assert!(Args::try_parse_from(["locator", "ids"]).is_err());
    }
}
