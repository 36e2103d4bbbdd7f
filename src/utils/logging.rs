//! 로깅 초기화 모듈
//!
//! 모든 로그는 JSON 한 줄로 stderr에 출력됩니다. stdout은 `check`/`notify`
//! 명령의 결과 출력용입니다. Cloud Run처럼 파일 시스템이 휘발성인 환경에서는
//! `LOG_DIR=off`로 일별 파일 출력을 끌 수 있습니다.

use std::path::PathBuf;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILTER: &str = "info,invoice_monitor=debug";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// 파일명 형식: `invoice-monitor.log.YYYY-MM-DD`
pub const LOG_FILE_PREFIX: &str = "invoice-monitor.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directives
    pub filter: String,
    /// Directory of the daily file, `None` when file output is off
    pub file_dir: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("RUST_LOG").ok(),
            std::env::var("LOG_DIR").ok(),
        )
    }

    fn from_vars(rust_log: Option<String>, log_dir: Option<String>) -> Self {
        let filter = rust_log
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let file_dir = match log_dir.as_deref().map(str::trim) {
            None => Some(PathBuf::from(DEFAULT_LOG_DIR)),
            Some("") | Some("off") | Some("none") => None,
            Some(dir) => Some(PathBuf::from(dir)),
        };

        Self { filter, file_dir }
    }
}

fn json_layer<S, W>(writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .flatten_event(false)
        .with_ansi(false)
        .with_writer(writer)
        .boxed()
}

/// 로깅 시스템을 초기화합니다.
///
/// 파일 출력이 켜져 있으면 `WorkerGuard`를 반환합니다. main에서 유지해야
/// 종료 시 버퍼링된 로그가 손실되지 않습니다.
pub fn init_logging() -> Option<WorkerGuard> {
    let settings = LogSettings::from_env();

    // 잘못된 RUST_LOG는 기본 필터로 대체
    let filter = EnvFilter::try_new(&settings.filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (file_layer, guard) = match &settings.file_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(rolling::daily(dir, LOG_FILE_PREFIX));
            (Some(json_layer(writer)), Some(guard))
        }
        None => (None, None),
    };

    // 이미 전역 subscriber가 있으면 그대로 사용
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer(std::io::stderr))
        .with(file_layer)
        .try_init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_use_defaults_when_unset() {
        let settings = LogSettings::from_vars(None, None);

        assert_eq!(settings.filter, DEFAULT_LOG_FILTER);
        assert_eq!(settings.file_dir, Some(PathBuf::from("logs")));
    }

    #[test]
    fn should_disable_file_output_with_off() {
        // Arrange
        let rust_log = Some("warn".to_string());

        // Act
        let settings = LogSettings::from_vars(rust_log, Some("off".to_string()));

        // Assert
        assert_eq!(settings.filter, "warn");
        assert!(settings.file_dir.is_none());
    }

    #[test]
    fn should_treat_blank_values_as_unset_filter_and_no_file() {
        let settings = LogSettings::from_vars(Some("  ".to_string()), Some("".to_string()));

        assert_eq!(settings.filter, DEFAULT_LOG_FILTER);
        assert!(settings.file_dir.is_none());
    }

    #[test]
    fn should_write_to_configured_directory() {
        let settings = LogSettings::from_vars(None, Some("/var/log/monitor".to_string()));

        assert_eq!(settings.file_dir, Some(PathBuf::from("/var/log/monitor")));
    }
}
