//! Frame configuration loading.
//!
//! Parses `frame.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [layout]
//! wrap = 600
//! origin_x = 0
//! origin_y = 0
//! width = 640
//! height = 480
//!
//! [boxes]
//! initial = 25
//! capacity = 25
//!
//! [metrics]
//! advance = 8
//! line_height = 16
//!
//! [input]
//! double_click_ms = 333
//! ```
//!
//! Every field is optional. A missing file yields defaults; a file that fails
//! to parse is reported at `warn` and also yields defaults. Unknown fields are
//! ignored. Values outside their usable range are clamped by
//! [`Config::apply_limits`], which logs each adjustment on the `config` target.

use anyhow::Result;
use serde::Deserialize;
use std::io::ErrorKind;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{debug, info, warn};

pub const CONFIG_FILE_NAME: &str = "frame.toml";

const MAX_DIMENSION: i32 = 16_384;
const MAX_DOUBLE_CLICK_MS: u64 = 5_000;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    pub wrap: i32,
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            wrap: 600,
            origin_x: 0,
            origin_y: 0,
            width: 640,
            height: 480,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BoxesConfig {
    /// Box slots reserved up front.
    pub initial: usize,
    /// Bytes per box before insertion spills into a new box.
    pub capacity: usize,
}

impl Default for BoxesConfig {
    fn default() -> Self {
        Self {
            initial: 25,
            capacity: 25,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MetricsConfig {
    pub advance: i32,
    pub line_height: i32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            advance: 8,
            line_height: 16,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_double_click_ms")] // a third of a second
    pub double_click_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            double_click_ms: Self::default_double_click_ms(),
        }
    }
}

impl InputConfig {
    const fn default_double_click_ms() -> u64 {
        333
    }

    pub fn double_click(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub boxes: BoxesConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub path: Option<PathBuf>,
}

/// Best-effort config path: `frame.toml` in the working directory, then the
/// platform config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("frame").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(target: "config", path = %path.display(), "config file not found; using defaults");
            return Ok(Config::default());
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config file unreadable; using defaults");
            return Ok(Config::default());
        }
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let mut cfg = Config {
                raw: Some(content),
                file,
                path: Some(path),
            };
            cfg.apply_limits();
            Ok(cfg)
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config parse failed; using defaults");
            Ok(Config::default())
        }
    }
}

fn clamp_field<T>(field: &'static str, value: &mut T, lo: T, hi: T) -> bool
where
    T: Copy + Ord + std::fmt::Display,
{
    let clamped = (*value).clamp(lo, hi);
    if clamped == *value {
        return false;
    }
    info!(target: "config", field, raw = %value, clamped = %clamped, "config_value_clamped");
    *value = clamped;
    true
}

impl Config {
    /// Clamp every value into its usable range. Returns true when anything
    /// changed.
    pub fn apply_limits(&mut self) -> bool {
        let f = &mut self.file;
        let mut changed = false;
        changed |= clamp_field("layout.width", &mut f.layout.width, 1, MAX_DIMENSION);
        changed |= clamp_field("layout.height", &mut f.layout.height, 1, MAX_DIMENSION);
        changed |= clamp_field("layout.origin_x", &mut f.layout.origin_x, 0, f.layout.width - 1);
        changed |= clamp_field("layout.origin_y", &mut f.layout.origin_y, 0, f.layout.height - 1);
        let max_wrap = f.layout.width - f.layout.origin_x;
        changed |= clamp_field("layout.wrap", &mut f.layout.wrap, 1, max_wrap);
        changed |= clamp_field("boxes.initial", &mut f.boxes.initial, 1, usize::MAX);
        changed |= clamp_field("boxes.capacity", &mut f.boxes.capacity, 1, usize::MAX);
        changed |= clamp_field("metrics.advance", &mut f.metrics.advance, 1, MAX_DIMENSION);
        changed |= clamp_field("metrics.line_height", &mut f.metrics.line_height, 1, MAX_DIMENSION);
        changed |= clamp_field(
            "input.double_click_ms",
            &mut f.input.double_click_ms,
            0,
            MAX_DOUBLE_CLICK_MS,
        );
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn capture<F: FnOnce()>(level: Level, f: F) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        let out = buffer.lock().unwrap().clone();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.file.boxes.capacity, 25);
        assert_eq!(cfg.file.input.double_click(), Duration::from_millis(333));
    }

    #[test]
    fn parses_all_sections() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[layout]\nwrap = 300\norigin_x = 4\norigin_y = 6\nwidth = 320\nheight = 200\n\
             [boxes]\ninitial = 64\ncapacity = 16\n\
             [metrics]\nadvance = 7\nline_height = 13\n\
             [input]\ndouble_click_ms = 250\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let f = &cfg.file;
        assert_eq!(
            f.layout,
            LayoutConfig {
                wrap: 300,
                origin_x: 4,
                origin_y: 6,
                width: 320,
                height: 200
            }
        );
        assert_eq!(f.boxes, BoxesConfig { initial: 64, capacity: 16 });
        assert_eq!(f.metrics, MetricsConfig { advance: 7, line_height: 13 });
        assert_eq!(f.input.double_click_ms, 250);
        assert_eq!(cfg.path.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[layout]\nwidth = 800\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.layout.width, 800);
        assert_eq!(cfg.file.layout.wrap, 600);
        assert_eq!(cfg.file.metrics, MetricsConfig::default());
    }

    #[test]
    fn clamp_logging_uses_config_target() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[layout]\nwidth = 100\nwrap = 500\n[boxes]\ncapacity = 0\n",
        )
        .unwrap();
        let path = tmp.path().to_path_buf();
        let mut cfg = Config::default();
        let log_output = capture(Level::INFO, || {
            cfg = load_from(Some(path)).unwrap();
        });
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("config_value_clamped"));
        assert!(log_output.contains("layout.wrap"));
        assert_eq!(cfg.file.layout.wrap, 100);
        assert_eq!(cfg.file.boxes.capacity, 1);
        assert!(!cfg.apply_limits());
    }

    #[test]
    fn parse_error_warns_and_falls_back() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[layout\nwrap = \"wide\"\n").unwrap();
        let path = tmp.path().to_path_buf();
        let mut cfg = Config::default();
        let log_output = capture(Level::WARN, || {
            cfg = load_from(Some(path)).unwrap();
        });
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config parse failed"));
        assert_eq!(cfg.file, ConfigFile::default());
    }

    #[test]
    fn origin_limits_follow_dimensions() {
        let mut cfg = Config::default();
        cfg.file.layout.origin_x = 700;
        cfg.file.layout.origin_y = -3;
        assert!(cfg.apply_limits());
        assert_eq!(cfg.file.layout.origin_x, 639);
        assert_eq!(cfg.file.layout.origin_y, 0);
        assert_eq!(cfg.file.layout.wrap, 1);
    }
}
