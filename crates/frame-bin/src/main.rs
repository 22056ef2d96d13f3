//! Frame replay entrypoint.
//!
//! Loads configuration, builds a frame, replays a pointer/key script against
//! it and prints the resulting content, tick and selection rectangles.
use anyhow::{Context, Result};
use clap::Parser;
use core_config::{Config, load_from};
use core_events::{GestureEvent, InputEvent, POINTER_CHANNEL_CAP, PointerEvent};
use core_frame::{DirtyRanges, Frame, FrameOptions};
use core_geom::Point;
use core_input::{GestureMachine, spawn_gesture_task_with};
use core_text::FixedMetrics;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

mod script;

const LOG_FILE: &str = "frame.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "frame", version, about = "Replay pointer and key scripts against a text frame")]
struct Args {
    /// Script to replay. Reads standard input when omitted.
    pub script: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `frame.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Initial frame content.
    #[arg(long = "text", default_value = "")]
    pub text: String,
    /// Directory for `frame.log`.
    #[arg(long = "log-dir", default_value = ".")]
    pub log_dir: PathBuf,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self, log_dir: &Path) -> Result<()> {
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .with_ansi(false)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
            }
        }

        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

fn frame_options(config: &Config) -> FrameOptions {
    let f = &config.file;
    FrameOptions {
        origin: Point::new(f.layout.origin_x, f.layout.origin_y),
        size: Point::new(f.layout.width, f.layout.height),
        wrap: f.layout.wrap,
        box_slots: f.boxes.initial,
        box_capacity: f.boxes.capacity,
        metrics: Arc::new(FixedMetrics::new(f.metrics.advance, f.metrics.line_height)),
    }
}

/// Sequential owner of one frame. Pointer bursts go through the gesture
/// task; keys and resizes between bursts apply once the burst has drained.
struct Runtime {
    frame: Frame,
    machine: Option<GestureMachine>,
    pending: Vec<PointerEvent>,
    gestures: usize,
    dirty: DirtyRanges,
}

impl Runtime {
    fn new(frame: Frame, machine: GestureMachine) -> Self {
        Self {
            frame,
            machine: Some(machine),
            pending: Vec::new(),
            gestures: 0,
            dirty: DirtyRanges::new(),
        }
    }

    async fn replay(&mut self, events: Vec<InputEvent>) -> Result<()> {
        let total = events.len();
        for ev in events {
            match ev {
                InputEvent::Pointer(p) => self.pending.push(p),
                InputEvent::Key(k) => {
                    self.flush_pointer().await?;
                    self.frame.handle_key(k)?;
                }
                InputEvent::Resize(size) => {
                    self.flush_pointer().await?;
                    self.frame.resize(size);
                }
            }
            self.collect_dirty();
        }
        self.flush_pointer().await?;
        info!(
            target: "runtime",
            events = total,
            gestures = self.gestures,
            len = self.frame.len(),
            "replay_complete"
        );
        Ok(())
    }

    async fn flush_pointer(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let machine = self.machine.take().unwrap_or_default();
        let (tx, rx) = mpsc::channel::<PointerEvent>(POINTER_CHANNEL_CAP);
        let (handle, _shutdown) = spawn_gesture_task_with(rx, Vec::<GestureEvent>::new(), machine);
        let burst = self.pending.len();
        for ev in self.pending.drain(..) {
            tx.send(ev).await.context("gesture task stopped early")?;
        }
        drop(tx);
        let (gestures, machine) = handle.await.context("gesture task failed")?;
        self.machine = Some(machine);
        debug!(target: "runtime", pointer_events = burst, gestures = gestures.len(), "burst_drained");
        for g in gestures {
            self.gestures += 1;
            self.frame.handle_gesture(g)?;
            self.collect_dirty();
        }
        Ok(())
    }

    fn collect_dirty(&mut self) {
        for r in self.frame.take_dirty() {
            self.dirty.mark(r);
        }
    }

    /// Print the final state; damage is merged over the whole replay.
    fn report(&mut self, out: &mut impl Write) -> Result<()> {
        let (p0, p1) = self.frame.addr();
        writeln!(out, "content: {:?}", String::from_utf8_lossy(&self.frame.bytes()))?;
        writeln!(out, "tick: {p0}..{p1}")?;
        for r in self.frame.rects() {
            writeln!(out, "rect: {},{} {}x{}", r.min.x, r.min.y, r.dx(), r.dy())?;
        }
        if !self.frame.clipboard().is_empty() {
            writeln!(
                out,
                "clipboard: {:?}",
                String::from_utf8_lossy(self.frame.clipboard().bytes())
            )?;
        }
        let dirty: Vec<String> = self
            .dirty
            .take(self.frame.len())
            .iter()
            .map(|r| format!("{}..{}", r.start, r.end))
            .collect();
        writeln!(out, "dirty: [{}]", dirty.join(", "))?;
        Ok(())
    }
}

fn read_script(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("reading script {}", p.display())),
        None => {
            let mut s = String::new();
            io::stdin()
                .read_to_string(&mut s)
                .context("reading script from stdin")?;
            Ok(s)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    startup.configure_logging(&args.log_dir)?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let config = load_from(args.config.clone())?;
    let config_path = config.path.as_ref().map(|p| p.display().to_string());
    info!(
        target: "runtime.startup",
        config_path = config_path.as_deref(),
        config_override = args.config.is_some(),
        "config_loaded"
    );

    let text = read_script(args.script.as_deref())?;
    let events = script::parse(&text, Instant::now())?;

    let mut frame = Frame::new(frame_options(&config));
    frame.insert(args.text.as_bytes(), 0)?;
    frame.take_dirty();
    let machine = GestureMachine::new(config.file.input.double_click());
    let mut runtime = Runtime::new(frame, machine);
    runtime.replay(events).await?;

    let stdout = io::stdout();
    runtime.report(&mut stdout.lock())?;
    info!(target: "runtime", "shutdown");
    Ok(())
}
