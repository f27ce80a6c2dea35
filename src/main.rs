//! conwin - console window demo
//!
//! Starts the window system, shows the CP437 character chart in a bordered
//! window and echoes every decoded key until Escape is pressed.
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | Arrows | Move the selection |
//! | Home/End | First/last character |
//! | Insert | Toggle insert cursor |
//! | any character | Select that character |
//! | Esc | Quit |

use std::env;

use anyhow::{bail, Context};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use conwin::config::{BackendKind, Config};
use conwin::{codepage, Backend, BoxGlyphs, Console, Key, Style, TermBackend, Window};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Chart layout: 16x16 characters, one blank column between them
const CHART_COLS: u16 = 16;
const CHART_WIDTH: u16 = CHART_COLS * 2 + 1;
const CHART_HEIGHT: u16 = CHART_COLS + 2;

/// Command line options
#[derive(Default)]
struct Options {
    /// Force the crossterm backend
    term: bool,
}

fn print_help() {
    eprintln!("conwin {} - character-cell console windows", VERSION);
    eprintln!();
    eprintln!("Usage: conwin [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --term                Use the portable terminal backend");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.conwin/config.toml");
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options::default();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                eprintln!("conwin {}", VERSION);
                std::process::exit(0);
            }
            "--term" => options.term = true,
            arg => return Err(format!("Unknown argument: {}. Use -h for help.", arg)),
        }
    }
    Ok(options)
}

/// Log to a file; the console itself belongs to the windows
fn init_logging(config: &Config) {
    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = Config::load();
    init_logging(&config);
    info!("conwin {} starting", VERSION);

    let kind = if options.term {
        BackendKind::Term
    } else {
        config.input.backend
    };

    match kind {
        BackendKind::Term => run(TermBackend::new()?, &config),
        #[cfg(windows)]
        BackendKind::Auto | BackendKind::Win32 => run(conwin::Win32Backend::new()?, &config),
        #[cfg(not(windows))]
        BackendKind::Auto => run(TermBackend::new()?, &config),
        #[cfg(not(windows))]
        BackendKind::Win32 => bail!("The win32 backend is only available on Windows"),
    }
}

fn run<B: Backend>(backend: B, config: &Config) -> anyhow::Result<()> {
    let mut console = Console::startup(backend).context("Unable to initialize the console")?;
    let result = Demo::new(&mut console, config.border_glyphs())
        .and_then(|mut demo| demo.run(&mut console));
    console.shutdown();
    info!("conwin exiting");
    result
}

struct Demo {
    chart: Window,
    prompt: Window,
    selected: u8,
    insert: bool,
}

impl Demo {
    fn new<B: Backend>(console: &mut Console<B>, glyphs: BoxGlyphs) -> anyhow::Result<Self> {
        let (width, height) = console.screen_size();
        if width < CHART_WIDTH || height < CHART_HEIGHT + 2 {
            bail!(
                "Screen is {}x{}, need at least {}x{}",
                width,
                height,
                CHART_WIDTH,
                CHART_HEIGHT + 2
            );
        }
        info!("Screen size: {}x{}", width, height);

        let background = Window::new(0, 0, width, height, Style::Background);
        background.update(console, 0)?;

        let mut title = Window::new(0, 0, width, 1, Style::FileName);
        title.put(1, 0, format!("conwin {}", VERSION).as_bytes());
        title.put(width - 10, 0, b"CP437");
        title.put_attribs(width - 10, 0, Style::CurrentMode, 5);
        title.update(console, 0)?;

        let mut chart = Window::new(
            (width - CHART_WIDTH) / 2,
            1 + (height - 2 - CHART_HEIGHT) / 2,
            CHART_WIDTH,
            CHART_HEIGHT,
            Style::PromptBorder,
        );
        chart.border_with(&glyphs);
        chart.set_attribs(Style::FileWin);
        for byte in 0..=255u8 {
            let (x, y) = Self::chart_position(byte);
            chart.put_char(x, y, byte, 1);
        }
        chart.update(console, 0)?;

        let prompt = Window::new(0, height - 1, width, 1, Style::PromptWin);

        let mut demo = Self {
            chart,
            prompt,
            selected: b'A',
            insert: false,
        };
        demo.redraw(console, None)?;
        Ok(demo)
    }

    fn chart_position(byte: u8) -> (u16, u16) {
        let byte = byte as u16;
        (1 + (byte % CHART_COLS) * 2, 1 + byte / CHART_COLS)
    }

    fn run<B: Backend>(&mut self, console: &mut Console<B>) -> anyhow::Result<()> {
        loop {
            let key = console.read_key()?;
            let selected = self.selected;
            self.selected = match key {
                Key::Escape => return Ok(()),
                Key::Left => selected.wrapping_sub(1),
                Key::Right => selected.wrapping_add(1),
                Key::Up => selected.wrapping_sub(CHART_COLS as u8),
                Key::Down => selected.wrapping_add(CHART_COLS as u8),
                Key::Home => 0,
                Key::End => 255,
                Key::Insert => {
                    self.insert = !self.insert;
                    selected
                }
                Key::Char(0) => selected,
                Key::Char(c) => c,
                _ => selected,
            };
            self.redraw(console, Some(key))?;
        }
    }

    fn redraw<B: Backend>(
        &mut self,
        console: &mut Console<B>,
        key: Option<Key>,
    ) -> anyhow::Result<()> {
        // Interior only; the border stays on screen
        for row in 1..CHART_HEIGHT - 1 {
            self.chart.put_attribs(1, row, Style::FileWin, CHART_WIDTH - 2);
        }
        let (x, y) = Self::chart_position(self.selected);
        self.chart.put_attribs(x, y, Style::FileDiff, 1);
        self.chart.update(console, 1)?;

        self.prompt.clear();
        self.prompt.put(1, 0, b"Esc");
        self.prompt.put(5, 0, b"quit");
        self.prompt.put(11, 0, b"Ins");
        self.prompt.put(15, 0, b"cursor");
        self.prompt.put_attribs(1, 0, Style::PromptKey, 3);
        self.prompt.put_attribs(11, 0, Style::PromptKey, 3);

        self.prompt.put(23, 0, format!("0x{:02X}", self.selected).as_bytes());
        self.prompt.put_char(28, 0, self.selected, 1);
        if let Some(key) = key {
            let mut name = codepage::encode_lossy(&format!("{:?}", key));
            name.truncate((self.prompt.width() as usize).saturating_sub(31));
            self.prompt.put(30, 0, &name);
        }
        self.prompt.update(console, 0)?;

        console.show_cursor(self.insert);
        self.chart.set_cursor(console, x, y)?;
        Ok(())
    }
}
