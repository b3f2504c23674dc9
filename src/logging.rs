//! Logging setup: stderr plus an optional size-rotated log file.

use chrono::Local;
use env_logger::{Builder, Env, Target};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_DIR: &str = "/var/log/antecflux";
pub const LOG_FILE_NAME: &str = "antec_display.log";
/// Rotate once the file would grow past 10 MiB
pub const LOG_MAX_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub verbose: bool,
    /// `None` logs to stderr only
    pub file: Option<PathBuf>,
}

/// `/var/log/antecflux/antec_display.log`
pub fn default_log_path() -> PathBuf {
    Path::new(DEFAULT_LOG_DIR).join(LOG_FILE_NAME)
}

/// Initialize logging. `RUST_LOG` takes precedence over `verbose`.
pub fn init(options: &LogOptions) {
    let default_filter = if options.verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.args()
        )
    });

    let mut fallback_note = None;
    if let Some(path) = &options.file {
        let (file, note) = open_log_file(path);
        fallback_note = note;
        if let Some(file) = file {
            builder.target(Target::Pipe(Box::new(Tee { file })));
        }
    }

    // A second init (e.g. from tests) keeps the first logger
    if builder.try_init().is_err() {
        return;
    }

    if let Some(note) = fallback_note {
        log::warn!("{}", note);
    }
    log::info!("Logging system initialized");
}

/// Open the log file, falling back to the working directory when its
/// directory cannot be created.
fn open_log_file(path: &Path) -> (Option<RotatingFile>, Option<String>) {
    let dir_ok = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).is_ok(),
        _ => true,
    };

    if dir_ok {
        if let Ok(file) = RotatingFile::open(path, LOG_MAX_BYTES) {
            return (Some(file), None);
        }
    }

    let fallback = PathBuf::from(LOG_FILE_NAME);
    let note = format!(
        "Permission denied when creating log file {}, using {}",
        path.display(),
        fallback.display()
    );
    (RotatingFile::open(&fallback, LOG_MAX_BYTES).ok(), Some(note))
}

/// Writes every log line to stderr and the rotating file.
struct Tee {
    file: RotatingFile,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = io::stderr().write_all(buf);
        // losing the file must not take stderr logging down with it
        let _ = self.file.write_all(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        self.file.flush()
    }
}

/// Append-only file that moves itself to `<name>.1` once it reaches
/// `max_bytes`, keeping a single backup.
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    file: File,
    written: u64,
}

impl RotatingFile {
    pub fn open(path: &Path, max_bytes: u64) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            max_bytes,
            file,
            written,
        })
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".1");
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        fs::rename(&self.path, self.backup_path())?;
        self.file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
