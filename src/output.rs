#[cfg(test)]
use parking_lot::Mutex;

/// Abstraction over user-facing output.
///
/// Command modules use this trait instead of `println!`/`eprintln!` so that
/// output can be captured in tests.
pub trait UserOutput: Send + Sync {
    /// Informational status message (e.g., "Validating seeding.yaml...")
    fn status(&self, message: &str);

    /// Success message (e.g., "Seeding plan is valid")
    fn success(&self, message: &str);

    /// Warning message
    fn warning(&self, message: &str);

    /// Error message
    fn error(&self, message: &str);

    /// A blank line separator.
    fn blank(&self);
}

/// Writes to stdout/stderr with ANSI colors.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn success(&self, message: &str) {
        println!("\x1b[32m{}\x1b[0m", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("\x1b[33m{}\x1b[0m", message);
    }

    fn error(&self, message: &str) {
        eprintln!("\x1b[31m{}\x1b[0m", message);
    }

    fn blank(&self) {
        println!();
    }
}

/// Records every line instead of printing it.
#[cfg(test)]
#[derive(Default)]
pub struct CapturedOutput {
    lines: Mutex<Vec<String>>,
}

#[cfg(test)]
impl CapturedOutput {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

#[cfg(test)]
impl UserOutput for CapturedOutput {
    fn status(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }

    fn success(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }

    fn warning(&self, message: &str) {
        self.lines.lock().push(format!("warning: {}", message));
    }

    fn error(&self, message: &str) {
        self.lines.lock().push(format!("error: {}", message));
    }

    fn blank(&self) {
        self.lines.lock().push(String::new());
    }
}
