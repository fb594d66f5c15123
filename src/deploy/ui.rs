//! Display surface for the status lines a deploy produces.

use parking_lot::Mutex;

/// One-way sink for user-facing output.
pub trait Ui: Send + Sync {
    /// Write `line` followed by a newline.
    fn write_line(&self, line: &str);
}

/// Prints to stdout. Logs go to stderr, so stdout carries only this output.
#[derive(Debug, Default)]
pub struct ConsoleUi;

impl Ui for ConsoleUi {
    fn write_line(&self, line: &str) {
        println!("{}", line);
    }
}

/// Collects output in memory.
#[derive(Debug, Default)]
pub struct BufferUi {
    output: Mutex<String>,
}

impl BufferUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn output(&self) -> String {
        self.output.lock().clone()
    }
}

impl Ui for BufferUi {
    fn write_line(&self, line: &str) {
        let mut output = self.output.lock();
        output.push_str(line);
        output.push('\n');
    }
}
