use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// How `invokevirtual` collects the receiver and arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvokeArgs {
    /// Pop as many values as the method descriptor declares, then the receiver.
    #[default]
    Descriptor,
    /// Drain the whole operand stack; the bottom value is the receiver.
    DrainStack,
}

/// Destination of `System.out` / `System.err`.
#[derive(Debug, Clone)]
pub enum OutputSink {
    Stdout,
    Stderr,
    Buffer(Arc<Mutex<Vec<u8>>>),
}

impl OutputSink {
    pub fn buffer() -> OutputSink {
        OutputSink::Buffer(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn write_str(&self, text: &str) -> io::Result<()> {
        match self {
            OutputSink::Stdout => io::stdout().lock().write_all(text.as_bytes()),
            OutputSink::Stderr => io::stderr().lock().write_all(text.as_bytes()),
            OutputSink::Buffer(buffer) => {
                buffer.lock().extend_from_slice(text.as_bytes());
                Ok(())
            }
        }
    }

    /// Buffered output so far; `None` for process streams.
    pub fn contents(&self) -> Option<String> {
        match self {
            OutputSink::Buffer(buffer) => Some(String::from_utf8_lossy(&buffer.lock()).into_owned()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VmOptions {
    pub max_call_depth: usize,
    pub invoke_args: InvokeArgs,
    pub stdout: OutputSink,
    pub stderr: OutputSink,
}

impl Default for VmOptions {
    fn default() -> Self {
        VmOptions {
            max_call_depth: 1024,
            invoke_args: InvokeArgs::default(),
            stdout: OutputSink::Stdout,
            stderr: OutputSink::Stderr,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::vm_options::{InvokeArgs, OutputSink, VmOptions};

    #[test]
    fn buffer_sink_collects_output() {
        let sink = OutputSink::buffer();
        let clone = sink.clone();
        sink.write_str("hello ").unwrap();
        clone.write_str("world").unwrap();
        assert_eq!(Some("hello world".to_string()), sink.contents());
        assert_eq!(None, OutputSink::Stdout.contents());
    }

    #[test]
    fn defaults() {
        let options = VmOptions::default();
        assert_eq!(1024, options.max_call_depth);
        assert_eq!(InvokeArgs::Descriptor, options.invoke_args);
    }
}
