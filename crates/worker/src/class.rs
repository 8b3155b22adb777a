/// Execution classes used to route deferred work and label it in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskClass {
	/// Latency-sensitive work a caller is likely to wait on right away.
	#[default]
	Interactive,
	/// Work that can be delayed behind interactive requests.
	Background,
	/// Blocking I/O work executed on blocking pools or dedicated threads.
	IoBlocking,
	/// CPU-intensive blocking work executed on blocking pools or dedicated threads.
	CpuBlocking,
}

impl TaskClass {
	/// Stable label used in trace fields and thread names.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
			Self::IoBlocking => "io_blocking",
			Self::CpuBlocking => "cpu_blocking",
		}
	}

	/// Returns true for classes that are expected to block their thread.
	pub const fn is_blocking(self) -> bool {
		matches!(self, Self::IoBlocking | Self::CpuBlocking)
	}
}

impl std::fmt::Display for TaskClass {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
