/// Execution classes used to label spawned work in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work a user is waiting on: option lookups, debounced writes.
	Interactive,
	/// Work that can lag without visible effect.
	Background,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
		}
	}
}
