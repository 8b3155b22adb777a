use std::fmt;

bitflags::bitflags! {
	/// What a symbol table lets callers do with an id.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Access: u8 {
		/// Add the id, or overwrite its slot.
		const ADD = 1 << 0;
		/// Look the id up directly.
		const QUERY = 1 << 1;
		/// List the id in bulk views.
		const ENUMERATE = 1 << 2;
		/// Remove the id.
		const REMOVE = 1 << 3;
		/// Carry the id over when a table is copied or merged.
		const COPY = 1 << 4;
		/// Render the id when a table is printed.
		const PRINT = 1 << 5;
	}
}

/// Access policy of a [`SymbolId`](super::SymbolId).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
	/// Never added, never found. Also the visibility of the none id.
	Invisible,
	/// Addressable by id but hidden from bulk views; not inherited by sub-types.
	Private,
	#[default]
	Public,
}

impl Visibility {
	pub const fn access(self) -> Access {
		match self {
			Self::Invisible => Access::empty(),
			Self::Private => Access::ADD
				.union(Access::QUERY)
				.union(Access::REMOVE)
				.union(Access::COPY)
				.union(Access::PRINT),
			Self::Public => Access::all(),
		}
	}

	pub const fn allows(self, access: Access) -> bool {
		self.access().contains(access)
	}

	/// One-character sigil used when printing tables.
	pub const fn sigil(self) -> &'static str {
		match self {
			Self::Invisible => "-",
			Self::Private => "#",
			Self::Public => "+",
		}
	}
}

impl fmt::Display for Visibility {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.sigil())
	}
}
