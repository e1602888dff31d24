//! Binding model for the traced program
//!
//! This module provides the two structures the trace visualizes:
//! - [`table`]: the symbol table — an insertion-ordered, capacity-bounded
//!   mapping from variable name to a typed, possibly-uninitialized value
//! - [`scope`]: the scope stack — an ordered record of declaration events
//!   used to retract names from the table when a lexical block ends
//!
//! # Update-on-redeclare
//!
//! A name appears at most once in the table. Re-declaring an existing name
//! overwrites its type and value in place; the entry count is unchanged.
//! Plain assignment relies on this to re-type a variable to `int`.
//!
//! # Bounded capacity
//!
//! Both structures carry explicit, configurable capacity limits enforced at
//! the API boundary. Exceeding a limit is reported ([`table::TableFull`],
//! [`scope::ScopeError`]), never silently dropped.

pub mod scope;
pub mod table;
