//! Qualified names for arbitrary callables
//!
//! The instrumentation layer names metrics after the function it wraps. In
//! Rust the compiler already knows a unique path for every function item
//! and closure, exposed through [`std::any::type_name`].

/// Qualified name of a callable's type
///
/// Function items resolve to their full path (`my_crate::handlers::login`),
/// closures to the enclosing path followed by `::{{closure}}`. Function
/// pointers only carry their signature (`fn(u32) -> u32`), so wrap the
/// function item itself when the name matters.
pub fn qualified_name_of<F: ?Sized>(_callable: &F) -> &'static str {
    std::any::type_name::<F>()
}
