//! One-time variant selection.
//!
//! Selection is resolved once per logical function and the result treated
//! as immutable. The cache is a `OnceLock`, so a concurrent first use
//! from several threads runs the selector at most once and every caller
//! observes the same variant.

use std::sync::OnceLock;

use crate::table::Selected;

/// A lazily-selected function variant.
///
/// # Example
///
/// ```ignore
/// static KERNEL: Dispatcher<fn(&[f64]) -> f64> = Dispatcher::new(|| TABLE.select(&Selection::current()));
///
/// pub fn compute(data: &[f64]) -> f64 {
///     (KERNEL.get().func)(data)
/// }
/// ```
pub struct Dispatcher<F: Copy + 'static> {
  cell: OnceLock<Selected<F>>,
  selector: fn() -> Selected<F>,
}

impl<F: Copy + 'static> Dispatcher<F> {
  /// Create a dispatcher around a selector run on first use.
  #[must_use]
  pub const fn new(selector: fn() -> Selected<F>) -> Self {
    Self {
      cell: OnceLock::new(),
      selector,
    }
  }

  /// The selected variant, resolving it on the first call.
  #[inline]
  #[must_use]
  pub fn get(&self) -> Selected<F> {
    *self.cell.get_or_init(|| (self.selector)())
  }

  /// Diagnostic name of the selected variant.
  #[inline]
  #[must_use]
  pub fn selected_name(&self) -> &'static str {
    self.get().name
  }
}
