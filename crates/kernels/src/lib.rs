//! Dispatched numerical kernels.
//!
//! Each kernel owns a [`dispatch::DispatchTable`] of compiled variants
//! and resolves its selection once, on first use, against the detected
//! CPU. The portable fallback is always present, so every kernel works
//! on every machine; detection only decides how fast.
//!
//! `selected_implementation()` on each module names the variant in use,
//! for diagnostics:
//!
//! ```ignore
//! println!("dot product backend: {}", kernels::dot::selected_implementation());
//! ```

pub mod add;
pub mod dot;
pub mod poly;
