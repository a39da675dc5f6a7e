//! Fuzz the kernel-log SoC parser.

#![no_main]

use libfuzzer_sys::fuzz_target;
use platform::probe::klog;

fuzz_target!(|data: &[u8]| {
  let Ok(text) = core::str::from_utf8(data) else {
    return;
  };
  let info = klog::parse(text);
  // A recovered model string always came out of the input text.
  if let Some(model) = &info.model {
    assert!(!model.is_empty());
  }
});
