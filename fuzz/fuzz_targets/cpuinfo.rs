//! Fuzz the `/proc/cpuinfo` parser: no input may panic, and parsing must
//! be a pure function of the text.

#![no_main]

use libfuzzer_sys::fuzz_target;
use platform::probe::procfs;

fuzz_target!(|data: &[u8]| {
  let Ok(text) = core::str::from_utf8(data) else {
    return;
  };
  let first = procfs::parse(text);
  let second = procfs::parse(text);
  assert_eq!(first, second);
  // Processor counts are bounded by the number of lines.
  assert!(first.processors as usize <= text.lines().count());
});
