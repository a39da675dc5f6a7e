//! Public-surface integration tests: detection, queries, and string
//! rendering through the crate's external API only.

use platform::{
  get, strings, CpuArchitecture, CpuMicroarchitecture, Error, StringKind, StringQuery,
};

#[test]
fn detection_succeeds_on_supported_hosts() {
  let info = get();
  assert!(info.logical_cores() >= 1);
  // Cache queries never fail, they report zero when unknown.
  for level in 0..=4 {
    let _ = info.data_cache_size(level);
    let _ = info.instruction_cache_size(level);
  }
}

#[test]
fn microarchitecture_identity_is_consistent() {
  let info = get();
  let march = info.microarchitecture();
  if march != CpuMicroarchitecture::Unknown {
    assert_eq!(march.architecture(), info.architecture());
    assert_eq!(march.vendor(), info.vendor());
  }
}

#[test]
fn string_rendering_round_trip() {
  let mut buffer = [0u8; 64];
  let written = platform::write_string(
    StringQuery::Architecture(CpuArchitecture::X86),
    StringKind::Ident,
    &mut buffer,
  )
  .unwrap();
  assert_eq!(&buffer[..written], b"x86");
}

#[test]
fn insufficient_buffer_reports_required_size() {
  let query = StringQuery::Microarchitecture(CpuMicroarchitecture::SandyBridge);
  let required = strings::lookup(query, StringKind::Description).unwrap().len();

  let mut short = vec![0u8; required - 1];
  assert_eq!(
    platform::write_string(query, StringKind::Description, &mut short),
    Err(Error::InsufficientBuffer { required })
  );

  let mut exact = vec![0u8; required];
  assert_eq!(platform::write_string(query, StringKind::Description, &mut exact), Ok(required));
}

#[test]
fn every_known_microarchitecture_renders() {
  for &march in CpuMicroarchitecture::all() {
    let query = StringQuery::Microarchitecture(march);
    assert!(strings::lookup(query, StringKind::Description).is_ok());
    assert!(strings::lookup(query, StringKind::Ident).is_ok());
  }
}
