//! `/proc/cpuinfo` parsing.
//!
//! The file is line-oriented `key[ ]*:[ ]value` text, one blank-line
//! separated block per core, with a trailing block of machine-wide keys.
//! The parser is a pure function over the text so it can be fed synthetic
//! and corrupt inputs; the file read is a thin wrapper.
//!
//! Malformed lines (no `:`, empty key, empty value, non-numeric digits
//! where a number is expected) are skipped without disturbing fields that
//! earlier lines already populated. Unknown keys are ignored: kernels
//! disagree about the exact key set, and patched vendor kernels add keys
//! of their own.

/// Feature flags from the `Features` / `ASEs implemented` lists.
///
/// Field names follow the kernel's flag spellings. `valid` records whether
/// a flag list was seen at all: an absent list is different from an empty
/// one on kernels that omit the line entirely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct FeatureFlags {
  pub swp: bool,
  pub half: bool,
  pub thumb: bool,
  pub twenty_six_bit: bool,
  pub fastmult: bool,
  pub fpa: bool,
  pub vfp: bool,
  pub edsp: bool,
  pub java: bool,
  pub iwmmxt: bool,
  pub crunch: bool,
  pub thumbee: bool,
  pub neon: bool,
  pub vfpv3: bool,
  pub vfpv3d16: bool,
  pub tls: bool,
  pub vfpv4: bool,
  pub idiva: bool,
  pub idivt: bool,
  // MIPS ASEs
  pub dsp: bool,
  pub dsp2: bool,
  pub msa: bool,
  /// Whether a flag list was present in the input.
  pub valid: bool,
}

/// Decoded `CPU architecture` field: a decimal version plus suffix letters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArchVersion {
  /// Numeric architecture version (e.g. 7 for ARMv7).
  pub version: u32,
  /// `T` suffix: Thumb.
  pub thumb: bool,
  /// `E` suffix: DSP extension.
  pub dsp: bool,
  /// `J` suffix: Jazelle.
  pub jazelle: bool,
  /// Whether the field was present and started with a digit.
  pub valid: bool,
}

/// Legacy cache geometry keys exported by pre-v7 ARM kernels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct LegacyCacheInfo {
  pub i_size: u32,
  pub i_assoc: u32,
  pub i_line_length: u32,
  pub i_sets: u32,
  pub d_size: u32,
  pub d_assoc: u32,
  pub d_line_length: u32,
  pub d_sets: u32,
  /// Whether any cache key parsed successfully.
  pub valid: bool,
}

/// Everything this library reads out of `/proc/cpuinfo`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcCpuInfo {
  /// Count of `processor : <n>` records.
  pub processors: u32,
  /// `CPU implementer`: the MIDR implementer byte (an ASCII vendor code).
  pub implementer: u32,
  /// `CPU variant`: 4-bit MIDR field.
  pub variant: u32,
  /// `CPU part`: 12-bit MIDR part code.
  pub part: u32,
  /// `CPU revision`: decimal revision.
  pub revision: u32,
  /// `CPU architecture` version and suffixes.
  pub architecture: ArchVersion,
  /// Feature flag list.
  pub features: FeatureFlags,
  /// Legacy cache geometry (old kernels only).
  pub cache: LegacyCacheInfo,
}

/// Parse a complete `/proc/cpuinfo` text.
#[must_use]
pub fn parse(text: &str) -> ProcCpuInfo {
  let mut info = ProcCpuInfo::default();
  for line in text.lines() {
    parse_line(line, &mut info);
  }
  info
}

/// Read and parse the live `/proc/cpuinfo`.
#[cfg(target_os = "linux")]
pub fn read() -> Result<ProcCpuInfo, crate::Error> {
  let text = std::fs::read_to_string("/proc/cpuinfo").map_err(|err| {
    crate::Error::System(err.raw_os_error().unwrap_or(0))
  })?;
  Ok(parse(&text))
}

fn parse_line(line: &str, info: &mut ProcCpuInfo) {
  let Some((raw_key, raw_value)) = line.split_once(':') else {
    return;
  };
  let key = raw_key.trim_end_matches([' ', '\t']);
  let value = raw_value.trim_matches(' ');
  if key.is_empty() || value.is_empty() {
    return;
  }

  match key {
    "processor" => {
      // Only count records whose value is a plain CPU index.
      if value.bytes().all(|b| b.is_ascii_digit()) {
        info.processors += 1;
      }
    }
    "Features" | "ASEs implemented" => parse_flags(value, &mut info.features),
    "CPU implementer" | "CPU implementor" => {
      // MIDR assigns 8 bits: hex prefix plus one or two digits.
      if let Some(v) = parse_hex(value, 1, 2) {
        info.implementer = v;
      }
    }
    "CPU variant" => {
      // MIDR assigns 4 bits: exactly one hex digit.
      if let Some(v) = parse_hex(value, 1, 1) {
        info.variant = v;
      }
    }
    "CPU part" => {
      // MIDR assigns 12 bits: one to three hex digits.
      if let Some(v) = parse_hex(value, 1, 3) {
        info.part = v;
      }
    }
    "CPU revision" => {
      if let Some(v) = parse_decimal(value) {
        info.revision = v;
      }
    }
    "CPU architecture" => parse_architecture(value, &mut info.architecture),
    "I size" => parse_cache_number(value, &mut info.cache.i_size, &mut info.cache.valid),
    "I assoc" => parse_cache_number(value, &mut info.cache.i_assoc, &mut info.cache.valid),
    "I line length" => parse_cache_number(value, &mut info.cache.i_line_length, &mut info.cache.valid),
    "I sets" => parse_cache_number(value, &mut info.cache.i_sets, &mut info.cache.valid),
    "D size" => parse_cache_number(value, &mut info.cache.d_size, &mut info.cache.valid),
    "D assoc" => parse_cache_number(value, &mut info.cache.d_assoc, &mut info.cache.valid),
    "D line length" => parse_cache_number(value, &mut info.cache.d_line_length, &mut info.cache.valid),
    "D sets" => parse_cache_number(value, &mut info.cache.d_sets, &mut info.cache.valid),
    _ => {}
  }
}

/// Parse a `0x`-prefixed hex field of `min`..=`max` digits.
fn parse_hex(value: &str, min: usize, max: usize) -> Option<u32> {
  let digits = value.strip_prefix("0x")?;
  if digits.len() < min || digits.len() > max {
    return None;
  }
  u32::from_str_radix(digits, 16).ok()
}

fn parse_decimal(value: &str) -> Option<u32> {
  if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  value.parse().ok()
}

fn parse_cache_number(value: &str, field: &mut u32, valid: &mut bool) {
  if let Some(v) = parse_decimal(value) {
    *field = v;
    *valid = true;
  }
}

/// `CPU architecture` is a decimal version optionally followed by suffix
/// letters, e.g. `5TEJ`. Kernels have also been seen reporting `AArch64`;
/// a value that does not start with a digit leaves the field invalid.
fn parse_architecture(value: &str, arch: &mut ArchVersion) {
  let digits_end = value.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(value.len());
  if let Some(version) = parse_decimal(&value[..digits_end]) {
    if version != 0 {
      arch.version = version;
      arch.valid = true;
    }
  }
  for suffix in value[digits_end..].bytes() {
    match suffix {
      b'T' => arch.thumb = true,
      b'E' => arch.dsp = true,
      b'J' => arch.jazelle = true,
      _ => {}
    }
  }
}

fn parse_flags(value: &str, flags: &mut FeatureFlags) {
  flags.valid = true;
  for word in value.split(' ').filter(|w| !w.is_empty()) {
    match word {
      "swp" => flags.swp = true,
      "half" => flags.half = true,
      "thumb" => flags.thumb = true,
      "26bit" => flags.twenty_six_bit = true,
      "fastmult" => flags.fastmult = true,
      "fpa" => flags.fpa = true,
      "vfp" => flags.vfp = true,
      "edsp" => flags.edsp = true,
      "java" => flags.java = true,
      "iwmmxt" => flags.iwmmxt = true,
      "crunch" => flags.crunch = true,
      "thumbee" => flags.thumbee = true,
      "neon" => flags.neon = true,
      "vfpv3" => flags.vfpv3 = true,
      "vfpv3d16" => flags.vfpv3d16 = true,
      "tls" => flags.tls = true,
      "vfpv4" => flags.vfpv4 = true,
      "idiva" => flags.idiva = true,
      "idivt" => flags.idivt = true,
      "dsp" => flags.dsp = true,
      "dsp2" => flags.dsp2 = true,
      "msa" => flags.msa = true,
      _ => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const PANDABOARD: &str = "\
Processor       : ARMv7 Processor rev 10 (v7l)
processor       : 0
BogoMIPS        : 1392.74

processor       : 1
BogoMIPS        : 1363.33

Features        : swp half thumb fastmult vfp edsp thumbee neon vfpv3
CPU implementer : 0x41
CPU architecture: 7
CPU variant     : 0x2
CPU part        : 0xc09
CPU revision    : 10

Hardware        : OMAP4 Panda board
Revision        : 0020
Serial          : 0000000000000000
";

  #[test]
  fn parses_pandaboard() {
    let info = parse(PANDABOARD);
    assert_eq!(info.processors, 2);
    assert_eq!(info.implementer, 0x41);
    assert_eq!(info.variant, 0x2);
    assert_eq!(info.part, 0xC09);
    assert_eq!(info.revision, 10);
    assert!(info.architecture.valid);
    assert_eq!(info.architecture.version, 7);
    assert!(info.features.valid);
    assert!(info.features.neon);
    assert!(info.features.vfpv3);
    assert!(!info.features.vfpv4);
    assert!(!info.cache.valid);
  }

  #[test]
  fn parse_is_idempotent() {
    assert_eq!(parse(PANDABOARD), parse(PANDABOARD));
  }

  #[test]
  fn architecture_suffixes() {
    let mut arch = ArchVersion::default();
    parse_architecture("5TEJ", &mut arch);
    assert_eq!(arch.version, 5);
    assert!(arch.thumb && arch.dsp && arch.jazelle);

    let mut aarch64 = ArchVersion::default();
    parse_architecture("AArch64", &mut aarch64);
    assert!(!aarch64.valid);
  }

  #[test]
  fn malformed_lines_do_not_disturb_earlier_fields() {
    let text = "\
CPU implementer : 0x41
no separator on this line
   : 0x99
CPU part :
CPU part        : 0xc0f
CPU variant     : 0xZZ
CPU revision    : 2a
";
    let info = parse(text);
    assert_eq!(info.implementer, 0x41);
    assert_eq!(info.part, 0xC0F);
    // The corrupt variant and revision lines parse to nothing.
    assert_eq!(info.variant, 0);
    assert_eq!(info.revision, 0);
  }

  #[test]
  fn hex_field_width_limits() {
    // Part is at most three hex digits (12-bit MIDR field).
    assert_eq!(parse_hex("0xc09", 1, 3), Some(0xC09));
    assert_eq!(parse_hex("0x1c09", 1, 3), None);
    assert_eq!(parse_hex("c09", 1, 3), None);
    assert_eq!(parse_hex("0x", 1, 3), None);
  }

  #[test]
  fn legacy_cache_keys() {
    let text = "\
I size          : 16384
I assoc         : 4
I line length   : 32
I sets          : 128
D size          : 16384
D assoc         : 4
D line length   : 32
D sets          : 128
";
    let info = parse(text);
    assert!(info.cache.valid);
    assert_eq!(info.cache.i_size, 16384);
    assert_eq!(info.cache.d_line_length, 32);
  }

  #[test]
  fn mips_ase_list() {
    let info = parse("ASEs implemented        : dsp dsp2 msa\n");
    assert!(info.features.valid);
    assert!(info.features.dsp && info.features.dsp2 && info.features.msa);
  }

  #[test]
  fn processor_value_must_be_numeric() {
    // x86-style "processor : 0" counts; ARM's "Processor : ARMv7 ..." must not.
    let info = parse("processor : 0\nprocessor : abc\n");
    assert_eq!(info.processors, 1);
  }
}

#[cfg(all(test, not(miri)))]
mod proptests {
  use proptest::prelude::*;

  use super::*;

  proptest! {
    /// No input panics the parser.
    #[test]
    fn never_panics(text in "\\PC{0,400}") {
      let _ = parse(&text);
    }

    /// Parsing is a pure function of the text.
    #[test]
    fn idempotent(text in "\\PC{0,400}") {
      prop_assert_eq!(parse(&text), parse(&text));
    }

    /// A corrupt line interleaved among valid ones never erases the
    /// fields the valid lines establish.
    #[test]
    fn corrupt_line_is_inert(noise in "[^:\n]{0,40}") {
      let text = format!(
        "CPU implementer : 0x41\n{noise}\nCPU part        : 0xc09\n"
      );
      let info = parse(&text);
      prop_assert_eq!(info.implementer, 0x41);
      prop_assert_eq!(info.part, 0xC09);
    }
  }
}
