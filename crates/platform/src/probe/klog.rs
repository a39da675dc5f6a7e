//! Kernel ring-buffer parsing for SoC identification.
//!
//! ARM SoCs rarely put a marketable name into `/proc/cpuinfo`, but most
//! board support code prints one into the kernel log at boot. This module
//! reads the ring buffer (best effort: it routinely fails on locked-down
//! systems, which is not an error) and scans it for the handful of vendor
//! banner formats that identify a SoC:
//!
//! - `OMAP<ddd(d)> ...`             (Texas Instruments)
//! - `CPU EXYNOS<dddd> ...`         (Samsung)
//! - `CPU S3...` / `CPU S5...`      (Samsung, older)
//! - `Tegra ...`                    (nVidia)
//! - `CPU is i.MX<NN> ...`          (Freescale)
//! - `Machine: sun<N>i`             (Allwinner / Boxchip)
//! - `Machine: RK<NN>board`         (Rockchip)
//!
//! Parsing is pure over the text; only [`read`] touches the OS.

use crate::ident::CpuMicroarchitecture;

/// SoC vendor identified from the kernel log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
#[allow(missing_docs)]
pub enum SocVendor {
  #[default]
  Unknown,
  Samsung,
  Nvidia,
  TexasInstruments,
  Freescale,
  Rockchip,
  Boxchip,
  Allwinner,
}

impl SocVendor {
  /// Vendor display name, empty for `Unknown`.
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Unknown => "",
      Self::Samsung => "Samsung",
      Self::Nvidia => "nVidia",
      Self::TexasInstruments => "TI",
      Self::Freescale => "FreeScale",
      Self::Rockchip => "Rockchip",
      Self::Boxchip => "Boxchip",
      Self::Allwinner => "Allwinner",
    }
  }
}

/// Machine identifier seen in a `Machine:` line, when the log names a
/// board family rather than a SoC model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
#[allow(missing_docs)]
pub enum SocBoard {
  #[default]
  Unknown,
  Rk28Board,
  Rk29Board,
  Rk30Board,
  Rk31Board,
  Sun3i,
  Sun4i,
  Sun5i,
  Sun6i,
  Sun7i,
}

/// Result of the kernel-log scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KernelLogInfo {
  /// SoC vendor, if any banner matched.
  pub vendor: SocVendor,
  /// Board family, when the log only names the board.
  pub board: SocBoard,
  /// SoC model string recovered verbatim from the log (e.g. "OMAP 4460").
  pub model: Option<String>,
}

impl KernelLogInfo {
  /// Recover a SoC model from the board family plus decoded CPU facts.
  ///
  /// Board identifiers map to a single silicon model often enough that the
  /// microarchitecture and core count pin it down.
  #[must_use]
  pub fn board_model(&self, march: CpuMicroarchitecture, cores: u32) -> Option<&'static str> {
    use CpuMicroarchitecture as M;

    match (self.board, march, cores) {
      // RK2806/RK2808A/RK2818 are all ARM9 parts.
      (SocBoard::Rk28Board, M::Arm9, _) => Some("RK28xx"),
      (SocBoard::Rk29Board, M::CortexA8, _) => Some("RK2918"),
      (SocBoard::Rk29Board, M::CortexA9, 1) => Some("RK2928"),
      (SocBoard::Rk30Board, M::CortexA9, 2) => Some("RK3066"),
      (SocBoard::Rk31Board, M::CortexA9, 4) => Some("RK3188"),
      (SocBoard::Sun3i, M::Arm9, _) => Some("F20"),
      (SocBoard::Sun4i, M::CortexA8, _) => Some("A10"),
      (SocBoard::Sun5i, M::CortexA8, _) => Some("A13"),
      (SocBoard::Sun6i, M::CortexA7, 4) => Some("A31"),
      (SocBoard::Sun7i, M::CortexA7, 2) => Some("A20"),
      _ => None,
    }
  }
}

/// Scan a complete kernel log text.
#[must_use]
pub fn parse(text: &str) -> KernelLogInfo {
  let mut info = KernelLogInfo::default();
  for line in text.lines() {
    parse_line(line, &mut info);
  }
  info
}

/// Read the kernel ring buffer.
///
/// Requires `CAP_SYSLOG` or a permissive `dmesg_restrict`; denial maps to
/// [`Error::UnsupportedSoftware`](crate::Error::UnsupportedSoftware) so
/// callers treat it as "no name available", not a failure.
#[cfg(target_os = "linux")]
#[allow(unsafe_code)] // klogctl has no std wrapper
pub fn read() -> Result<String, crate::Error> {
  use crate::Error;

  const SYSLOG_ACTION_READ_ALL: libc::c_int = 3;
  const SYSLOG_ACTION_SIZE_BUFFER: libc::c_int = 10;

  // SAFETY: SIZE_BUFFER takes no buffer.
  let size = unsafe { libc::klogctl(SYSLOG_ACTION_SIZE_BUFFER, core::ptr::null_mut(), 0) };
  if size < 0 {
    let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
    return Err(match errno {
      libc::EPERM | libc::EACCES => Error::UnsupportedSoftware,
      other => Error::System(other),
    });
  }

  let mut buffer = vec![0u8; size as usize];
  // SAFETY: the buffer is valid for `size` bytes.
  let read = unsafe { libc::klogctl(SYSLOG_ACTION_READ_ALL, buffer.as_mut_ptr().cast(), size) };
  if read < 0 {
    let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
    return Err(match errno {
      libc::EPERM | libc::EACCES => Error::UnsupportedSoftware,
      other => Error::System(other),
    });
  }
  buffer.truncate(read as usize);

  Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn parse_line(line: &str, info: &mut KernelLogInfo) {
  let message = strip_prefixes(line);

  let mut words = message.split([' ', '\t']).filter(|w| !w.is_empty());
  let Some(first) = words.next() else {
    return;
  };

  if let Some(model) = parse_omap(first) {
    info.vendor = SocVendor::TexasInstruments;
    info.model = Some(model);
    return;
  }

  match first {
    "Tegra" => {
      // nVidia's banner carries no model number worth keeping.
      if info.vendor == SocVendor::Unknown {
        info.vendor = SocVendor::Nvidia;
      }
    }
    "Machine:" => {
      if let Some(word) = words.next() {
        parse_machine(word, info);
      }
    }
    "CPU" => {
      let Some(second) = words.next() else {
        return;
      };
      if second == "is" {
        // FreeScale: "CPU is i.MX53 Revision 2.1"
        if let Some(model) = words.next().and_then(parse_imx) {
          info.vendor = SocVendor::Freescale;
          info.model = Some(model);
        }
      } else if let Some(model) = parse_exynos(second) {
        info.vendor = SocVendor::Samsung;
        info.model = Some(model);
      } else if is_samsung_sx(second) {
        info.vendor = SocVendor::Samsung;
        info.model = Some(second.to_owned());
      }
    }
    _ => {}
  }
}

/// Strip the `<level>` and `[timestamp]` prefixes plus leading whitespace.
fn strip_prefixes(line: &str) -> &str {
  let mut rest = line;
  if let Some(after) = rest.strip_prefix('<') {
    match after.split_once('>') {
      Some((_, tail)) => rest = tail,
      None => return "",
    }
  }
  let trimmed = rest.trim_start_matches([' ', '\t']);
  if let Some(after) = trimmed.strip_prefix('[') {
    match after.split_once(']') {
      Some((_, tail)) => rest = tail,
      None => return "",
    }
  } else {
    rest = trimmed;
  }
  rest.trim_start_matches([' ', '\t'])
}

/// `OMAP<ddd>` or `OMAP<dddd>`, possibly with a suffix (`OMAP4460-ES1.1`).
fn parse_omap(word: &str) -> Option<String> {
  let digits = word.strip_prefix("OMAP")?;
  let count = digits.bytes().take_while(u8::is_ascii_digit).count();
  if count == 3 || count == 4 {
    Some(format!("OMAP {}", &digits[..count]))
  } else {
    None
  }
}

/// `EXYNOS<dddd>` (uppercased in the log; reported as "Exynos NNNN").
fn parse_exynos(word: &str) -> Option<String> {
  let model = word.strip_prefix("EXYNOS")?;
  if model.is_empty() {
    None
  } else {
    Some(format!("Exynos {model}"))
  }
}

/// Older Samsung SoCs: `S3...`/`S5...` model words (e.g. "S5PC110").
fn is_samsung_sx(word: &str) -> bool {
  word.len() > 6 && (word.starts_with("S3") || word.starts_with("S5"))
}

/// `i.MX<NN>...` (reported as "i.MX NN...").
fn parse_imx(word: &str) -> Option<String> {
  let model = word.strip_prefix("i.MX")?;
  if model.is_empty() {
    None
  } else {
    Some(format!("i.MX {model}"))
  }
}

fn parse_machine(word: &str, info: &mut KernelLogInfo) {
  // Allwinner/Boxchip: "sun<N>i".
  if word.len() == 5 && word.starts_with("sun") && word.ends_with('i') {
    let (vendor, board) = match word.as_bytes()[3] {
      b'3' => (SocVendor::Boxchip, SocBoard::Sun3i),
      b'4' => (SocVendor::Allwinner, SocBoard::Sun4i),
      b'5' => (SocVendor::Allwinner, SocBoard::Sun5i),
      b'6' => (SocVendor::Allwinner, SocBoard::Sun6i),
      b'7' => (SocVendor::Allwinner, SocBoard::Sun7i),
      b'8' | b'9' => (SocVendor::Allwinner, SocBoard::Unknown),
      _ => return,
    };
    info.vendor = vendor;
    info.board = board;
    return;
  }

  // Rockchip: "RK<NN>board".
  if word.len() == 9 && word.starts_with("RK") && word.ends_with("board") {
    let digits = &word.as_bytes()[2..4];
    if !digits.iter().all(u8::is_ascii_digit) {
      return;
    }
    info.vendor = SocVendor::Rockchip;
    info.board = match digits {
      b"28" => SocBoard::Rk28Board,
      b"29" => SocBoard::Rk29Board,
      b"30" => SocBoard::Rk30Board,
      b"31" => SocBoard::Rk31Board,
      _ => SocBoard::Unknown,
    };
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn omap_banner() {
    let info = parse("<6>[    0.000000] OMAP4460 ES1.1 (l2cache iva sgx)\n");
    assert_eq!(info.vendor, SocVendor::TexasInstruments);
    assert_eq!(info.model.as_deref(), Some("OMAP 4460"));
  }

  #[test]
  fn exynos_banner() {
    let info = parse("[    0.000000] CPU EXYNOS4412 (id 0xe4412011)\n");
    assert_eq!(info.vendor, SocVendor::Samsung);
    assert_eq!(info.model.as_deref(), Some("Exynos 4412"));
  }

  #[test]
  fn imx_banner() {
    let info = parse("CPU is i.MX53 Revision 2.1\n");
    assert_eq!(info.vendor, SocVendor::Freescale);
    assert_eq!(info.model.as_deref(), Some("i.MX 53"));
  }

  #[test]
  fn samsung_sx_banner() {
    let info = parse("CPU S5PC110 (id 0x43110222)\n");
    assert_eq!(info.vendor, SocVendor::Samsung);
    assert_eq!(info.model.as_deref(), Some("S5PC110"));
  }

  #[test]
  fn allwinner_machine_line() {
    let info = parse("Machine: sun7i\n");
    assert_eq!(info.vendor, SocVendor::Allwinner);
    assert_eq!(info.board, SocBoard::Sun7i);
    assert_eq!(
      info.board_model(CpuMicroarchitecture::CortexA7, 2),
      Some("A20")
    );
    assert_eq!(info.board_model(CpuMicroarchitecture::CortexA7, 4), None);
  }

  #[test]
  fn rockchip_machine_line() {
    let info = parse("<4>Machine: RK30board\n");
    assert_eq!(info.vendor, SocVendor::Rockchip);
    assert_eq!(info.board, SocBoard::Rk30Board);
    assert_eq!(
      info.board_model(CpuMicroarchitecture::CortexA9, 2),
      Some("RK3066")
    );
  }

  #[test]
  fn tegra_names_vendor_only() {
    let info = parse("Tegra initialized\n");
    assert_eq!(info.vendor, SocVendor::Nvidia);
    assert_eq!(info.model, None);
  }

  #[test]
  fn unrelated_log_lines_are_ignored() {
    let text = "\
<6>[    0.000000] Booting Linux on physical CPU 0
<6>[    0.120000] Calibrating delay loop... 1392.74 BogoMIPS
<4>[    1.000000] usb 1-1: new high-speed USB device
";
    assert_eq!(parse(text), KernelLogInfo::default());
  }

  #[test]
  fn later_banner_does_not_clobber_model() {
    // Only the Tegra fallback is gated; model-bearing banners may repeat.
    let text = "CPU EXYNOS4210\nTegra something\n";
    let info = parse(text);
    assert_eq!(info.model.as_deref(), Some("Exynos 4210"));
  }

  #[test]
  fn truncated_prefix_is_skipped() {
    assert_eq!(parse("<6 no close"), KernelLogInfo::default());
    assert_eq!(parse("[ 0.1 no close"), KernelLogInfo::default());
  }
}

#[cfg(all(test, not(miri)))]
mod proptests {
  use proptest::prelude::*;

  use super::*;

  proptest! {
    #[test]
    fn never_panics(text in "\\PC{0,400}") {
      let _ = parse(&text);
    }
  }
}
