//! Static microarchitecture dispatch lists.
//!
//! For every known microarchitecture there is one hand-curated, ordered
//! list of microarchitectures to try when picking a function variant:
//! the detected design first, then designs whose tuned code is known to
//! run well on it (closest performance lineage first), always ending in
//! `Unknown`, the slot every dispatch table's unconditional fallback
//! occupies.
//!
//! The orderings encode scheduling kinship, not release chronology:
//! e.g. Piledriver code tends to run well on Steamroller, and big-core
//! Intel code is a reasonable stand-in on the AMD construction cores,
//! so those appear before older same-vendor designs.
//!
//! Lists are plain data keyed by microarchitecture, not compile-time
//! selected, so every table is testable from any host.

use platform::CpuMicroarchitecture as M;

/// The priority-ordered fallback list for a detected microarchitecture.
///
/// Never empty; the last element is always `Unknown`. An unrecognized or
/// `Unknown` input yields the single-element `[Unknown]` list.
#[must_use]
pub fn dispatch_list(march: M) -> &'static [M] {
  const UNKNOWN: &[M] = &[M::Unknown];

  // ─── x86: Intel big cores ───
  const P5: &[M] = &[M::P5, M::K5, M::KnightsFerry, M::KnightsCorner, M::Unknown];
  const P6: &[M] = &[M::P6, M::Dothan, M::K7, M::K6, M::Yonah, M::Conroe, M::Penryn, M::Unknown];
  const WILLAMETTE: &[M] = &[M::Willamette, M::Prescott, M::Yonah, M::Unknown];
  const PRESCOTT: &[M] = &[M::Prescott, M::Willamette, M::Yonah, M::Unknown];
  const DOTHAN: &[M] = &[M::Dothan, M::P6, M::Yonah, M::Conroe, M::Penryn, M::Unknown];
  const YONAH: &[M] = &[M::Yonah, M::Conroe, M::Penryn, M::Dothan, M::P6, M::Unknown];
  const CONROE: &[M] = &[M::Conroe, M::Penryn, M::Nehalem, M::SandyBridge, M::IvyBridge, M::Unknown];
  const PENRYN: &[M] = &[M::Penryn, M::Conroe, M::Nehalem, M::SandyBridge, M::IvyBridge, M::Unknown];
  const NEHALEM: &[M] = &[M::Nehalem, M::Penryn, M::Conroe, M::SandyBridge, M::IvyBridge, M::Unknown];
  const SANDY_BRIDGE: &[M] = &[
    M::SandyBridge,
    M::IvyBridge,
    M::Haswell,
    M::Nehalem,
    M::Penryn,
    M::Conroe,
    M::Unknown,
  ];
  const IVY_BRIDGE: &[M] = &[
    M::IvyBridge,
    M::SandyBridge,
    M::Steamroller,
    M::Haswell,
    M::Nehalem,
    M::Penryn,
    M::Conroe,
    M::Unknown,
  ];
  const HASWELL: &[M] = &[
    M::Haswell,
    M::IvyBridge,
    M::SandyBridge,
    M::Piledriver,
    M::Bulldozer,
    M::Nehalem,
    M::Penryn,
    M::Conroe,
    M::Unknown,
  ];

  // ─── x86: Intel small cores and Knights ───
  const BONNELL: &[M] = &[M::Bonnell, M::Saltwell, M::Unknown];
  const SALTWELL: &[M] = &[M::Saltwell, M::Bonnell, M::Unknown];
  const SILVERMONT: &[M] = &[M::Silvermont, M::Bobcat, M::Nehalem, M::Unknown];
  const KNIGHTS_FERRY: &[M] = &[M::KnightsFerry, M::Unknown];
  const KNIGHTS_CORNER: &[M] = &[M::KnightsCorner, M::Unknown];

  // ─── x86: AMD ───
  const K5: &[M] = &[M::K5, M::Unknown];
  const K6: &[M] = &[M::K6, M::Unknown];
  const GEODE: &[M] = &[M::Geode, M::Unknown];
  const K7: &[M] = &[M::K7, M::Unknown];
  const K8: &[M] = &[
    M::K8,
    M::Bobcat,
    M::Bonnell,
    M::K10,
    M::Nehalem,
    M::Penryn,
    M::Conroe,
    M::Prescott,
    M::Unknown,
  ];
  const K10: &[M] = &[
    M::K10,
    M::Nehalem,
    M::Penryn,
    M::Conroe,
    M::Bonnell,
    M::Silvermont,
    M::Jaguar,
    M::K8,
    M::Bobcat,
    M::Prescott,
    M::Unknown,
  ];
  const BOBCAT: &[M] = &[M::Bobcat, M::Jaguar, M::Nehalem, M::Unknown];
  const BULLDOZER: &[M] = &[
    M::Bulldozer,
    M::Piledriver,
    M::Steamroller,
    M::IvyBridge,
    M::SandyBridge,
    M::Haswell,
    M::Nehalem,
    M::Penryn,
    M::Conroe,
    M::K10,
    M::Unknown,
  ];
  const PILEDRIVER: &[M] = &[
    M::Piledriver,
    M::Steamroller,
    M::Bulldozer,
    M::Haswell,
    M::IvyBridge,
    M::SandyBridge,
    M::Nehalem,
    M::Penryn,
    M::Conroe,
    M::K10,
    M::Unknown,
  ];
  const JAGUAR: &[M] = &[M::Jaguar, M::Bobcat, M::Nehalem, M::Unknown];
  const STEAMROLLER: &[M] = &[
    M::Steamroller,
    M::Haswell,
    M::Piledriver,
    M::Bulldozer,
    M::IvyBridge,
    M::SandyBridge,
    M::Nehalem,
    M::Unknown,
  ];

  // ─── ARM ───
  const STRONG_ARM: &[M] = &[M::StrongArm, M::Unknown];
  const XSCALE: &[M] = &[M::XScale, M::Arm9, M::Unknown];
  const ARM7: &[M] = &[M::Arm7, M::Unknown];
  const ARM9: &[M] = &[M::Arm9, M::Unknown];
  const ARM11: &[M] = &[M::Arm11, M::Arm9, M::Unknown];
  const CORTEX_A5: &[M] = &[
    M::CortexA5,
    M::CortexA7,
    M::CortexA8,
    M::Scorpion,
    M::CortexA9,
    M::Krait,
    M::CortexA15,
    M::Arm11,
    M::Unknown,
  ];
  const CORTEX_A7: &[M] = &[
    M::CortexA7,
    M::CortexA9,
    M::CortexA8,
    M::Scorpion,
    M::Krait,
    M::CortexA15,
    M::CortexA5,
    M::Arm11,
    M::Unknown,
  ];
  const CORTEX_A8: &[M] = &[
    M::CortexA8,
    M::CortexA5,
    M::CortexA7,
    M::CortexA9,
    M::Scorpion,
    M::Krait,
    M::CortexA15,
    M::Arm11,
    M::Unknown,
  ];
  const CORTEX_A9: &[M] = &[
    M::CortexA9,
    M::CortexA7,
    M::CortexA8,
    M::Scorpion,
    M::Krait,
    M::CortexA15,
    M::CortexA5,
    M::Arm11,
    M::Unknown,
  ];
  const CORTEX_A15: &[M] = &[
    M::CortexA15,
    M::Krait,
    M::Scorpion,
    M::CortexA7,
    M::CortexA9,
    M::CortexA8,
    M::CortexA5,
    M::Arm11,
    M::Unknown,
  ];
  const SCORPION: &[M] = &[
    M::Scorpion,
    M::Krait,
    M::CortexA15,
    M::CortexA9,
    M::CortexA8,
    M::CortexA7,
    M::CortexA5,
    M::Arm11,
    M::Unknown,
  ];
  const KRAIT: &[M] = &[
    M::Krait,
    M::CortexA15,
    M::Scorpion,
    M::CortexA9,
    M::CortexA7,
    M::CortexA8,
    M::CortexA5,
    M::Arm11,
    M::Unknown,
  ];
  const PJ1: &[M] = &[M::Pj1, M::Unknown];
  const PJ4: &[M] = &[M::Pj4, M::CortexA9, M::XScale, M::Arm11, M::Unknown];
  const SWIFT: &[M] = &[M::Swift, M::Unknown];

  // ─── MIPS ───
  const MIPS_24K: &[M] = &[M::Mips24K, M::Unknown];
  const MIPS_34K: &[M] = &[M::Mips34K, M::Unknown];
  const MIPS_74K: &[M] = &[M::Mips74K, M::Unknown];
  const XBURST: &[M] = &[M::XBurst, M::Unknown];
  const XBURST2: &[M] = &[M::XBurst2, M::Unknown];

  match march {
    M::P5 => P5,
    M::P6 => P6,
    M::Willamette => WILLAMETTE,
    M::Prescott => PRESCOTT,
    M::Dothan => DOTHAN,
    M::Yonah => YONAH,
    M::Conroe => CONROE,
    M::Penryn => PENRYN,
    M::Bonnell => BONNELL,
    M::Nehalem => NEHALEM,
    M::SandyBridge => SANDY_BRIDGE,
    M::Saltwell => SALTWELL,
    M::IvyBridge => IVY_BRIDGE,
    M::Haswell => HASWELL,
    M::Silvermont => SILVERMONT,
    M::KnightsFerry => KNIGHTS_FERRY,
    M::KnightsCorner => KNIGHTS_CORNER,
    M::K5 => K5,
    M::K6 => K6,
    M::Geode => GEODE,
    M::K7 => K7,
    M::K8 => K8,
    M::K10 => K10,
    M::Bobcat => BOBCAT,
    M::Bulldozer => BULLDOZER,
    M::Piledriver => PILEDRIVER,
    M::Jaguar => JAGUAR,
    M::Steamroller => STEAMROLLER,
    M::StrongArm => STRONG_ARM,
    M::XScale => XSCALE,
    M::Arm7 => ARM7,
    M::Arm9 => ARM9,
    M::Arm11 => ARM11,
    M::CortexA5 => CORTEX_A5,
    M::CortexA7 => CORTEX_A7,
    M::CortexA8 => CORTEX_A8,
    M::CortexA9 => CORTEX_A9,
    M::CortexA15 => CORTEX_A15,
    M::Scorpion => SCORPION,
    M::Krait => KRAIT,
    M::Pj1 => PJ1,
    M::Pj4 => PJ4,
    M::Swift => SWIFT,
    M::Mips24K => MIPS_24K,
    M::Mips34K => MIPS_34K,
    M::Mips74K => MIPS_74K,
    M::XBurst => XBURST,
    M::XBurst2 => XBURST2,
    _ => UNKNOWN,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Every list is non-empty, starts with the queried design (except the
  /// Unknown list), ends in Unknown, and contains no duplicates.
  #[test]
  fn list_shape_invariants() {
    for &march in M::all() {
      let list = dispatch_list(march);
      assert!(!list.is_empty());
      assert_eq!(*list.last().unwrap(), M::Unknown, "{march:?} list must end in Unknown");
      if march != M::Unknown {
        assert_eq!(list[0], march, "{march:?} list must start with itself");
      }
      for (i, a) in list.iter().enumerate() {
        for b in &list[i + 1..] {
          assert_ne!(a, b, "duplicate {a:?} in {march:?} list");
        }
      }
    }
  }

  /// Unknown appears exactly once, in the final slot, so the selector's
  /// termination argument holds.
  #[test]
  fn unknown_is_terminal_only() {
    for &march in M::all() {
      let list = dispatch_list(march);
      let unknowns = list.iter().filter(|&&m| m == M::Unknown).count();
      assert_eq!(unknowns, 1, "{march:?}");
    }
  }

  #[test]
  fn unknown_input_degrades_to_singleton() {
    assert_eq!(dispatch_list(M::Unknown), &[M::Unknown]);
  }

  /// Ivy Bridge code falls back to Sandy Bridge before anything else.
  #[test]
  fn ivy_bridge_prefers_sandy_bridge() {
    let list = dispatch_list(M::IvyBridge);
    assert_eq!(list[0], M::IvyBridge);
    assert_eq!(list[1], M::SandyBridge);
  }

  #[test]
  fn haswell_lineage() {
    let list = dispatch_list(M::Haswell);
    assert_eq!(
      &list[..4],
      &[M::Haswell, M::IvyBridge, M::SandyBridge, M::Piledriver]
    );
  }

  /// A dispatch list never crosses architecture families (other than the
  /// terminal Unknown).
  #[test]
  fn lists_stay_within_architecture() {
    for &march in M::all() {
      if march == M::Unknown {
        continue;
      }
      let family = march.architecture();
      for &candidate in dispatch_list(march) {
        if candidate != M::Unknown {
          assert_eq!(candidate.architecture(), family, "{march:?} -> {candidate:?}");
        }
      }
    }
  }
}
