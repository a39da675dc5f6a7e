//! Parser benchmarks: `/proc/cpuinfo` text to `ProcCpuInfo`.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use platform::probe::procfs;

/// Synthetic quad-core Krait listing, representative of a busy phone.
fn krait_text(cores: usize) -> String {
  let mut text = String::new();
  for index in 0..cores {
    text.push_str(&format!("processor       : {index}\nBogoMIPS        : 13.53\n\n"));
  }
  text.push_str(
    "Features        : swp half thumb fastmult vfp edsp thumbee neon vfpv3 tls vfpv4 idiva idivt\n\
     CPU implementer : 0x51\n\
     CPU architecture: 7\n\
     CPU variant     : 0x0\n\
     CPU part        : 0x06f\n\
     CPU revision    : 2\n\n\
     Hardware        : Qualcomm APQ8064\n",
  );
  text
}

fn bench_parse(c: &mut Criterion) {
  let mut group = c.benchmark_group("procfs/parse");
  for cores in [1usize, 4, 16] {
    let text = krait_text(cores);
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_with_input(BenchmarkId::from_parameter(cores), &text, |b, text| {
      b.iter(|| procfs::parse(text));
    });
  }
  group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
