use hapgrm::{compute_grm, GrmAccumulator, HaplotypeRecord, HaplotypeVcfReader, ReaderOptions};
use std::path::Path;

pub fn stream_records<P: AsRef<Path>>(path: P, chunk_size: usize) -> usize {
    let options = ReaderOptions::default().with_chunk_size(chunk_size);
    let mut reader = HaplotypeVcfReader::with_options(path, options).unwrap();
    let mut record = reader.new_record().unwrap();
    let mut n = 0;
    while reader.load_record(&mut record).unwrap() {
        n += 1;
    }
    n
}

pub fn grm<P: AsRef<Path>>(path: P) -> usize {
    let mut reader = HaplotypeVcfReader::from_path(path).unwrap();
    compute_grm(&mut reader, 0).unwrap().n_loci
}

/// A synthetic data line with `n_samples` samples of `k_founders` dosages.
pub fn synthetic_line(n_samples: usize, k_founders: usize) -> Vec<u8> {
    let mut line = b"chr1\t1000\t.\tA\tG\t.\tPASS\t.\tGT:DS:HD".to_vec();
    for s in 0..n_samples {
        line.extend_from_slice(b"\t0/1:1.0:");
        for f in 0..k_founders {
            if f > 0 {
                line.push(b',');
            }
            let dose = if f == s % k_founders { "1.75" } else { "0.035" };
            line.extend_from_slice(dose.as_bytes());
        }
    }
    line.push(b'\n');
    line
}

pub fn parse_line(record: &mut HaplotypeRecord, line: &[u8]) {
    record.parse_vcf_line(line).unwrap();
}

pub fn accumulate(accumulator: &mut GrmAccumulator, record: &HaplotypeRecord, loci: usize) {
    for _ in 0..loci {
        accumulator.update(record).unwrap();
    }
}
