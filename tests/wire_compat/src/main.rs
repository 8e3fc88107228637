fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{Read, Seek, SeekFrom, Write};
    use std::path::{Path, PathBuf};

    use ferry_file_ops::RemovalList;
    use ferry_protocol::{HashAlgorithm, HashProgress, MissingChunks};
    use ferry_transfer::{MissingSet, decode_ranges, encode_ranges, hash_file, scan_missing_chunks};
    use serde::Deserialize;

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into `T`, re-serializes it, and compares the
    /// JSON values.
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  rust:    {reserialized}"
        );
        parsed
    }

    // --- Missing-chunk reports ---

    #[test]
    fn fixture_missing_all() {
        let report: MissingChunks = roundtrip_test("missing_all.json");
        assert_eq!(report, MissingChunks::All);
        assert_eq!(
            MissingSet::from_wire(&report).unwrap(),
            MissingSet::AllMissing
        );
    }

    #[test]
    fn fixture_missing_none() {
        let report: MissingChunks = roundtrip_test("missing_none.json");
        assert_eq!(
            MissingSet::from_wire(&report).unwrap(),
            MissingSet::NoneMissing
        );
        assert_eq!(report.to_flat().unwrap(), vec![65536]);
    }

    #[test]
    fn fixture_missing_ranges() {
        let report: MissingChunks = roundtrip_test("missing_ranges.json");
        let set = MissingSet::from_wire(&report).unwrap();
        assert_eq!(set, MissingSet::Offsets(vec![0, 100, 200, 500, 900, 1000]));
        assert_eq!(set.to_wire(100).unwrap(), report);
    }

    #[test]
    fn tagged_report_without_runs_field() {
        let report: MissingChunks =
            serde_json::from_str(r#"{"kind":"ranges","chunkSize":100}"#).unwrap();
        assert_eq!(
            MissingSet::from_wire(&report).unwrap(),
            MissingSet::NoneMissing
        );
    }

    #[test]
    fn unknown_report_kind_is_rejected() {
        assert!(serde_json::from_str::<MissingChunks>(r#"{"kind":"some"}"#).is_err());
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct FlatCase {
        name: String,
        offsets: Option<Vec<u64>>,
        chunk_size: u64,
        flat: Vec<i64>,
    }

    #[test]
    fn fixture_legacy_flat() {
        let cases: Vec<FlatCase> = serde_json::from_value(load_fixture("legacy_flat.json")).unwrap();
        assert!(!cases.is_empty());

        for case in &cases {
            let set = match &case.offsets {
                None => MissingSet::AllMissing,
                Some(offsets) => MissingSet::from_offsets(offsets.clone()),
            };

            let flat = set.to_wire(case.chunk_size).unwrap().to_flat().unwrap();
            assert_eq!(flat, case.flat, "encode mismatch for {}", case.name);

            let parsed = MissingChunks::from_flat(&case.flat).unwrap();
            assert_eq!(
                MissingSet::from_wire(&parsed).unwrap(),
                set,
                "decode mismatch for {}",
                case.name
            );
        }
    }

    #[test]
    fn malformed_legacy_flat_is_rejected() {
        let bad: [&[i64]; 5] = [&[0], &[-100], &[100, 0], &[100, 0, 0], &[100, -100, 1]];
        for flat in bad {
            assert!(MissingChunks::from_flat(flat).is_err(), "{flat:?}");
        }

        // Well-formed but overlapping runs pass the shape check and fail
        // decoding.
        let overlapping = MissingChunks::from_flat(&[100, 0, 3, 100, 1]).unwrap();
        assert!(MissingSet::from_wire(&overlapping).is_err());
    }

    // --- Progress and digests ---

    #[test]
    fn fixture_hash_progress() {
        let progress: HashProgress = roundtrip_test("hash_progress.json");
        assert_eq!(progress.percentage(), 50.0);
        assert!(!progress.is_complete());
    }

    #[derive(Deserialize)]
    struct DigestCase {
        algorithm: HashAlgorithm,
        content: String,
        hex: String,
    }

    #[test]
    fn fixture_digests() {
        let dir = tempfile::tempdir().unwrap();
        let cases: Vec<DigestCase> = serde_json::from_value(load_fixture("digests.json")).unwrap();

        for (i, case) in cases.iter().enumerate() {
            let path = dir.path().join(format!("case-{i}"));
            fs::write(&path, &case.content).unwrap();

            let digest = hash_file(&path, case.algorithm).unwrap();
            assert_eq!(digest.algorithm(), case.algorithm);
            assert_eq!(digest.as_bytes().len(), case.algorithm.digest_len());
            assert_eq!(digest.to_hex(), case.hex, "{} of {:?}", case.algorithm, case.content);
        }
    }

    // --- Resume flow across crates ---

    const CHUNK: u64 = 1000;

    fn copy_chunk(src: &Path, dst: &Path, offset: u64, size: u64) {
        let len = CHUNK.min(size - offset) as usize;
        let mut buf = vec![0u8; len];
        let mut from = fs::File::open(src).unwrap();
        from.seek(SeekFrom::Start(offset)).unwrap();
        from.read_exact(&mut buf).unwrap();

        let mut to = fs::OpenOptions::new().write(true).open(dst).unwrap();
        to.seek(SeekFrom::Start(offset)).unwrap();
        to.write_all(&buf).unwrap();
    }

    fn source_bytes(size: usize) -> Vec<u8> {
        (0..size).map(|i| (i % 251) as u8 + 1).collect()
    }

    #[test]
    fn interrupted_transfer_resumes_from_report() {
        let dir = tempfile::tempdir().unwrap();
        let size = 10_500u64;
        let src = dir.path().join("source.bin");
        fs::write(&src, source_bytes(size as usize)).unwrap();

        // Receiver preallocates and records the partial file.
        let dst = dir.path().join("dest.bin");
        fs::File::create(&dst).unwrap().set_len(size).unwrap();
        let removal = RemovalList::in_dir(dir.path());
        removal.mark(&dst).unwrap();

        for offset in [0, 1000, 2000, 5000] {
            copy_chunk(&src, &dst, offset, size);
        }

        // Receiver reports, sender decodes.
        let missing = scan_missing_chunks(&dst, size, CHUNK).unwrap();
        let json = serde_json::to_string(&missing.to_wire(CHUNK).unwrap()).unwrap();
        let report: MissingChunks = serde_json::from_str(&json).unwrap();
        let MissingChunks::Ranges(range) = &report else {
            panic!("expected ranges, got {report:?}");
        };
        assert_eq!(range.runs.len(), 2);

        let offsets = decode_ranges(range).unwrap();
        assert_eq!(offsets.len(), 7);
        for offset in offsets {
            copy_chunk(&src, &dst, offset, size);
        }

        assert!(scan_missing_chunks(&dst, size, CHUNK).unwrap().is_complete());
        assert_eq!(
            hash_file(&dst, HashAlgorithm::Sha256).unwrap(),
            hash_file(&src, HashAlgorithm::Sha256).unwrap()
        );
        assert_eq!(
            hash_file(&dst, HashAlgorithm::Sampled).unwrap(),
            hash_file(&src, HashAlgorithm::Sampled).unwrap()
        );
    }

    #[test]
    fn abandoned_transfer_is_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("dest.bin");
        fs::File::create(&dst).unwrap().set_len(4000).unwrap();

        let removal = RemovalList::in_dir(dir.path());
        removal.mark(&dst).unwrap();

        assert_eq!(
            scan_missing_chunks(&dst, 4000, CHUNK).unwrap(),
            MissingSet::Offsets(vec![0, 1000, 2000, 3000])
        );
        let range = encode_ranges(&[0, 1000, 2000, 3000], CHUNK).unwrap();
        assert_eq!(range.chunk_count(), 4);

        assert_eq!(removal.remove_marked().unwrap(), 1);
        assert!(!dst.exists());
        assert_eq!(
            scan_missing_chunks(&dst, 4000, CHUNK).unwrap(),
            MissingSet::AllMissing
        );
    }
}
