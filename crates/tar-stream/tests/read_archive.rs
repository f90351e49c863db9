//! End-to-end reads of archives produced by the tar crate.

use std::io::{self, Cursor, Read};

use proptest::prelude::*;
use similar_asserts::assert_eq;
use tar_stream::stream::{ReaderOptions, TarStreamReader};
use tar_stream::{detect, TarFormat};

/// A reader that returns at most `chunk` bytes per call, like a pipe.
struct Trickle<R> {
    inner: R,
    chunk: usize,
}

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.chunk);
        self.inner.read(&mut buf[..len])
    }
}

fn build_archive(files: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_mode(0o644);
        header.set_size(content.len() as u64);
        builder
            .append_data(&mut header, path, content.as_slice())
            .unwrap();
    }
    builder.into_inner().unwrap()
}

#[test]
fn test_detect_builder_headers() {
    let mut header = tar::Header::new_ustar();
    header.set_path("a").unwrap();
    assert_eq!(detect(header.as_bytes()), Some(TarFormat::Ustar));

    let header = tar::Header::new_gnu();
    assert_eq!(detect(header.as_bytes()), Some(TarFormat::Gnu));

    let header = tar::Header::new_old();
    assert_eq!(detect(header.as_bytes()), None);
    assert!(!tar_stream::matches(header.as_bytes()));
}

#[test]
fn test_archive_over_slow_reader() {
    let files: Vec<(String, Vec<u8>)> = (0..5)
        .map(|i| (format!("dir/file{i}"), vec![i as u8; i * 777]))
        .collect();
    let data = build_archive(&files);
    let trickle = Trickle {
        inner: Cursor::new(data),
        chunk: 100,
    };
    let mut reader = TarStreamReader::new(trickle);

    for (path, content) in &files {
        let entry = reader.next_entry().unwrap().expect("should have entry");
        assert_eq!(&entry.name, path);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(&out, content);
    }
    assert!(reader.next_entry().unwrap().is_none());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_skip_then_read_rest(
        content in prop::collection::vec(any::<u8>(), 0..4096),
        skip_fraction in 0.0f64..=1.0,
        blocking in 1usize..=20,
    ) {
        let files = vec![("payload".to_owned(), content.clone())];
        let data = build_archive(&files);
        let options = ReaderOptions {
            block_size: 512 * blocking,
            ..Default::default()
        };
        let mut reader = TarStreamReader::with_options(Cursor::new(data), options).unwrap();
        reader.next_entry().unwrap().expect("should have entry");

        let k = (content.len() as f64 * skip_fraction) as u64;
        prop_assert_eq!(reader.skip(k).unwrap(), k);
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        prop_assert_eq!(rest.len() as u64, content.len() as u64 - k);
        prop_assert_eq!(&rest[..], &content[k as usize..]);
    }

    #[test]
    fn test_partial_reads_do_not_disturb_later_entries(
        sizes in prop::collection::vec(0usize..2000, 1..6),
        consumed in prop::collection::vec(0usize..2000, 6),
    ) {
        let files: Vec<(String, Vec<u8>)> = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| (format!("f{i}"), (0..size).map(|b| (b + i) as u8).collect()))
            .collect();
        let data = build_archive(&files);
        let mut reader = TarStreamReader::new(Cursor::new(data));

        for ((path, content), &take) in files.iter().zip(&consumed) {
            let entry = reader.next_entry().unwrap().expect("should have entry");
            prop_assert_eq!(&entry.name, path);

            let take = take.min(content.len());
            let mut head = vec![0u8; take];
            reader.read_exact(&mut head).unwrap();
            prop_assert_eq!(&head[..], &content[..take]);
            prop_assert_eq!(reader.remaining(), (content.len() - take) as u64);
        }
        prop_assert!(reader.next_entry().unwrap().is_none());
    }
}
