//! Wall-clock pacing tests for the blocking reader
//!
//! These sleep for real; each test takes one to four seconds.

use std::io;
use std::io::Cursor;
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use steady_reader::ThrottledReader;

const INTERVAL: Duration = Duration::from_millis(50);

/// Read exactly `total` bytes using calls of at most `buffer_size`
fn read_all<R: Read>(reader: &mut R, buffer_size: usize, total: usize) -> Vec<u8> {
    let mut data = vec![0u8; total];
    let mut filled = 0;
    while filled < total {
        let end = (filled + buffer_size).min(total);
        match reader.read(&mut data[filled..end]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }
    assert_eq!(filled, total, "read incomplete data");
    data
}

/// Lower bound one interval below, upper bound allows for scheduler overshoot on the last sleep
fn assert_paced(elapsed: Duration, expected: Duration) {
    assert!(elapsed + INTERVAL >= expected, "read completed too quickly: {elapsed:?} < {expected:?}");
    assert!(elapsed <= expected + INTERVAL * 3, "read completed too slowly: {elapsed:?} > {expected:?}");
}

struct Lcg(u64);

impl Lcg {
    fn next_below(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

/// Endless source whose reads each block for a pseudo-random time below `max_latency`
struct UnstableSource {
    rng: Lcg,
    max_latency: Duration,
}

impl Read for UnstableSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let nanos = self.rng.next_below(self.max_latency.as_nanos() as u64);
        std::thread::sleep(Duration::from_nanos(nanos));
        buf.fill(b'A');
        Ok(buf.len())
    }
}

#[test]
fn test_basic_rate() {
    let data_size = 40 * 1024;
    let mut reader = ThrottledReader::new(Cursor::new(vec![0u8; data_size]), (data_size / 2) as i64);

    let start = Instant::now();
    read_all(&mut reader, data_size, data_size);
    assert_paced(start.elapsed(), Duration::from_secs(2));
}

#[test]
fn test_data_is_preserved() {
    let data: Vec<u8> = (0..20 * 1024).map(|i| (i * 31 % 256) as u8).collect();
    let mut reader = ThrottledReader::new(Cursor::new(data.clone()), 20 * 1024);

    let start = Instant::now();
    let read = read_all(&mut reader, 4096, data.len());
    assert_eq!(read, data);
    assert_paced(start.elapsed(), Duration::from_secs(1));
}

#[test]
fn test_small_buffers_keep_rate() {
    let data_size = 40 * 1024;
    let mut reader = ThrottledReader::new(Cursor::new(vec![0u8; data_size]), (data_size / 2) as i64);

    let start = Instant::now();
    read_all(&mut reader, 1024, data_size);
    assert_paced(start.elapsed(), Duration::from_secs(2));
}

#[test]
fn test_unconventional_limit() {
    // not a multiple of the 20 sub-steps per second
    let limit = 10_007;
    let mut reader = ThrottledReader::new(Cursor::new(vec![0u8; 20_014]), limit);

    let start = Instant::now();
    read_all(&mut reader, 20_014, 20_014);
    assert_paced(start.elapsed(), Duration::from_secs(2));
}

#[test]
fn test_no_limit() {
    let data_size = 1024 * 1024;
    let mut reader = ThrottledReader::new(Cursor::new(vec![0u8; data_size]), 0);

    let start = Instant::now();
    read_all(&mut reader, 32 * 1024, data_size);
    assert!(start.elapsed() < INTERVAL, "unlimited read took {:?}", start.elapsed());
}

#[test]
fn test_update_limit_between_calls() {
    let data_size = 100_000;
    let mut reader = ThrottledReader::new(Cursor::new(vec![0u8; data_size]), 25_000);
    let handle = reader.handle();

    let start = Instant::now();
    read_all(&mut reader, data_size / 2, data_size / 2);
    handle.update_limit(50_000);
    read_all(&mut reader, data_size / 2, data_size / 2);

    assert_paced(start.elapsed(), Duration::from_secs(3));
}

#[test]
fn test_update_limit_from_another_thread() {
    let mut reader = ThrottledReader::new(Cursor::new(vec![0u8; 30_000]), 10_000);
    let handle = reader.handle();

    let updater = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_secs(1));
        handle.update_limit(20_000);
    });

    let start = Instant::now();
    let mut buf = vec![0u8; 30_000];
    let outcome = reader.read_paced(&mut buf);
    updater.join().unwrap();

    assert_eq!(outcome.count, 30_000);
    // 10_000 bytes in the first second, 20_000 at double rate in the next
    assert_paced(start.elapsed(), Duration::from_secs(2));
}

#[test]
fn test_progress_visible_while_reading() {
    let data_size = 20_000;
    let mut reader = ThrottledReader::new(Cursor::new(vec![0u8; data_size]), 20_000);
    let handle = reader.handle();
    let done = Arc::new(AtomicBool::new(false));

    let observer = {
        let done = done.clone();
        std::thread::spawn(move || {
            let mut samples = Vec::new();
            while !done.load(Ordering::Acquire) {
                samples.push(handle.current_progress());
                std::thread::sleep(Duration::from_millis(20));
            }
            samples
        })
    };

    let mut buf = vec![0u8; data_size];
    let outcome = reader.read_paced(&mut buf);
    done.store(true, Ordering::Release);
    let samples = observer.join().unwrap();

    assert_eq!(outcome.count, data_size);
    assert!(samples.len() > 10);
    assert!(samples.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {samples:?}");
    assert!(samples.iter().all(|&s| s <= data_size as u64));
    assert!(samples.iter().any(|&s| s > 0 && s < data_size as u64), "no intermediate progress observed");
}

#[test]
fn test_unstable_stream_converges() {
    let data_size = 32 * 1024;
    let limit = (data_size / 2) as i64;
    let source = UnstableSource { rng: Lcg(42), max_latency: INTERVAL / 2 };
    let mut reader = ThrottledReader::new(source, limit);

    let start = Instant::now();
    read_all(&mut reader, 1024, data_size);
    assert_paced(start.elapsed(), Duration::from_secs(2));
}

#[test]
fn test_copy_to_sink() {
    let data_size = 20 * 1024;
    let mut reader = ThrottledReader::new(Cursor::new(vec![0u8; data_size]), (data_size / 2) as i64);

    let start = Instant::now();
    let copied = io::copy(&mut reader, &mut io::sink()).unwrap();
    assert_eq!(copied, data_size as u64);
    // io::copy issues one extra end-of-data probe
    assert_paced(start.elapsed(), Duration::from_secs(2));
}

#[test]
#[ignore] // Reads 1GB; run with --ignored
fn test_large_read() {
    let data_size = 1024 * 1024 * 1024;
    let mut reader = ThrottledReader::new(Cursor::new(vec![0u8; data_size]), (data_size / 4) as i64);

    let start = Instant::now();
    read_all(&mut reader, 32 * 1024, data_size);
    assert_paced(start.elapsed(), Duration::from_secs(4));
}
