//! Benchmark utilities.

use hlpdec_testkit::ContainerBuilder;
use rand::Rng;

/// Generate random data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate text-like data: words from a small vocabulary with runs of
/// padding, which both compression stages can shrink.
pub fn help_text(size: usize) -> Vec<u8> {
    const WORDS: [&[u8]; 8] = [
        b"topic ", b"window ", b"jump ", b"popup ", b"index ", b"help ", b"macro ", b"\0",
    ];
    let mut rng = rand::thread_rng();
    let mut out = Vec::with_capacity(size + 32);
    while out.len() < size {
        if rng.gen_ratio(1, 10) {
            let run = rng.gen_range(4..32);
            out.extend(std::iter::repeat(b' ').take(run));
        } else {
            out.extend_from_slice(WORDS[rng.gen_range(0..WORDS.len())]);
        }
    }
    out.truncate(size);
    out
}

/// Generate `count` sorted stream names.
pub fn stream_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("|bm{i:05}")).collect()
}

/// Build a container holding `count` small streams on `page_size` pages.
pub fn container_with_streams(count: usize, page_size: u16) -> (Vec<u8>, Vec<String>) {
    let names = stream_names(count);
    let builder = names
        .iter()
        .fold(ContainerBuilder::new().page_size(page_size), |builder, name| {
            builder.stream(name, random_data(16))
        });
    (builder.build(), names)
}
