mod common;

use bufstreams::{BufferedInputStream, BufferedOutputStream, InMemorySource};
use common::{ChunkedSource, StallingSink, sample_bytes};
use proptest::prelude::*;

const CAPACITY: usize = 16;

/// Writes `data` in `chunk`-sized pieces through an output stream into
/// memory, then reads it back through an input stream.
fn round_trip(data: &[u8], chunk: usize) -> Vec<u8> {
    let mut out = BufferedOutputStream::with_capacity(CAPACITY, Vec::new()).unwrap();
    for piece in data.chunks(chunk.max(1)) {
        out.write_bytes(piece).unwrap();
    }
    out.close().unwrap();
    let stored = out.into_inner();

    let mut stream = BufferedInputStream::with_capacity(CAPACITY, InMemorySource::from_vec(stored)).unwrap();
    let mut read = Vec::new();
    while let Some(b) = stream.read_byte().unwrap() {
        read.push(b);
    }
    read
}

#[test]
fn test_round_trip_boundary_lengths() {
    for len in [0, 1, CAPACITY - 1, CAPACITY, CAPACITY + 1, 2 * CAPACITY, 5 * CAPACITY, 17 * CAPACITY] {
        let data = sample_bytes(len);
        for chunk in [1, 3, CAPACITY, 2 * CAPACITY + 1] {
            assert_eq!(round_trip(&data, chunk), data, "len {len}, chunk {chunk}");
        }
    }
}

#[test]
fn test_stacked_output_into_input() {
    // Output of one stream, read back in bulk through a stack of input streams
    let data = sample_bytes(3 * CAPACITY + 5);
    let mut out = BufferedOutputStream::with_capacity(CAPACITY, StallingSink::refusing(2)).unwrap();
    out.write_bytes(&data).unwrap();
    out.close().unwrap();

    let stored = out.into_inner().data;
    let inner = BufferedInputStream::with_capacity(CAPACITY, ChunkedSource::new(&stored, 5)).unwrap();
    let mut outer = BufferedInputStream::with_capacity(CAPACITY / 2, inner).unwrap();
    assert_eq!(outer.read_bytes(data.len() + 1).unwrap(), data);
}

// --- PROPERTIES ---
#[derive(Debug, Clone)]
enum Op {
    Read,
    ReadBytes(usize),
    Peek,
    PeekSlice(usize),
    Skip(usize),
    Anchor,
    Upanchor,
    TakeAnchored,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Read),
        2 => (0usize..40).prop_map(Op::ReadBytes),
        2 => Just(Op::Peek),
        1 => (0usize..40).prop_map(Op::PeekSlice),
        2 => (0usize..40).prop_map(Op::Skip),
        1 => Just(Op::Anchor),
        1 => Just(Op::Upanchor),
        1 => Just(Op::TakeAnchored),
    ]
}

proptest! {
    #[test]
    fn prop_operations_match_unbuffered_model(
        data in prop::collection::vec(any::<u8>(), 0..300),
        chunk in 1usize..20,
        capacity in 1usize..24,
        ops in prop::collection::vec(op_strategy(), 0..80),
    ) {
        let mut stream = BufferedInputStream::with_capacity(capacity, ChunkedSource::new(&data, chunk)).unwrap();
        // Model: a cursor into the data and an optional anchor position
        let mut pos = 0usize;
        let mut anchor: Option<usize> = None;

        for op in ops {
            match op {
                Op::Read => {
                    prop_assert_eq!(stream.read_byte().unwrap(), data.get(pos).copied());
                    pos = (pos + 1).min(data.len());
                }
                Op::ReadBytes(n) => {
                    let end = (pos + n).min(data.len());
                    prop_assert_eq!(stream.read_bytes(n).unwrap(), &data[pos..end]);
                    pos = end;
                }
                Op::Peek => {
                    prop_assert_eq!(stream.peek().unwrap(), data.get(pos).copied());
                }
                Op::PeekSlice(n) => {
                    let end = (pos + n).min(data.len());
                    prop_assert_eq!(stream.peek_slice(n).unwrap(), &data[pos..end]);
                }
                Op::Skip(n) => {
                    let end = (pos + n).min(data.len());
                    prop_assert_eq!(stream.skip(n).unwrap(), end - pos);
                    pos = end;
                }
                Op::Anchor => {
                    stream.anchor();
                    anchor = Some(pos);
                }
                Op::Upanchor => match anchor.take() {
                    Some(a) => {
                        prop_assert_eq!(stream.upanchor().unwrap(), a as u64);
                    }
                    None => {
                        prop_assert!(stream.upanchor().is_err());
                    }
                },
                Op::TakeAnchored => match anchor.take() {
                    Some(a) => {
                        prop_assert_eq!(stream.take_anchored().unwrap(), &data[a..pos]);
                    }
                    None => {
                        prop_assert!(stream.take_anchored().is_err());
                    }
                },
            }

            prop_assert!(stream.buffer().invariants_hold());
            prop_assert_eq!(stream.position(), pos as u64);
            prop_assert_eq!(stream.is_anchored(), anchor.is_some());
        }
    }

    #[test]
    fn prop_anchor_preserves_bytes_across_refills(
        data in prop::collection::vec(any::<u8>(), 1..500),
        chunk in 1usize..8,
        capacity in 1usize..16,
        start_frac in 0.0f64..1.0,
        len_frac in 0.0f64..1.0,
    ) {
        let start = ((data.len() as f64) * start_frac) as usize;
        let len = (((data.len() - start) as f64) * len_frac) as usize;

        let mut stream = BufferedInputStream::with_capacity(capacity, ChunkedSource::new(&data, chunk)).unwrap();
        prop_assert_eq!(stream.skip(start).unwrap(), start);
        stream.anchor();
        for _ in 0..len {
            prop_assert!(stream.read_byte().unwrap().is_some());
        }
        prop_assert_eq!(stream.take_anchored().unwrap(), &data[start..start + len]);
    }

    #[test]
    fn prop_round_trip_with_backpressure(
        data in prop::collection::vec(any::<u8>(), 0..400),
        chunk in 1usize..50,
        refusals in 0usize..6,
        capacity in 1usize..32,
    ) {
        let mut out = BufferedOutputStream::with_capacity(capacity, StallingSink::refusing(refusals)).unwrap();
        for piece in data.chunks(chunk) {
            prop_assert_eq!(out.write_bytes(piece).unwrap(), piece.len());
            prop_assert!(out.buffer().invariants_hold());
        }
        out.close().unwrap();
        let sink = out.into_inner();
        prop_assert_eq!(sink.closes, 1);

        let mut stream = BufferedInputStream::with_capacity(capacity, InMemorySource::from_vec(sink.data)).unwrap();
        prop_assert_eq!(stream.read_bytes(data.len() + 1).unwrap(), data);
    }
}
