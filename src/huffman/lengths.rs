//! Huffman code length computation

use core::cmp::Reverse;
use std::collections::BinaryHeap;

use super::{CodeLengths, DICT_SIZE};

/// Occurrence count of every byte value
pub type Frequencies = [u64; DICT_SIZE];

pub fn count_frequencies(data: &[u8]) -> Frequencies {
    let mut frequencies = [0; DICT_SIZE];
    accumulate_frequencies(&mut frequencies, data);
    frequencies
}

/// Add the byte counts of `data` to `frequencies`
pub fn accumulate_frequencies(frequencies: &mut Frequencies, data: &[u8]) {
    for &symbol in data {
        frequencies[symbol as usize] += 1;
    }
}

/// Code length of every byte value for a Huffman code built over `data`
pub fn compute_lengths(data: &[u8]) -> CodeLengths {
    lengths_from_frequencies(&count_frequencies(data))
}

/// Code length of every byte value for the given frequencies
///
/// Every symbol enters the queue, zero-weight ones included. Nodes are
/// ordered by `(weight, sequence)`: leaves take their symbol value as
/// sequence, merged nodes take 256, 257, ... in creation order. Equal weights
/// therefore pop oldest first, which keeps unused symbols in a balanced
/// subtree and makes the result reproducible.
pub fn lengths_from_frequencies(frequencies: &Frequencies) -> CodeLengths {
    let mut lengths = [0u8; DICT_SIZE];

    // Member symbols of each node, indexed by sequence number
    let mut members: Vec<Vec<u8>> = Vec::with_capacity(2 * DICT_SIZE - 1);
    let mut queue = BinaryHeap::with_capacity(DICT_SIZE);

    for (symbol, &weight) in (0..=u8::MAX).zip(frequencies) {
        queue.push(Reverse((weight, members.len())));
        members.push(vec![symbol]);
    }

    while queue.len() > 1 {
        let (Some(Reverse((weight_a, node_a))), Some(Reverse((weight_b, node_b)))) =
            (queue.pop(), queue.pop())
        else {
            break;
        };
        let mut merged = core::mem::take(&mut members[node_a]);
        let second = core::mem::take(&mut members[node_b]);
        for &symbol in merged.iter().chain(&second) {
            lengths[symbol as usize] += 1;
        }
        merged.extend_from_slice(&second);

        queue.push(Reverse((weight_a + weight_b, members.len())));
        members.push(merged);
    }

    lengths
}
