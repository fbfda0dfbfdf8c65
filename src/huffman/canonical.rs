//! Canonical code assignment

use super::{
    CodeLengths, CodeTable, Codeword, DICT_SIZE, Frequencies, LengthHistogram, MAX_CODE_LEN,
    SortedSymbols, compute_lengths, lengths_from_frequencies,
};

/// Everything a render needs from one code refresh
///
/// `histogram` and `sorted_symbols` are what gets transmitted; `table` is the
/// encoder's view of the same code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCode {
    histogram: LengthHistogram,
    sorted_symbols: SortedSymbols,
    table: CodeTable,
}

impl CanonicalCode {
    /// Build a code from the byte statistics of `data`
    pub fn from_data(data: &[u8]) -> Self {
        assign_canonical(&compute_lengths(data))
    }

    pub fn from_frequencies(frequencies: &Frequencies) -> Self {
        assign_canonical(&lengths_from_frequencies(frequencies))
    }

    /// The overflow sentinel: histogram `{1}`, no codewords
    pub fn fallback() -> Self {
        let mut histogram = LengthHistogram::new();
        // capacity is 256, one entry always fits
        let _ = histogram.push(1);
        Self {
            histogram,
            sorted_symbols: identity_symbols(),
            table: CodeTable::empty(),
        }
    }

    /// True when the code degraded to uncompressed transmission
    pub fn is_fallback(&self) -> bool {
        self.table.is_empty()
    }

    pub fn histogram(&self) -> &[u8] {
        &self.histogram
    }

    pub fn sorted_symbols(&self) -> &SortedSymbols {
        &self.sorted_symbols
    }

    pub fn table(&self) -> &CodeTable {
        &self.table
    }
}

/// Turn per-symbol code lengths into a canonical code
///
/// Symbols are bucket-sorted by length (stable, so equal lengths keep
/// ascending symbol order). Codes are then numbered by walking the buckets
/// from shortest to longest: the running code shifts left by one bit per
/// length step and counts up by one per symbol.
///
/// If a length bucket holds more than 255 symbols, or a code is longer than
/// [`MAX_CODE_LEN`], the histogram cannot be sent and the result is
/// [`CanonicalCode::fallback`].
pub fn assign_canonical(lengths: &CodeLengths) -> CanonicalCode {
    let mut counts = [0usize; DICT_SIZE];
    for &len in lengths {
        counts[len as usize] += 1;
    }
    let max_len = lengths.iter().copied().max().unwrap_or(0) as usize;

    let overflow = counts.iter().any(|&count| count > u8::MAX as usize) || max_len > MAX_CODE_LEN;
    if overflow {
        log::warn!("huffman: length histogram overflow, falling back to raw transmission");
        return CanonicalCode::fallback();
    }

    // Bucket start offsets
    let mut next_slot = [0usize; DICT_SIZE];
    let mut acc = 0;
    for (slot, &count) in next_slot.iter_mut().zip(&counts) {
        *slot = acc;
        acc += count;
    }

    let mut sorted_symbols = [0u8; DICT_SIZE];
    for (symbol, &len) in (0..=u8::MAX).zip(lengths) {
        let slot = &mut next_slot[len as usize];
        sorted_symbols[*slot] = symbol;
        *slot += 1;
    }

    let mut codes = vec![Codeword::default(); DICT_SIZE];
    let mut code: u64 = 0;
    let mut sorted = sorted_symbols.iter();
    for (len, &count) in counts.iter().enumerate().take(max_len + 1) {
        if len > 0 {
            code <<= 1;
        }
        for &symbol in sorted.by_ref().take(count) {
            #[allow(clippy::cast_possible_truncation)]
            let codeword = Codeword::new(code, len as u8);
            codes[symbol as usize] = codeword;
            code = code.wrapping_add(1);
        }
    }

    let mut histogram = LengthHistogram::new();
    for &count in &counts[..=max_len] {
        #[allow(clippy::cast_possible_truncation)]
        let _ = histogram.push(count as u8);
    }

    CanonicalCode {
        histogram,
        sorted_symbols,
        table: CodeTable::from_codes(codes),
    }
}

fn identity_symbols() -> SortedSymbols {
    let mut symbols = [0u8; DICT_SIZE];
    for (slot, symbol) in symbols.iter_mut().zip(0..=u8::MAX) {
        *slot = symbol;
    }
    symbols
}
