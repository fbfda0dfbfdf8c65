mod tests {
    use ws281x_link::wire::{self, ChunkHeader, FLAG_DIFF, FLAG_HUFFMAN, FLAG_LAST, HEADER_LEN, MAGIC};
    use ws281x_link::{AddressWidth, CanonicalCode, Error, FrameAssembler};

    #[test]
    fn test_header_layout() {
        let header = ChunkHeader {
            flags: FLAG_DIFF | FLAG_LAST,
            payload_offset: 0x0102_0304,
            symbol_count: 9,
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes, [MAGIC, 0b101, 4, 3, 2, 1, 9, 0, 0, 0]);

        let mut chunk = bytes.to_vec();
        chunk.extend_from_slice(b"body");
        let (parsed, body) = ChunkHeader::parse(&chunk).unwrap();
        assert_eq!(parsed, header);
        assert!(parsed.is_diff() && parsed.is_last() && !parsed.is_huffman());
        assert_eq!(body, b"body");
    }

    #[test]
    fn test_header_rejects_garbage() {
        assert!(matches!(ChunkHeader::parse(&[MAGIC, 0, 0]), Err(Error::Decode(_))));

        let mut bytes = ChunkHeader {
            flags: 0,
            payload_offset: 0,
            symbol_count: 0,
        }
        .to_bytes();
        bytes[0] = 0x5A;
        assert!(ChunkHeader::parse(&bytes).is_err());
    }

    #[test]
    fn test_address_width_little_endian() {
        let mut out = Vec::new();
        AddressWidth::U16.write(0x1234, &mut out);
        AddressWidth::U24.write(0x0A_BCDE, &mut out);
        AddressWidth::U32.write(0x0102_0304, &mut out);
        assert_eq!(out, [0x34, 0x12, 0xDE, 0xBC, 0x0A, 4, 3, 2, 1]);

        assert_eq!(AddressWidth::U16.read(&out[..2]), Some(0x1234));
        assert_eq!(AddressWidth::U24.read(&out[2..5]), Some(0x0A_BCDE));
        assert_eq!(AddressWidth::U32.read(&out[5..]), Some(0x0102_0304));
        assert_eq!(AddressWidth::U24.read(&out[..2]), None);
        assert_eq!(AddressWidth::U16.capacity(), 65_536);
    }

    #[test]
    fn test_compressed_chunk_layout() {
        let data = b"aaaaaaaabbbbccd".repeat(4);
        let code = CanonicalCode::from_data(&data);
        let mut tables = Vec::new();
        wire::write_code_tables(&code, &mut tables);
        assert_eq!(tables.len(), wire::code_tables_len(&code));
        assert_eq!(tables[0] as usize, code.histogram().len());
        assert_eq!(&tables[1 + code.histogram().len()..], code.sorted_symbols());
    }

    #[test]
    fn test_assembler_joins_pieces() {
        let mut receiver = FrameAssembler::new(6, AddressWidth::U16);
        let first = raw_chunk(0, 0, &[1, 2, 3, 4]);
        let second = raw_chunk(FLAG_LAST, 4, &[5, 6]);

        assert!(!receiver.push(&first).unwrap());
        assert_eq!(receiver.frame(), &[0; 6]);
        assert!(receiver.push(&second).unwrap());
        assert_eq!(receiver.frame(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(receiver.frames(), 1);

        // diff pairs patch single bytes
        let diff = raw_chunk(FLAG_DIFF | FLAG_LAST, 0, &[5, 0, 50, 0, 0, 10]);
        assert!(receiver.push(&diff).unwrap());
        assert_eq!(receiver.frame(), &[10, 2, 3, 4, 5, 50]);
    }

    #[test]
    fn test_assembler_rejects_bad_payloads() {
        let mut receiver = FrameAssembler::new(6, AddressWidth::U16);
        assert!(receiver.push(&raw_chunk(FLAG_LAST, 2, &[1])).is_err());
        assert!(receiver.push(&raw_chunk(FLAG_LAST, 0, &[1, 2])).is_err());
        assert!(receiver.push(&raw_chunk(FLAG_DIFF | FLAG_LAST, 0, &[6, 0, 1])).is_err());
        assert!(receiver.push(&raw_chunk(FLAG_DIFF | FLAG_LAST, 0, &[0, 0])).is_err());

        let mut truncated = raw_chunk(FLAG_LAST, 0, &[1, 2, 3, 4, 5, 6]);
        truncated.pop();
        assert!(matches!(wire::decode_chunk(&truncated), Err(Error::Decode(_))));

        let huffman = raw_chunk(FLAG_HUFFMAN | FLAG_LAST, 0, &[1, 2, 3]);
        assert!(wire::decode_chunk(&huffman).is_err());
        assert_eq!(receiver.frames(), 0);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn raw_chunk(flags: u8, offset: usize, payload: &[u8]) -> Vec<u8> {
        let mut chunk = Vec::with_capacity(HEADER_LEN + payload.len());
        ChunkHeader {
            flags,
            payload_offset: offset as u32,
            symbol_count: payload.len() as u32,
        }
        .write(&mut chunk);
        chunk.extend_from_slice(payload);
        chunk
    }
}
