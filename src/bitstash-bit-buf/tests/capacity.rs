use bitstash_bit_buf::{
    BitEncoding, Error, FixedBitStream, GrowableBitStream, StreamOptions, DEFAULT_CAPACITY,
};

#[test]
fn growth_preserves_data() -> Result<(), Error> {
    let mut stream = GrowableBitStream::new();
    stream.reset_write_with_capacity(8)?;
    assert_eq!(stream.bit_length(), 64);

    for v in 0..1000u32 {
        stream.write_u32(v.wrapping_mul(0x9E37_79B9))?;
        stream.write_bool(v % 3 == 0)?;
    }
    assert!(stream.owns_buffer());
    assert!(stream.bit_length() >= 33_000);
    assert_eq!(stream.bit_length() % 64, 0);

    stream.reset_read()?;
    for v in 0..1000u32 {
        assert_eq!(stream.read_u32()?, v.wrapping_mul(0x9E37_79B9));
        assert_eq!(stream.read_bool()?, v % 3 == 0);
    }
    assert!(stream.is_valid());

    Ok(())
}

#[test]
fn growth_doubles_or_fits() -> Result<(), Error> {
    let mut stream = GrowableBitStream::new();
    stream.reset_write_with_capacity(8)?;

    stream.write_u64(1)?;
    stream.write_bool(true)?;
    assert_eq!(stream.byte_length(), 16);

    // Doubling is not enough here, so the request is rounded up to
    // a whole word instead.
    stream.write_bytes(&[0xAB; 100])?;
    assert_eq!(stream.byte_length(), 112);

    Ok(())
}

#[test]
fn appending_to_empty_copy_grows() -> Result<(), Error> {
    let mut stream = GrowableBitStream::new();
    stream.reset_write_copy(&[])?;
    assert_eq!(stream.bit_length(), 0);

    stream.write_u8(9)?;
    assert_eq!(stream.bit_length(), 64);
    assert_eq!(stream.written_bytes(), &[9]);

    Ok(())
}

#[test]
fn fixed_streams_never_grow() -> Result<(), Error> {
    let mut stream = FixedBitStream::new();
    stream.reset_write_with_capacity(8)?;

    stream.write_u64(u64::MAX)?;
    assert!(matches!(
        stream.write_bool(true),
        Err(Error::WriteOverflow {
            offset: 64,
            requested: 1,
            limit: 64
        })
    ));
    assert!(!stream.is_valid());
    assert_eq!(stream.bit_length(), 64);
    assert_eq!(stream.bit_offset(), 64);

    Ok(())
}

#[test]
fn invalidate_instead_of_failing() -> Result<(), Error> {
    let options = StreamOptions {
        throw_on_overflow: false,
        ..Default::default()
    };
    let mut stream = FixedBitStream::with_options(options);
    assert!(!stream.throws_on_overflow());

    stream.reset_write_with_capacity(8)?;
    stream.write_u32(0xCAFE_BABE)?;
    stream.write_u32(0x1234_5678)?;
    assert!(stream.is_valid());

    // Dropped writes leave the cursor alone.
    stream.write_u8(0xFF)?;
    stream.write_string("dropped", BitEncoding::Ascii)?;
    stream.skip(1)?;
    assert!(!stream.is_valid());
    assert_eq!(stream.bit_offset(), 64);

    stream.reset_read()?;
    assert!(stream.is_valid());
    assert_eq!(stream.read_u32()?, 0xCAFE_BABE);
    assert_eq!(stream.read_u32()?, 0x1234_5678);

    // Failed reads yield zero values.
    assert_eq!(stream.read_u32()?, 0);
    assert_eq!(stream.read_ranged(-5i32, 5)?, -5);
    assert_eq!(stream.read_string(BitEncoding::Ascii)?, "");
    assert_eq!(stream.read_bytes(4)?, Vec::<u8>::new());
    assert!(!stream.is_valid());
    assert_eq!(stream.bit_offset(), 64);

    // Contract violations are reported regardless.
    assert!(matches!(stream.write_u8(1), Err(Error::WrongMode { .. })));

    Ok(())
}

#[test]
fn truncated_string_body() -> Result<(), Error> {
    let mut stream = GrowableBitStream::new();
    stream.set_throw_on_overflow(false);

    // A prefix announcing ten characters, followed by only two.
    stream.reset_read_borrowed(&[10, 0, b'h', b'i']);
    assert_eq!(stream.read_string(BitEncoding::Ascii)?, "");
    assert!(!stream.is_valid());
    assert_eq!(stream.bit_offset(), 16);

    stream.set_throw_on_overflow(true);
    stream.reset_read()?;
    assert!(matches!(
        stream.read_string_into(&mut [0; 4], BitEncoding::Ascii),
        Err(Error::ReadOverflow { .. })
    ));

    Ok(())
}

#[test]
fn borrowed_buffer_limit() -> Result<(), Error> {
    let mut data = [0xAA; 20];

    {
        let mut stream = GrowableBitStream::new();
        stream.reset_write_borrowed(&mut data[..13])?;
        assert!(!stream.owns_buffer());
        assert_eq!(stream.bit_length(), 64);

        stream.write_u32(0x0403_0201)?;
        stream.write_bits(0x0807_0605, 32)?;
        assert!(matches!(
            stream.write_bool(true),
            Err(Error::WriteOverflow { limit: 64, .. })
        ));
        assert_eq!(stream.bit_offset(), 64);

        stream.reset_read()?;
        assert_eq!(stream.read_u64()?, 0x0807_0605_0403_0201);
    }

    assert_eq!(&data[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
    // Zeroed on binding but never written past the last whole word.
    assert_eq!(&data[8..13], &[0; 5]);
    // Bytes past the borrowed slice are untouched.
    assert_eq!(&data[13..], &[0xAA; 7]);

    Ok(())
}

#[test]
fn borrowed_buffer_invalidates() -> Result<(), Error> {
    let mut data = [0; 8];
    let mut stream = GrowableBitStream::new();
    stream.set_throw_on_overflow(false);
    stream.reset_write_borrowed(&mut data)?;

    stream.write_u64(7)?;
    stream.write_u64(8)?;
    assert!(!stream.is_valid());
    assert!(!stream.owns_buffer());
    assert_eq!(stream.written_bytes(), &[7, 0, 0, 0, 0, 0, 0, 0]);

    Ok(())
}

#[test]
fn borrowed_buffer_too_small() {
    let mut tiny = [0; 7];
    let mut data = [0; 15];
    let mut stream = GrowableBitStream::new();

    assert!(matches!(
        stream.reset_write_borrowed(&mut tiny),
        Err(Error::BufferTooSmall(7))
    ));
    assert!(stream.reset_write_borrowed(&mut data).is_ok());
    assert_eq!(stream.bit_length(), 64);
}

#[test]
fn ownership_is_exclusive() -> Result<(), Error> {
    let data = [1, 2, 3, 4];
    let mut stream = GrowableBitStream::new();

    stream.reset_write()?;
    assert!(stream.owns_buffer());
    assert_eq!(stream.byte_length(), DEFAULT_CAPACITY);

    stream.reset_read_borrowed(&data);
    assert!(!stream.owns_buffer());
    assert_eq!(stream.as_bytes(), &data);

    // A read-only borrow cannot be written, so a fresh buffer is
    // allocated instead.
    stream.reset_write()?;
    assert!(stream.owns_buffer());
    assert_eq!(stream.byte_length(), DEFAULT_CAPACITY);

    Ok(())
}

#[test]
fn custom_default_capacity() -> Result<(), Error> {
    let mut stream = GrowableBitStream::with_options(StreamOptions {
        default_capacity: 20,
        ..Default::default()
    });

    stream.reset_write()?;
    assert_eq!(stream.byte_length(), 24);
    assert!(stream.throws_on_overflow());

    Ok(())
}

#[test]
fn huge_requests_are_overflows() -> Result<(), Error> {
    let data = [0; 16];
    let mut stream = GrowableBitStream::new();

    stream.reset_read_borrowed(&data);
    stream.skip(8)?;
    assert!(matches!(
        stream.skip(usize::MAX),
        Err(Error::ReadOverflow {
            offset: 8,
            requested: usize::MAX,
            limit: 128
        })
    ));
    assert!(!stream.is_valid());
    assert_eq!(stream.bit_offset(), 8);

    stream.reset_read()?;
    assert!(matches!(
        stream.read_bytes(usize::MAX / 4),
        Err(Error::ReadOverflow { offset: 0, .. })
    ));
    assert_eq!(stream.bit_offset(), 0);

    stream.reset_write_with_capacity(8)?;
    stream.write_u8(1)?;
    assert!(matches!(
        stream.skip(usize::MAX),
        Err(Error::WriteOverflow {
            offset: 8,
            requested: usize::MAX,
            limit: 64
        })
    ));
    assert_eq!(stream.bit_offset(), 8);

    Ok(())
}

#[test]
fn huge_requests_invalidate() -> Result<(), Error> {
    let data = [0; 16];
    let mut stream = FixedBitStream::new();
    stream.set_throw_on_overflow(false);

    stream.reset_read_borrowed(&data);
    stream.skip(8)?;
    stream.skip(usize::MAX)?;
    assert!(!stream.is_valid());
    assert_eq!(stream.bit_offset(), 8);

    stream.reset_read()?;
    assert_eq!(stream.read_bytes(usize::MAX / 4)?, Vec::<u8>::new());
    assert!(!stream.is_valid());
    assert_eq!(stream.bit_offset(), 0);

    stream.reset_write_with_capacity(8)?;
    stream.write_u8(1)?;
    stream.skip(usize::MAX - 4)?;
    assert!(!stream.is_valid());
    assert_eq!(stream.bit_offset(), 8);

    // The cursor is intact, so later writes still land in place.
    stream.write_u8(2)?;
    assert_eq!(stream.written_bytes(), &[1, 2]);

    Ok(())
}
