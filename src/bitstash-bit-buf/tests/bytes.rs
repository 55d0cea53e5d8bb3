use bitstash_bit_buf::{Error, GrowableBitStream};
use bytemuck::{Pod, Zeroable};

#[test]
fn prefixed_bytes_after_padding() -> Result<(), Error> {
    let data: Vec<u8> = (0..12).collect();

    let mut stream = GrowableBitStream::new();
    stream.reset_write()?;
    stream.skip(1)?;
    stream.write_bytes_prefixed(&data)?;
    assert_eq!(stream.byte_offset(), 14.125);

    stream.reset_read()?;
    stream.skip(1)?;
    assert_eq!(stream.read_bytes_prefixed()?, data);
    assert_eq!(stream.bit_offset(), 113);

    Ok(())
}

#[test]
fn unaligned_bytes() -> Result<(), Error> {
    let data: Vec<u8> = (0..20).map(|i| i * 13).collect();

    let mut stream = GrowableBitStream::new();
    stream.reset_write_with_capacity(8)?;
    stream.write_bits(0b101, 3)?;
    stream.write_bytes(&data)?;
    stream.write_bytes(&[])?;
    stream.write_bool(true)?;

    stream.reset_read()?;
    assert_eq!(stream.read_bits(3)?, 0b101);

    let mut out = [0; 20];
    stream.read_bytes_into(&mut out)?;
    assert_eq!(&out[..], &data[..]);
    assert!(stream.read_bool()?);
    assert_eq!(stream.read_bytes(0)?, Vec::<u8>::new());

    Ok(())
}

#[test]
fn aligned_bytes_match_memory() -> Result<(), Error> {
    let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03, 0x04, 0x05];

    let mut stream = GrowableBitStream::new();
    stream.reset_write()?;
    stream.write_bytes(&data)?;

    assert_eq!(stream.written_bytes(), &data);

    stream.reset_read()?;
    assert_eq!(stream.read_bytes(9)?, data);

    Ok(())
}

#[test]
fn copy_out() -> Result<(), Error> {
    let mut stream = GrowableBitStream::new();
    stream.reset_write()?;
    stream.write_u32(0x0403_0201)?;
    stream.write_bool(true)?;
    assert_eq!(stream.bytes_used(), 5);

    let mut short = [0; 3];
    assert_eq!(stream.copy_to(&mut short), 3);
    assert_eq!(short, [1, 2, 3]);

    let mut roomy = [0xFF; 8];
    assert_eq!(stream.copy_to(&mut roomy), 5);
    assert_eq!(roomy, [1, 2, 3, 4, 1, 0xFF, 0xFF, 0xFF]);

    Ok(())
}

#[test]
fn prefixed_bytes_too_long() -> Result<(), Error> {
    let mut stream = GrowableBitStream::new();
    stream.reset_write()?;

    assert!(matches!(
        stream.write_bytes_prefixed(&vec![0; 70_000]),
        Err(Error::TooLong(70_000))
    ));

    // Unprefixed runs have no such limit.
    stream.write_bytes(&vec![0; 70_000])?;
    assert_eq!(stream.bytes_used(), 70_000);

    Ok(())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Transform {
    entity: u32,
    flags: u16,
    layer: u8,
    kind: u8,
    position: [f32; 3],
}

fn transform() -> Transform {
    Transform {
        entity: 0xABCD_1234,
        flags: 0x8001,
        layer: 3,
        kind: 0xFE,
        position: [1.5, -20.25, 1e9],
    }
}

#[test]
fn pod_values_at_unaligned_offsets() -> Result<(), Error> {
    let value = transform();

    let mut stream = GrowableBitStream::new();
    stream.reset_write_with_capacity(8)?;
    stream.write_bits(0b11011, 5)?;
    stream.write_pod(&value)?;
    stream.write_pod(&[7u16, 8, 9])?;
    stream.write_bool(true)?;
    assert_eq!(stream.bit_offset(), 5 + 20 * 8 + 6 * 8 + 1);

    stream.reset_read()?;
    assert_eq!(stream.read_bits(5)?, 0b11011);
    assert_eq!(stream.read_pod::<Transform>()?, value);
    assert_eq!(stream.read_pod::<[u16; 3]>()?, [7, 8, 9]);
    assert!(stream.read_bool()?);

    Ok(())
}

#[test]
fn pod_values_keep_memory_layout() -> Result<(), Error> {
    let value = transform();

    let mut stream = GrowableBitStream::new();
    stream.reset_write()?;
    stream.write_pod(&value)?;

    assert_eq!(stream.written_bytes(), bytemuck::bytes_of(&value));

    Ok(())
}

#[test]
fn truncated_pod_reads_zeroed() -> Result<(), Error> {
    let mut stream = GrowableBitStream::new();
    stream.set_throw_on_overflow(false);
    stream.reset_read_borrowed(&[1, 2, 3, 4, 5, 6, 7, 8]);

    assert_eq!(stream.read_pod::<Transform>()?, Transform::default());
    assert!(!stream.is_valid());
    assert_eq!(stream.bit_offset(), 0);

    stream.set_throw_on_overflow(true);
    stream.reset_read()?;
    assert!(matches!(
        stream.read_pod::<Transform>(),
        Err(Error::ReadOverflow {
            requested: 160,
            limit: 64,
            ..
        })
    ));

    Ok(())
}
