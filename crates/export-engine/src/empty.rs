//! Byte-exact empty outputs, produced without running any engine.

use crate::settings::ExportFormat;

/// Minimal valid file of `format` holding zero seconds of media.
///
/// MP4 is an `ftyp` box followed by a `moov` box whose only child is a
/// version 0 `mvhd` with duration 0. GIF is a header, a 1x1 logical screen
/// without a colour table, and the trailer.
pub fn empty_output(format: ExportFormat) -> Vec<u8> {
    match format {
        ExportFormat::Mp4 => empty_mp4(),
        ExportFormat::Gif => empty_gif(),
    }
}

fn push_box(out: &mut Vec<u8>, kind: &[u8; 4], body: &[u8]) {
    let size = (8 + body.len()) as u32;
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(body);
}

fn empty_mp4() -> Vec<u8> {
    let mut ftyp = Vec::with_capacity(20);
    ftyp.extend_from_slice(b"isom");
    ftyp.extend_from_slice(&512u32.to_be_bytes());
    for brand in [b"isom", b"iso2", b"mp41"] {
        ftyp.extend_from_slice(brand);
    }

    let mut mvhd = Vec::with_capacity(100);
    mvhd.extend_from_slice(&[0, 0, 0, 0]); // version 0, flags
    mvhd.extend_from_slice(&0u32.to_be_bytes()); // creation time
    mvhd.extend_from_slice(&0u32.to_be_bytes()); // modification time
    mvhd.extend_from_slice(&1000u32.to_be_bytes()); // timescale
    mvhd.extend_from_slice(&0u32.to_be_bytes()); // duration
    mvhd.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // rate 1.0
    mvhd.extend_from_slice(&0x0100u16.to_be_bytes()); // volume 1.0
    mvhd.extend_from_slice(&[0; 10]);
    // Identity matrix in 16.16 / 2.30 fixed point.
    for value in [0x0001_0000u32, 0, 0, 0, 0x0001_0000, 0, 0, 0, 0x4000_0000] {
        mvhd.extend_from_slice(&value.to_be_bytes());
    }
    mvhd.extend_from_slice(&[0; 24]); // pre_defined
    mvhd.extend_from_slice(&1u32.to_be_bytes()); // next_track_ID

    let mut moov = Vec::with_capacity(108);
    push_box(&mut moov, b"mvhd", &mvhd);

    let mut out = Vec::with_capacity(144);
    push_box(&mut out, b"ftyp", &ftyp);
    push_box(&mut out, b"moov", &moov);
    out
}

fn empty_gif() -> Vec<u8> {
    let mut out = Vec::with_capacity(14);
    out.extend_from_slice(b"GIF89a");
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&[0x00, 0x00, 0x00]);
    out.push(0x3B);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes(mut data: &[u8]) -> Vec<(String, usize)> {
        let mut found = Vec::new();
        while data.len() >= 8 {
            let size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
            let kind = String::from_utf8_lossy(&data[4..8]).into_owned();
            assert!(size >= 8 && size <= data.len(), "bad box size {size}");
            found.push((kind, size));
            data = &data[size..];
        }
        assert!(data.is_empty());
        found
    }

    #[test]
    fn test_empty_mp4_box_layout() {
        let bytes = empty_output(ExportFormat::Mp4);
        assert_eq!(
            boxes(&bytes),
            vec![("ftyp".to_string(), 28), ("moov".to_string(), 116)]
        );
        assert_eq!(&bytes[8..12], b"isom");

        let moov = &bytes[28..];
        assert_eq!(boxes(&moov[8..]), vec![("mvhd".to_string(), 108)]);

        let mvhd = &moov[8..];
        let duration = u32::from_be_bytes([mvhd[24], mvhd[25], mvhd[26], mvhd[27]]);
        assert_eq!(duration, 0);
    }

    #[test]
    fn test_empty_gif_layout() {
        let bytes = empty_output(ExportFormat::Gif);
        assert_eq!(&bytes[..6], b"GIF89a");
        assert_eq!(bytes.len(), 14);
        assert_eq!(bytes.last(), Some(&0x3B));
    }
}
