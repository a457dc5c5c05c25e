//! Indexed PNG output.
//!
//! Pure Rust PNG encoding using the `png` crate. The PLTE chunk carries the
//! device palette in firmware order, so pixel values in the file are the same
//! indices the panel receives.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::Result;
use crate::quantize::IndexedRaster;

/// PNG encoder for quantized output.
pub struct PngEncoder;

impl PngEncoder {
    /// Write a raster to an indexed PNG file.
    ///
    /// # Errors
    ///
    /// Returns an error if file creation or PNG encoding fails.
    pub fn write_to_file<P: AsRef<Path>>(raster: &IndexedRaster, path: P) -> Result<()> {
        let file = File::create(path)?;
        Self::encode(raster, BufWriter::new(file))
    }

    /// Encode a raster to indexed PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_bytes(raster: &IndexedRaster) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        Self::encode(raster, &mut buffer)?;
        Ok(buffer)
    }

    /// Encode a raster as a `data:image/png;base64,` URI for previews.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_data_uri(raster: &IndexedRaster) -> Result<String> {
        let png_bytes = Self::to_bytes(raster)?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png_bytes)))
    }

    fn encode<W: Write>(raster: &IndexedRaster, out: W) -> Result<()> {
        let palette = raster.palette().palette();
        let depth = bit_depth(palette.len());

        let plte: Vec<u8> = (0..palette.len() as u8)
            .flat_map(|i| {
                let c = palette.color(i).unwrap_or_default();
                [c.r, c.g, c.b]
            })
            .collect();

        let mut encoder = png::Encoder::new(out, raster.width(), raster.height());
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(depth);
        encoder.set_palette(plte);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&pack_rows(raster, depth as u8))?;
        Ok(())
    }
}

/// Smallest PNG bit depth that holds `colors` palette slots.
fn bit_depth(colors: usize) -> png::BitDepth {
    match colors {
        0..=2 => png::BitDepth::One,
        3..=4 => png::BitDepth::Two,
        5..=16 => png::BitDepth::Four,
        _ => png::BitDepth::Eight,
    }
}

/// Pack indices MSB-first into rows padded to whole bytes.
fn pack_rows(raster: &IndexedRaster, bits: u8) -> Vec<u8> {
    if bits == 8 {
        return raster.indices().to_vec();
    }
    let width = raster.width() as usize;
    let per_byte = (8 / bits) as usize;
    let row_bytes = width.div_ceil(per_byte);
    let mut packed = vec![0u8; row_bytes * raster.height() as usize];

    for (row, out) in raster.indices().chunks_exact(width).zip(packed.chunks_exact_mut(row_bytes)) {
        for (x, &index) in row.iter().enumerate() {
            let shift = 8 - bits * (x % per_byte + 1) as u8;
            out[x / per_byte] |= index << shift;
        }
    }
    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize::PaletteId;

    fn raster(width: u32, height: u32, palette: PaletteId, indices: Vec<u8>) -> IndexedRaster {
        IndexedRaster::from_indices(width, height, palette, indices).unwrap()
    }

    #[test]
    fn test_png_to_bytes() {
        let r = raster(10, 10, PaletteId::Bwr, vec![2; 100]);
        let bytes = PngEncoder::to_bytes(&r).unwrap();
        // PNG magic bytes
        assert_eq!(&bytes[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[test]
    fn test_decoded_indices_match() {
        let indices: Vec<u8> = (0..35).map(|i| (i % 7) as u8).collect();
        let r = raster(7, 5, PaletteId::Acep7, indices.clone());
        let bytes = PngEncoder::to_bytes(&r).unwrap();

        let mut decoder = png::Decoder::new(bytes.as_slice());
        decoder.set_transformations(png::Transformations::IDENTITY);
        let mut reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!(info.color_type, png::ColorType::Indexed);
        assert_eq!(info.bit_depth, png::BitDepth::Four);
        let plte = info.palette.as_ref().unwrap().to_vec();
        assert_eq!(plte.len(), 8 * 3);
        assert_eq!(&plte[0..3], &[0, 0, 0]);

        let mut buf = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buf).unwrap();
        // Row 0 packs indices 0..7 two per byte.
        assert_eq!(frame.line_size, 4);
        assert_eq!(buf[0], 0x01);
        assert_eq!(buf[1], 0x23);
        assert_eq!(buf[3], 0x60);
    }

    #[test]
    fn test_pack_one_bit() {
        let r = raster(10, 1, PaletteId::Mono, vec![1, 0, 1, 0, 0, 0, 0, 1, 1, 1]);
        assert_eq!(pack_rows(&r, 1), vec![0b1010_0001, 0b1100_0000]);
    }

    #[test]
    fn test_bit_depth_by_palette() {
        assert_eq!(bit_depth(PaletteId::Mono.palette().len()), png::BitDepth::One);
        assert_eq!(bit_depth(PaletteId::Bwr.palette().len()), png::BitDepth::Two);
        assert_eq!(bit_depth(PaletteId::Gray4.palette().len()), png::BitDepth::Two);
        assert_eq!(bit_depth(PaletteId::Spectra6.palette().len()), png::BitDepth::Four);
    }

    #[test]
    fn test_data_uri() {
        let r = raster(2, 2, PaletteId::Mono, vec![0, 1, 1, 0]);
        let uri = PngEncoder::to_data_uri(&r).unwrap();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let r = raster(4, 4, PaletteId::Bwry, vec![3; 16]);
        PngEncoder::write_to_file(&r, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, PngEncoder::to_bytes(&r).unwrap());
    }
}
