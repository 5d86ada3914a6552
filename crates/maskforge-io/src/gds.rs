///! GDS-II stream output for mask documents.
///!
///! Every committed polyline becomes one BOUNDARY element in a single
///! structure named after the document. Bulged edges are flattened to
///! chords, since GDS-II has no arc primitive.
///!
///! ## GDS-II Record Structure
///! Each record: [2-byte length][2-byte record type][payload]
///! Record types define the hierarchy: BGNLIB → BGNSTR → BOUNDARY → ENDSTR → ENDLIB

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use maskforge_core::arc::{check_tolerance, flatten_contour};
use maskforge_core::{ConfigError, Document, Point};

// ── GDS-II Record Types ──────────────────────────────────────────────

mod record_type {
    pub const HEADER: u16 = 0x0002;
    pub const BGNLIB: u16 = 0x0102;
    pub const LIBNAME: u16 = 0x0206;
    pub const UNITS: u16 = 0x0305;
    pub const ENDLIB: u16 = 0x0400;
    pub const BGNSTR: u16 = 0x0502;
    pub const STRNAME: u16 = 0x0606;
    pub const ENDSTR: u16 = 0x0700;
    pub const BOUNDARY: u16 = 0x0800;
    pub const PATH: u16 = 0x0900;
    pub const SREF: u16 = 0x0A00;
    pub const AREF: u16 = 0x0B00;
    pub const TEXT: u16 = 0x0C00;
    pub const LAYER: u16 = 0x0D02;
    pub const DATATYPE: u16 = 0x0E02;
    pub const XY: u16 = 0x1003;
    pub const ENDEL: u16 = 0x1100;
    pub const NODE: u16 = 0x1500;
    pub const BOX: u16 = 0x2D00;
}

/// Most vertices a BOUNDARY may carry, closing point included.
pub const MAX_BOUNDARY_POINTS: usize = 8191;

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum GdsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid GDS-II record at offset {offset}: {message}")]
    InvalidRecord { offset: u64, message: String },

    #[error("Unexpected record type 0x{record_type:04X}, expected 0x{expected:04X}")]
    UnexpectedRecord { record_type: u16, expected: u16 },

    #[error("Boundary on layer '{layer}' has {points} points, GDS-II allows {max}")]
    TooManyPoints { layer: String, points: usize, max: usize },

    #[error("Coordinate {0} µm does not fit the database unit grid")]
    CoordinateOverflow(f64),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ── GDS-II Record ─────────────────────────────────────────────────────

#[derive(Debug)]
struct GdsRecord {
    record_type: u16,
    data: Vec<u8>,
}

impl GdsRecord {
    fn as_i16_vec(&self) -> Vec<i16> {
        self.data
            .chunks_exact(2)
            .map(|c| i16::from_be_bytes([c[0], c[1]]))
            .collect()
    }

    fn as_i32_vec(&self) -> Vec<i32> {
        self.data
            .chunks_exact(4)
            .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn as_string(&self) -> String {
        let s: String = self.data.iter().map(|&b| b as char).collect();
        s.trim_end_matches('\0').to_string()
    }

    /// Parse payload as GDS-II 8-byte reals (excess-64 floating point).
    fn as_f64_vec(&self) -> Vec<f64> {
        self.data
            .chunks_exact(8)
            .map(|c| {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(c);
                gds_real8_to_f64(&bytes)
            })
            .collect()
    }
}

/// Convert GDS-II excess-64 real format to IEEE 754 f64.
fn gds_real8_to_f64(bytes: &[u8; 8]) -> f64 {
    if bytes.iter().all(|&b| b == 0) {
        return 0.0;
    }

    let sign = if bytes[0] & 0x80 != 0 { -1.0 } else { 1.0 };
    let exponent = (bytes[0] & 0x7F) as i32 - 64;

    let mut mantissa: u64 = 0;
    for &b in &bytes[1..] {
        mantissa = (mantissa << 8) | (b as u64);
    }

    let mantissa_f = mantissa as f64 / (1u64 << 56) as f64;
    sign * mantissa_f * 16.0_f64.powi(exponent)
}

/// Convert IEEE 754 f64 to GDS-II excess-64 real format.
fn f64_to_gds_real8(value: f64) -> [u8; 8] {
    if value == 0.0 {
        return [0u8; 8];
    }

    let sign_bit: u8 = if value < 0.0 { 0x80 } else { 0x00 };
    let mut val = value.abs();

    // 1/16 <= mantissa < 1
    let mut exponent: i32 = 0;
    while val >= 1.0 && exponent < 63 {
        val /= 16.0;
        exponent += 1;
    }
    while val < 1.0 / 16.0 && exponent > -64 {
        val *= 16.0;
        exponent -= 1;
    }

    let mantissa = ((val * (1u64 << 56) as f64).round() as u64).min((1u64 << 56) - 1);
    let mut result = [0u8; 8];
    result[0] = sign_bit | ((exponent + 64) as u8 & 0x7F);
    result[1..].copy_from_slice(&mantissa.to_be_bytes()[1..]);
    result
}

// ── Library model ─────────────────────────────────────────────────────

/// One polygon read back from a stream, in micrometers, without the closing point.
#[derive(Debug, Clone, PartialEq)]
pub struct GdsBoundary {
    pub layer: u16,
    pub datatype: u16,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GdsStructure {
    pub name: String,
    pub boundaries: Vec<GdsBoundary>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GdsLibrary {
    pub name: String,
    /// Database unit in micrometers.
    pub db_unit_in_um: f64,
    pub structures: Vec<GdsStructure>,
}

impl GdsLibrary {
    pub fn structure(&self, name: &str) -> Option<&GdsStructure> {
        self.structures.iter().find(|s| s.name == name)
    }

    pub fn boundary_count(&self) -> usize {
        self.structures.iter().map(|s| s.boundaries.len()).sum()
    }
}

// ── GDS-II Reader ─────────────────────────────────────────────────────

pub struct GdsReader<R: Read> {
    reader: R,
    offset: u64,
    db_unit_in_um: f64,
}

impl<R: Read> GdsReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            db_unit_in_um: 0.001,
        }
    }

    /// Read the whole stream. Elements other than BOUNDARY are skipped.
    pub fn read(&mut self) -> Result<GdsLibrary, GdsError> {
        self.read_header()?;
        let mut lib = GdsLibrary {
            db_unit_in_um: self.db_unit_in_um,
            ..Default::default()
        };
        self.read_lib(&mut lib)?;
        Ok(lib)
    }

    fn read_record(&mut self) -> Result<Option<GdsRecord>, GdsError> {
        let mut len_buf = [0u8; 2];
        match self.reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(GdsError::Io(e)),
        }

        let total_len = u16::from_be_bytes(len_buf) as usize;
        if total_len < 4 {
            return Err(GdsError::InvalidRecord {
                offset: self.offset,
                message: format!("Record length {} is too small", total_len),
            });
        }

        let mut type_buf = [0u8; 2];
        self.reader.read_exact(&mut type_buf)?;
        let record_type = u16::from_be_bytes(type_buf);

        let mut data = vec![0u8; total_len - 4];
        if !data.is_empty() {
            self.reader.read_exact(&mut data)?;
        }
        self.offset += total_len as u64;

        Ok(Some(GdsRecord { record_type, data }))
    }

    fn read_header(&mut self) -> Result<(), GdsError> {
        let rec = self.read_record()?.ok_or(GdsError::InvalidRecord {
            offset: 0,
            message: "Empty file".into(),
        })?;

        if rec.record_type != record_type::HEADER {
            return Err(GdsError::UnexpectedRecord {
                record_type: rec.record_type,
                expected: record_type::HEADER,
            });
        }

        if let Some(version) = rec.as_i16_vec().first() {
            log::debug!("GDS-II version: {}", version);
        }
        Ok(())
    }

    fn read_lib(&mut self, lib: &mut GdsLibrary) -> Result<(), GdsError> {
        while let Some(rec) = self.read_record()? {
            match rec.record_type {
                record_type::LIBNAME => lib.name = rec.as_string(),
                record_type::UNITS => {
                    let units = rec.as_f64_vec();
                    if units.len() >= 2 {
                        self.db_unit_in_um = units[1] * 1e6;
                        lib.db_unit_in_um = self.db_unit_in_um;
                    }
                }
                record_type::BGNSTR => {
                    let structure = self.read_structure()?;
                    lib.structures.push(structure);
                }
                record_type::ENDLIB => break,
                _ => {}
            }
        }
        log::debug!(
            "Read GDS library '{}': {} structures, {} boundaries",
            lib.name,
            lib.structures.len(),
            lib.boundary_count()
        );
        Ok(())
    }

    fn read_structure(&mut self) -> Result<GdsStructure, GdsError> {
        let mut structure = GdsStructure::default();
        while let Some(rec) = self.read_record()? {
            match rec.record_type {
                record_type::STRNAME => structure.name = rec.as_string(),
                record_type::BOUNDARY => {
                    if let Some(boundary) = self.read_boundary()? {
                        structure.boundaries.push(boundary);
                    }
                }
                record_type::PATH
                | record_type::SREF
                | record_type::AREF
                | record_type::TEXT
                | record_type::NODE
                | record_type::BOX => self.skip_to_endel()?,
                record_type::ENDSTR => break,
                _ => {}
            }
        }
        Ok(structure)
    }

    fn read_boundary(&mut self) -> Result<Option<GdsBoundary>, GdsError> {
        let mut layer = 0u16;
        let mut datatype = 0u16;
        let mut points = Vec::new();

        while let Some(rec) = self.read_record()? {
            match rec.record_type {
                record_type::LAYER => {
                    if let Some(&v) = rec.as_i16_vec().first() {
                        layer = v as u16;
                    }
                }
                record_type::DATATYPE => {
                    if let Some(&v) = rec.as_i16_vec().first() {
                        datatype = v as u16;
                    }
                }
                record_type::XY => {
                    points.extend(rec.as_i32_vec().chunks_exact(2).map(|pair| {
                        Point::new(
                            pair[0] as f64 * self.db_unit_in_um,
                            pair[1] as f64 * self.db_unit_in_um,
                        )
                    }));
                }
                record_type::ENDEL => break,
                _ => {}
            }
        }

        // Boundaries repeat the first point
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.is_empty() {
            return Ok(None);
        }
        Ok(Some(GdsBoundary { layer, datatype, points }))
    }

    fn skip_to_endel(&mut self) -> Result<(), GdsError> {
        while let Some(rec) = self.read_record()? {
            if rec.record_type == record_type::ENDEL {
                break;
            }
        }
        Ok(())
    }
}

// ── GDS-II Writer ─────────────────────────────────────────────────────

pub struct GdsWriter<W: Write> {
    writer: W,
    db_unit_in_um: f64,
    /// Largest distance between an arc and its chords, in micrometers.
    arc_tolerance: f64,
}

impl<W: Write> GdsWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            db_unit_in_um: 0.001,
            arc_tolerance: 0.01,
        }
    }

    /// Set the chord tolerance for bulged edges. It must be a finite positive length.
    pub fn with_arc_tolerance(mut self, tolerance: f64) -> Result<Self, GdsError> {
        self.arc_tolerance = check_tolerance(tolerance)?;
        Ok(self)
    }

    /// Write `doc` as a library holding one structure.
    pub fn write(&mut self, doc: &Document) -> Result<(), GdsError> {
        self.write_i16_record(record_type::HEADER, &[600])?;
        self.write_i16_record(record_type::BGNLIB, &TIMESTAMP)?;
        self.write_string_record(record_type::LIBNAME, &doc.name)?;
        // db unit in user units (µm), db unit in meters
        self.write_real8_record(record_type::UNITS, &[self.db_unit_in_um, self.db_unit_in_um * 1e-6])?;

        self.write_i16_record(record_type::BGNSTR, &TIMESTAMP)?;
        self.write_string_record(record_type::STRNAME, &structure_name(&doc.name))?;
        for polyline in doc.polylines() {
            let layer_name = polyline.layer.as_deref().unwrap_or_else(|| doc.active_layer());
            let (layer, datatype) = doc
                .layer_stack
                .get_layer(layer_name)
                .map(|l| (l.gds_layer, l.gds_datatype))
                .unwrap_or((0, 0));
            let ring = flatten_contour(&polyline.points, |i| polyline.bulge_at(i), self.arc_tolerance);
            self.write_boundary(layer_name, layer, datatype, &ring)?;
        }
        self.write_record(record_type::ENDSTR, &[])?;

        self.write_record(record_type::ENDLIB, &[])?;
        self.writer.flush()?;
        log::info!("Wrote {} boundaries to GDS-II library '{}'", doc.len(), doc.name);
        Ok(())
    }

    fn write_boundary(&mut self, layer_name: &str, layer: u16, datatype: u16, ring: &[Point]) -> Result<(), GdsError> {
        if ring.is_empty() {
            return Ok(());
        }
        if ring.len() + 1 > MAX_BOUNDARY_POINTS {
            return Err(GdsError::TooManyPoints {
                layer: layer_name.to_string(),
                points: ring.len() + 1,
                max: MAX_BOUNDARY_POINTS,
            });
        }

        self.write_record(record_type::BOUNDARY, &[])?;
        self.write_i16_record(record_type::LAYER, &[layer as i16])?;
        self.write_i16_record(record_type::DATATYPE, &[datatype as i16])?;

        let mut xy = Vec::with_capacity(2 * (ring.len() + 1));
        for p in ring.iter().chain(ring.first()) {
            xy.push(self.to_db(p.x)?);
            xy.push(self.to_db(p.y)?);
        }
        self.write_i32_record(record_type::XY, &xy)?;

        self.write_record(record_type::ENDEL, &[])
    }

    fn to_db(&self, um: f64) -> Result<i32, GdsError> {
        let v = (um / self.db_unit_in_um).round();
        if v.is_finite() && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
            Ok(v as i32)
        } else {
            Err(GdsError::CoordinateOverflow(um))
        }
    }

    fn write_record(&mut self, record_type: u16, data: &[u8]) -> Result<(), GdsError> {
        let total_len = (data.len() + 4) as u16;
        self.writer.write_all(&total_len.to_be_bytes())?;
        self.writer.write_all(&record_type.to_be_bytes())?;
        if !data.is_empty() {
            self.writer.write_all(data)?;
        }
        Ok(())
    }

    fn write_i16_record(&mut self, record_type: u16, values: &[i16]) -> Result<(), GdsError> {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        self.write_record(record_type, &data)
    }

    fn write_i32_record(&mut self, record_type: u16, values: &[i32]) -> Result<(), GdsError> {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        self.write_record(record_type, &data)
    }

    fn write_string_record(&mut self, record_type: u16, s: &str) -> Result<(), GdsError> {
        let mut data: Vec<u8> = s.bytes().collect();
        // GDS strings must be even length
        if data.len() % 2 != 0 {
            data.push(0);
        }
        self.write_record(record_type, &data)
    }

    fn write_real8_record(&mut self, record_type: u16, values: &[f64]) -> Result<(), GdsError> {
        let data: Vec<u8> = values.iter().flat_map(|v| f64_to_gds_real8(*v)).collect();
        self.write_record(record_type, &data)
    }
}

/// Modification and access time: 12 i16 values.
const TIMESTAMP: [i16; 12] = [2026, 1, 1, 0, 0, 0, 2026, 1, 1, 0, 0, 0];

/// Structure names are limited to `[A-Za-z0-9_?$]`.
fn structure_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '_' | '?' | '$') { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "TOP".to_string()
    } else {
        cleaned
    }
}

/// Write `doc` to a GDS-II file at `path`.
pub fn export_gds(doc: &Document, path: &Path) -> Result<(), GdsError> {
    let file = File::create(path)?;
    GdsWriter::new(BufWriter::new(file)).write(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maskforge_core::geometry::Shape;
    use maskforge_core::{with_document, Anchor, Layer};
    use std::io::Cursor;

    #[test]
    fn test_gds_real8_roundtrip() {
        let values = [0.0, 1.0, -1.0, 0.001, 1e-9, 3.14159, 1000.0];
        for &v in &values {
            let bytes = f64_to_gds_real8(v);
            let result = gds_real8_to_f64(&bytes);
            assert!(
                (result - v).abs() < v.abs() * 1e-10 + 1e-15,
                "Roundtrip failed for {}: got {}",
                v,
                result
            );
        }
    }

    fn sample_document() -> Document {
        let mut doc = Document::new("test lib");
        doc.layer_stack.add_layer(Layer::new("metal", 10));
        // Without reset the layer table set up above survives.
        with_document(&mut doc, false, |d| {
            d.square(Point::new(0.0, 0.0), 100.0, 50.0, Anchor::BottomLeft, Some("metal"))?;
            d.commit(
                &Shape::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]).with_bulge(0, 1.0),
                None,
            )?;
            Ok(())
        })
        .unwrap();
        doc
    }

    #[test]
    fn test_write_and_read_roundtrip() {
        let doc = sample_document();
        let mut buffer: Vec<u8> = Vec::new();
        GdsWriter::new(&mut buffer).write(&doc).unwrap();

        let lib = GdsReader::new(Cursor::new(buffer)).read().unwrap();
        assert_eq!(lib.name, "test lib");
        assert!((lib.db_unit_in_um - 0.001).abs() < 1e-12);
        let top = lib.structure("test_lib").unwrap();
        assert_eq!(top.boundaries.len(), 2);

        let rect = &top.boundaries[0];
        assert_eq!((rect.layer, rect.datatype), (10, 0));
        assert_eq!(rect.points.len(), 4);
        assert!(rect.points.iter().any(|p| (p.x - 100.0).abs() < 1e-9 && (p.y - 50.0).abs() < 1e-9));
    }

    #[test]
    fn test_arcs_are_flattened_within_tolerance() {
        let doc = sample_document();
        let mut buffer: Vec<u8> = Vec::new();
        GdsWriter::new(&mut buffer).with_arc_tolerance(0.01).unwrap().write(&doc).unwrap();
        let lib = GdsReader::new(Cursor::new(buffer)).read().unwrap();
        let half_disc = &lib.structures[0].boundaries[1];
        assert_eq!(half_disc.layer, 0);
        assert!(half_disc.points.len() > 10);
        let center = Point::new(5.0, 0.0);
        for p in &half_disc.points {
            // On the semicircle or on its chord, within grid rounding.
            let on_arc = (p.distance_to(&center) - 5.0).abs() < 0.002;
            let on_chord = p.y.abs() < 0.002;
            assert!(on_arc || on_chord, "{:?} off the outline", p);
        }
    }

    #[test]
    fn test_rejects_degenerate_arc_tolerance() {
        for tolerance in [0.0, -0.01, f64::NAN] {
            let err = GdsWriter::new(Vec::new()).with_arc_tolerance(tolerance).err();
            assert!(
                matches!(err, Some(GdsError::Config(ConfigError::OutOfRange { .. }))),
                "tolerance {} accepted",
                tolerance
            );
        }
        // A very fine tolerance still ends in a bounded ring.
        let doc = sample_document();
        let mut buffer: Vec<u8> = Vec::new();
        GdsWriter::new(&mut buffer).with_arc_tolerance(1e-300).unwrap().write(&doc).unwrap();
        let lib = GdsReader::new(Cursor::new(buffer)).read().unwrap();
        assert!(lib.structures[0].boundaries[1].points.len() <= MAX_BOUNDARY_POINTS);
    }

    #[test]
    fn test_rejects_oversized_boundary() {
        let mut doc = Document::new("big");
        let ring: Vec<Point> = (0..MAX_BOUNDARY_POINTS)
            .map(|i| Point::polar(Point::ORIGIN, 100.0, i as f64 * 1e-4))
            .collect();
        with_document(&mut doc, true, |d| {
            d.commit(&Shape::new(ring), None)?;
            Ok(())
        })
        .unwrap();
        let err = GdsWriter::new(Vec::new()).write(&doc).unwrap_err();
        assert!(matches!(err, GdsError::TooManyPoints { .. }));
    }

    #[test]
    fn test_structure_name_is_sanitized() {
        assert_eq!(structure_name("coplanar-3 v2"), "coplanar_3_v2");
        assert_eq!(structure_name(""), "TOP");
    }

    #[test]
    fn test_rejects_missing_header() {
        let mut buffer = Vec::new();
        let mut writer = GdsWriter::new(&mut buffer);
        writer.write_record(record_type::ENDLIB, &[]).unwrap();
        let err = GdsReader::new(Cursor::new(buffer)).read().unwrap_err();
        assert!(matches!(err, GdsError::UnexpectedRecord { .. }));
    }
}
