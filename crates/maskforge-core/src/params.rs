//! Parameter blocks for the device layouts. Dimensions are in micrometers.

use serde::{Deserialize, Serialize};

use crate::collection::AlignmentCheck;
use crate::compose::coplanar::{CoplanarStack, PadRow, PinCount, TerminationSpec};
use crate::compose::marks::AlignmentMarkSpec;
use crate::compose::pads::DcPadKind;
use crate::geometry::Point;
use crate::layer::{Layer, LayerColor, LayerStack};

/// Probe pads, tapers and coplanar line of the waveguide layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoplanarParams {
    pub pad_length: f64,
    pub pad_width: f64,
    pub pad_gap: f64,
    pub taper_length: f64,
    pub gnd_width: f64,
    pub sig_width: f64,
    pub sig_gnd_gap: f64,
    /// Final straight before the termination in the one-bend route and under the magnets.
    pub straight_length: f64,
    /// Final straight before the termination in the three-bend route.
    pub long_straight_length: f64,
    /// First straight after the pad bend of the three-bend route.
    pub lead_length: f64,
    /// Horizontal straight of the loop layouts.
    pub straight_length_1: f64,
    /// Vertical straight of the loop layouts.
    pub straight_length_2: f64,
    pub overlap1: f64,
    pub overlap2: f64,
    pub termination_length: f64,
    /// Widening of the center ground taper in the wide-ground loop.
    pub extra_width: f64,
    pub termination_layer: String,
    /// Largest accepted squared distance between two routes that should meet.
    pub alignment_tolerance: f64,
}

impl Default for CoplanarParams {
    fn default() -> Self {
        Self {
            pad_length: 80.0,
            pad_width: 80.0,
            pad_gap: 20.0,
            taper_length: 50.0,
            gnd_width: 50.0,
            sig_width: 13.6,
            sig_gnd_gap: 6.0,
            straight_length: 100.0,
            long_straight_length: 1000.0,
            lead_length: 100.0,
            straight_length_1: 200.0,
            straight_length_2: 100.0,
            overlap1: 20.0,
            overlap2: 20.0,
            termination_length: 42.8,
            extra_width: 100.0,
            termination_layer: "Ti%0_LPC_".to_string(),
            alignment_tolerance: 0.01,
        }
    }
}

impl CoplanarParams {
    pub fn stack(&self) -> CoplanarStack {
        CoplanarStack::new(self.gnd_width, self.sig_width, self.sig_gnd_gap)
    }

    pub fn pad_row(&self, pins: PinCount) -> PadRow {
        PadRow {
            length: self.pad_length,
            width: self.pad_width,
            gap: self.pad_gap,
            pins,
        }
    }

    pub fn termination(&self) -> TerminationSpec {
        TerminationSpec {
            overlap1: self.overlap1,
            overlap2: self.overlap2,
            length: self.termination_length,
            layer: self.termination_layer.clone(),
        }
    }

    pub fn alignment(&self) -> AlignmentCheck {
        AlignmentCheck::new(self.alignment_tolerance)
    }
}

/// Magnet arrays laid over the signal line and the termination resistor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnetParams {
    pub magnet_x: f64,
    pub magnet_y: f64,
    pub magnet_gap: f64,
    /// Inset from both ends of the signal line.
    pub offset1: f64,
    /// Inset from both ends of the exposed resistor.
    pub offset2: f64,
    pub layer: Option<String>,
}

impl Default for MagnetParams {
    fn default() -> Self {
        Self {
            magnet_x: 12.0,
            magnet_y: 12.0,
            magnet_gap: 6.0,
            offset1: 10.0,
            offset2: 5.0,
            layer: None,
        }
    }
}

impl MagnetParams {
    /// Magnets that fit in `span` with `inset` kept clear at both ends.
    pub fn count_in(&self, span: f64, inset: f64) -> usize {
        let n = ((span - 2.0 * inset + self.magnet_gap) / (self.magnet_x + self.magnet_gap)).floor();
        if n > 0.0 {
            n as usize
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcPadParams {
    pub pad_width: f64,
    pub pad_gap: f64,
    pub taper_length: f64,
}

impl Default for DcPadParams {
    fn default() -> Self {
        Self {
            pad_width: 80.0,
            pad_gap: 20.0,
            taper_length: 50.0,
        }
    }
}

/// Export settings for one named layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    pub gds_layer: u16,
    #[serde(default)]
    pub gds_datatype: u16,
    #[serde(default)]
    pub color: Option<LayerColor>,
}

impl LayerSpec {
    /// Create or update the layer in `stack`.
    pub fn apply(&self, stack: &mut LayerStack) {
        match stack.get_layer_mut(&self.name) {
            Some(layer) => {
                layer.gds_layer = self.gds_layer;
                layer.gds_datatype = self.gds_datatype;
                if let Some(color) = self.color {
                    layer.color = color;
                }
            }
            None => {
                let mut layer = Layer::new(&self.name, self.gds_layer);
                layer.gds_datatype = self.gds_datatype;
                if let Some(color) = self.color {
                    layer.color = color;
                }
                stack.add_layer(layer);
            }
        }
    }
}

/// Everything a named layout needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// Bottom-left corner of the first probe pad.
    pub origin: Point,
    pub coplanar: CoplanarParams,
    pub magnet: MagnetParams,
    /// DC bias pads hung under the probe pads.
    pub dc_pad: Option<DcPadKind>,
    pub dc: DcPadParams,
    pub mark: AlignmentMarkSpec,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            origin: Point::ORIGIN,
            coplanar: CoplanarParams::default(),
            magnet: MagnetParams::default(),
            dc_pad: None,
            dc: DcPadParams::default(),
            mark: AlignmentMarkSpec::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: CoplanarParams = serde_json::from_str(r#"{"sig_width": 10.0}"#).unwrap();
        assert_eq!(params.sig_width, 10.0);
        assert_eq!(params.gnd_width, 50.0);
        assert_eq!(params.straight_length, 100.0);
        assert_eq!(params.long_straight_length, 1000.0);
        assert_eq!(params.termination_layer, "Ti%0_LPC_");
        assert!((params.stack().width() - 122.0).abs() < 1e-12);
    }

    #[test]
    fn test_magnet_count() {
        let magnets = MagnetParams::default();
        assert_eq!(magnets.count_in(100.0, 10.0), 4);
        assert_eq!(magnets.count_in(42.8, 5.0), 2);
        assert_eq!(magnets.count_in(10.0, 10.0), 0);
    }

    #[test]
    fn test_layer_spec_updates_existing() {
        let mut stack = LayerStack::with_default_layer();
        let spec = LayerSpec {
            name: "0".to_string(),
            gds_layer: 7,
            gds_datatype: 2,
            color: None,
        };
        spec.apply(&mut stack);
        let layer = stack.get_layer("0").unwrap();
        assert_eq!((layer.gds_layer, layer.gds_datatype), (7, 2));
        LayerSpec {
            name: "metal".to_string(),
            gds_layer: 9,
            gds_datatype: 0,
            color: None,
        }
        .apply(&mut stack);
        assert_eq!(stack.layer_count(), 2);
    }

    #[test]
    fn test_dc_pad_kind_in_json() {
        let params: LayoutParams = serde_json::from_str(r#"{"dc_pad": "wedge"}"#).unwrap();
        assert_eq!(params.dc_pad, Some(DcPadKind::Wedge));
    }
}
