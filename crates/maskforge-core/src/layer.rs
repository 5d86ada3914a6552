use serde::{Deserialize, Serialize};

/// A named mask layer of the output drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    /// Layer number used for GDS-II export.
    pub gds_layer: u16,
    pub gds_datatype: u16,
    pub color: LayerColor,
    pub opacity: f32,
    pub visible: bool,
}

impl Layer {
    pub fn new(name: &str, gds_layer: u16) -> Self {
        Self {
            name: name.to_string(),
            gds_layer,
            gds_datatype: 0,
            color: LayerColor::default(),
            opacity: 0.5,
            visible: true,
        }
    }

    pub fn with_color(mut self, r: u8, g: u8, b: u8) -> Self {
        self.color = LayerColor { r, g, b };
        self
    }
}

/// RGB color for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for LayerColor {
    fn default() -> Self {
        Self {
            r: 255,
            g: 255,
            b: 255,
        }
    }
}

impl LayerColor {
    pub fn to_f32_array(&self, opacity: f32) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            opacity,
        ]
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colors handed out to layers that are created on first use.
const PALETTE: [LayerColor; 6] = [
    LayerColor { r: 255, g: 80, b: 80 },
    LayerColor { r: 80, g: 160, b: 255 },
    LayerColor { r: 90, g: 220, b: 120 },
    LayerColor { r: 255, g: 200, b: 60 },
    LayerColor { r: 200, g: 110, b: 255 },
    LayerColor { r: 60, g: 220, b: 220 },
];

/// The ordered set of layers a drawing uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Stack holding only the default layer `"0"`.
    pub fn with_default_layer() -> Self {
        let mut stack = Self::new();
        stack.add_layer(Layer::new(DEFAULT_LAYER, 0));
        stack
    }

    /// Add `layer` unless a layer of the same name exists. Returns whether it was added.
    pub fn add_layer(&mut self, layer: Layer) -> bool {
        if self.contains(&layer.name) {
            return false;
        }
        self.layers.push(layer);
        true
    }

    /// Layer `name`, creating it with the next free GDS number and a palette color.
    pub fn ensure(&mut self, name: &str) -> &Layer {
        let index = match self.layers.iter().position(|l| l.name == name) {
            Some(index) => index,
            None => {
                let gds_layer = self
                    .layers
                    .iter()
                    .map(|l| l.gds_layer + 1)
                    .max()
                    .unwrap_or(0);
                let color = PALETTE[self.layers.len() % PALETTE.len()];
                log::debug!("Registering layer '{}' as GDS {}", name, gds_layer);
                self.layers.push(Layer {
                    color,
                    ..Layer::new(name, gds_layer)
                });
                self.layers.len() - 1
            }
        };
        &self.layers[index]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.iter().any(|l| l.name == name)
    }

    pub fn get_layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn get_layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    pub fn get_layer_by_gds(&self, gds_layer: u16, gds_datatype: u16) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|l| l.gds_layer == gds_layer && l.gds_datatype == gds_datatype)
    }

    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.visible)
    }

    pub fn all_layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn names(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.name.clone()).collect()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn toggle_visibility(&mut self, name: &str) {
        if let Some(layer) = self.get_layer_mut(name) {
            layer.visible = !layer.visible;
        }
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Name of the layer every drawing starts on.
pub const DEFAULT_LAYER: &str = "0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_assigns_numbers() {
        let mut stack = LayerStack::with_default_layer();
        assert_eq!(stack.ensure("metal").gds_layer, 1);
        assert_eq!(stack.ensure("resistor").gds_layer, 2);
        assert_eq!(stack.ensure("metal").gds_layer, 1);
        assert_eq!(stack.layer_count(), 3);
        assert_eq!(stack.get_layer_by_gds(2, 0).unwrap().name, "resistor");
    }

    #[test]
    fn test_add_layer_rejects_duplicates() {
        let mut stack = LayerStack::new();
        assert!(stack.add_layer(Layer::new("a", 5)));
        assert!(!stack.add_layer(Layer::new("a", 6)));
        assert_eq!(stack.get_layer("a").unwrap().gds_layer, 5);
    }

    #[test]
    fn test_color_hex() {
        let c = LayerColor { r: 255, g: 0, b: 16 };
        assert_eq!(c.to_hex(), "#ff0010");
        assert_eq!(c.to_f32_array(0.5)[3], 0.5);
    }
}
