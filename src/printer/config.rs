//! # Printer Configuration
//!
//! Hardware specifications for the supported DTG printers.
//!
//! ## Supported Printers
//!
//! | Model | Platen (dots @720dpi) | Resolution | USB VID:PID |
//! |-------|-----------------------|------------|-------------|
//! | F2100 | 11520 × 14400 | 720 DPI | 04B8:0883 |
//! | F2130 | 11520 × 14400 | 720 DPI | 04B8:0884 |
//!
//! Product ids come from capture sessions and are still marked unverified in
//! the protocol notes; the vendor id 0x04B8 is Epson's registered id.

/// Hardware characteristics of one printer model.
///
/// ## Calculations
///
/// ```text
/// platen_width_in = platen_width_dots / dpi
///
/// For the F2100 (16in platen at 720 dpi):
///   11520 / 720 = 16.0 in
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterConfig {
    /// Printer model name
    pub name: &'static str,

    /// USB vendor id (0x04B8 = Epson)
    pub usb_vendor_id: u16,

    /// USB product id (unverified, from captures)
    pub usb_product_id: u16,

    /// Maximum printable width in dots at `dpi`
    pub platen_width_dots: u16,

    /// Maximum printable height in dots at `dpi`
    pub platen_height_dots: u16,

    /// Native resolution in dots per inch (both axes)
    pub dpi: u16,

    /// Maximum BitImage payload per bulk transfer, in bytes
    pub chunk_limit: usize,
}

impl PrinterConfig {
    /// # Epson SureColor F2100
    ///
    /// 16 × 20 inch platen, 720 dpi native, CMYK + White.
    pub const F2100: Self = Self {
        name: "Epson SureColor F2100",
        usb_vendor_id: 0x04B8,
        usb_product_id: 0x0883,
        platen_width_dots: 11520,
        platen_height_dots: 14400,
        dpi: 720,
        chunk_limit: 64 * 1024,
    };

    /// # Epson SureColor F2130
    ///
    /// Same platen and head geometry as the F2100; different product id and
    /// firmware generation.
    pub const F2130: Self = Self {
        usb_product_id: 0x0884,
        name: "Epson SureColor F2130",
        ..Self::F2100
    };

    /// Platen width in inches.
    #[inline]
    pub fn platen_width_in(&self) -> f32 {
        self.platen_width_dots as f32 / self.dpi as f32
    }

    /// Platen height in inches.
    #[inline]
    pub fn platen_height_in(&self) -> f32 {
        self.platen_height_dots as f32 / self.dpi as f32
    }

    /// Raster row stride in bytes for a given image width (1 bit per dot).
    #[inline]
    pub fn row_stride(width_dots: u16) -> usize {
        (width_dots as usize).div_ceil(8)
    }

    /// Identify a model by its USB product id.
    pub fn for_product_id(product_id: u16) -> Option<Self> {
        [Self::F2100, Self::F2130]
            .into_iter()
            .find(|c| c.usb_product_id == product_id)
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::F2100
    }
}

// ============================================================================
// TESTS
// ============================================================================
