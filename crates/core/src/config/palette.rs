//! Hex viewer palette slots and defaults

/// Number of entries in the default hex viewer palette
pub const HEX_VIEWER_PALETTE_LEN: usize = 11;

/// Palette slot for each kind of byte the hex viewer highlights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HexViewerColor {
    Default = 0,
    Zero,
    Padding,
    Integer,
    Float,
    Text,
    Pointer,
    ObjectPointer,
    CodePointer,
    VirtualTablePointer,
    LibraryObjectPointer,
}

impl HexViewerColor {
    pub const ALL: [HexViewerColor; HEX_VIEWER_PALETTE_LEN] = [
        HexViewerColor::Default,
        HexViewerColor::Zero,
        HexViewerColor::Padding,
        HexViewerColor::Integer,
        HexViewerColor::Float,
        HexViewerColor::Text,
        HexViewerColor::Pointer,
        HexViewerColor::ObjectPointer,
        HexViewerColor::CodePointer,
        HexViewerColor::VirtualTablePointer,
        HexViewerColor::LibraryObjectPointer,
    ];

    /// Whether bytes in this slot belong to an address
    pub const fn is_pointer(self) -> bool {
        matches!(
            self,
            HexViewerColor::Pointer
                | HexViewerColor::ObjectPointer
                | HexViewerColor::CodePointer
                | HexViewerColor::VirtualTablePointer
                | HexViewerColor::LibraryObjectPointer
        )
    }
}

/// Built-in palette (ABGR), indexed by [`HexViewerColor`]
pub const fn default_hex_viewer_palette() -> [u32; HEX_VIEWER_PALETTE_LEN] {
    [
        0xFFFFFFFF, // Default
        0xFF808080, // Zero
        0xFF505050, // Padding
        0xFFFFC080, // Integer
        0xFF80FFC0, // Float
        0xFF80E0FF, // Text
        0xFF8080FF, // Pointer
        0xFFFF80FF, // ObjectPointer
        0xFF40A0FF, // CodePointer
        0xFFC080FF, // VirtualTablePointer
        0xFFFFFF80, // LibraryObjectPointer
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_cover_palette() {
        for (i, color) in HexViewerColor::ALL.iter().enumerate() {
            assert_eq!(*color as usize, i);
        }
        assert_eq!(default_hex_viewer_palette().len(), HexViewerColor::ALL.len());
    }

    #[test]
    fn test_is_pointer() {
        assert!(HexViewerColor::VirtualTablePointer.is_pointer());
        assert!(HexViewerColor::Pointer.is_pointer());
        assert!(!HexViewerColor::Integer.is_pointer());
        assert!(!HexViewerColor::Zero.is_pointer());
    }
}
