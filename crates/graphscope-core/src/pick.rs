//! Pick color encoding.
//!
//! Every pickable element is drawn into the offscreen pick buffer with a
//! color that encodes its id. The id is shifted left one bit and the low bit
//! is forced to 1, so an encoded color is never all-zero: the cleared buffer
//! value `(0, 0, 0, 0)` is reserved for "nothing under the pointer".

/// Exclusive upper bound of the usable id space.
///
/// Ids are shifted left by one before encoding, so they must fit in 31 bits.
pub const ID_SPACE_END: u32 = 0x7FFF_FFFF;

/// Raw color id read from a cleared (empty) pixel.
pub const NO_HIT: u32 = 0;

/// Encodes an element id as an RGBA pick color.
///
/// Returns `[R, G, B, A]` where the 32-bit value `(id << 1) | 1` is stored
/// big-endian:
/// - R contains bits 24-31
/// - G contains bits 16-23
/// - B contains bits 8-15
/// - A contains bits 0-7 (never zero)
#[must_use]
pub fn encode_pick_id(id: u32) -> [u8; 4] {
    debug_assert!(id < ID_SPACE_END, "pick id {id} outside the id space");
    ((id << 1) | 1).to_be_bytes()
}

/// Reassembles the raw 32-bit color id from an RGBA pixel.
///
/// This does not strip the sentinel bit; use [`color_id_to_index`] for that.
#[must_use]
pub fn decode_color_id(rgba: [u8; 4]) -> u32 {
    u32::from_be_bytes(rgba)
}

/// Converts a raw color id to an element id.
///
/// Returns `None` for [`NO_HIT`].
#[must_use]
pub fn color_id_to_index(color_id: u32) -> Option<u32> {
    (color_id != NO_HIT).then_some(color_id >> 1)
}

/// Decodes an RGBA pick color straight to an element id.
#[must_use]
pub fn decode_pick_color(rgba: [u8; 4]) -> Option<u32> {
    color_id_to_index(decode_color_id(rgba))
}
