//! Wind direction names.

/// Sixteen compass points in the order the station indexes them, clockwise
/// from north, spelled as the station software spells them
pub const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "NEE", "E", "SEE", "SE", "SSE", "S", "SSW", "SW", "SWW", "W", "NWW", "NW",
    "NNW",
];

/// Name of a raw direction index, `None` outside 0-15
pub fn compass_point(index: u8) -> Option<&'static str> {
    COMPASS_POINTS.get(usize::from(index)).copied()
}
